use crc32fast::Hasher;
use chrono::{DateTime, Utc};

/// Generate a presentation id from its file name and creation time using CRC32
pub fn presentation_id(file_name: &str, created_at: DateTime<Utc>) -> String {
    let mut hasher = Hasher::new();
    hasher.update(file_name.as_bytes());
    hasher.update(&created_at.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    format!("deck-{:08x}", hasher.finalize())
}

/// Sequential ID generator for slides and elements within a presentation
///
/// Ids take the form `{seed}-{n}` and are never reused within a session.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    /// Seed the generator from a presentation id
    pub fn new(presentation_id: &str) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(presentation_id.as_bytes());
        Self::from_seed(format!("{:x}", hasher.finalize()))
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Advance past an id that already exists (e.g. after loading)
    pub fn observe(&mut self, id: &str) {
        let counter = id
            .strip_prefix(self.seed.as_str())
            .and_then(|rest| rest.strip_prefix('-'))
            .and_then(|n| n.parse::<u32>().ok());

        if let Some(n) = counter {
            self.count = self.count.max(n);
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}
