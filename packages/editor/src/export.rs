//! Export boundary.
//!
//! The binary deck encoder lives outside the engine; the session only hands
//! it a flushed slide array and turns failures into notifications.

use serde::Serialize;
use thiserror::Error;

use crate::model::Slide;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export")]
    Empty,

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait ExportEncoder {
    fn encode(&mut self, slides: &[Slide], file_name: &str) -> Result<Vec<u8>, ExportError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport<'a> {
    file_name: &'a str,
    slides: &'a [Slide],
}

/// Writes the slide array as pretty-printed JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonExportEncoder;

impl ExportEncoder for JsonExportEncoder {
    fn encode(&mut self, slides: &[Slide], file_name: &str) -> Result<Vec<u8>, ExportError> {
        if slides.is_empty() {
            return Err(ExportError::Empty);
        }
        serde_json::to_vec_pretty(&JsonExport { file_name, slides })
            .map_err(|e| ExportError::Encode(e.to_string()))
    }
}

/// User-facing message that stays until dismissed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
}
