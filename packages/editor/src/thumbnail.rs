//! # Thumbnail Pipeline
//!
//! Debounced, asynchronous snapshot capture of slides.
//!
//! A model change calls [`ThumbnailPipeline::request`] for the affected
//! slide. Once the debounce elapses, [`ThumbnailPipeline::poll`] emits a
//! [`CaptureRequest`] and records the content hash it dispatched. A result
//! handed back through [`ThumbnailPipeline::complete`] is only stored when
//! its hash still matches the last dispatch for that slide; anything else
//! is a superseded capture and is dropped.
//!
//! Capture failures never reach the editing path: they are logged and the
//! previous thumbnail (if any) stays in place.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::hash::digest;
use crate::model::{Slide, CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::scheduler::ScheduledTask;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    #[error("Renderer failed: {0}")]
    Render(String),

    #[error("Capture timed out")]
    Timeout,
}

/// Encoded snapshot bytes
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailImage {
    pub width: u32,
    pub height: u32,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub slide_id: String,
    pub content_hash: u32,
    pub image: ThumbnailImage,
}

/// Work order for the external renderer
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    pub slide: Slide,
    pub content_hash: u32,
    /// Toolbars and resize handles must not appear in the capture
    pub exclude_chrome: bool,
    pub width: f64,
    pub height: f64,
}

/// Full-fidelity slide renderer
pub trait SnapshotRenderer {
    fn capture(&mut self, request: &CaptureRequest) -> Result<ThumbnailImage, CaptureError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    Stored { slide_id: String },
    Stale { slide_id: String },
    Failed { slide_id: String, error: CaptureError },
}

#[derive(Debug)]
pub struct ThumbnailPipeline {
    delay: Duration,
    pending: BTreeMap<String, ScheduledTask>,
    dispatched: BTreeMap<String, u32>,
    cache: BTreeMap<String, Thumbnail>,
}

impl ThumbnailPipeline {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: BTreeMap::new(),
            dispatched: BTreeMap::new(),
            cache: BTreeMap::new(),
        }
    }

    /// Schedule a capture; a pending request for the same slide is superseded
    pub fn request(&mut self, slide_id: &str, now: Instant) {
        let delay = self.delay;
        self.pending
            .entry(slide_id.to_string())
            .or_insert_with(|| ScheduledTask::new(delay))
            .schedule(now);
    }

    pub fn is_pending(&self, slide_id: &str) -> bool {
        self.pending.get(slide_id).map_or(false, ScheduledTask::is_pending)
    }

    /// Capture requests whose debounce has elapsed
    pub fn poll(&mut self, now: Instant, slides: &[Slide]) -> Vec<CaptureRequest> {
        let due: Vec<String> = self
            .pending
            .iter_mut()
            .filter_map(|(id, task)| task.fire_if_due(now).then(|| id.clone()))
            .collect();
        self.pending.retain(|_, task| task.is_pending());

        let mut requests = Vec::new();
        for slide_id in due {
            let Some(slide) = slides.iter().find(|s| s.id == slide_id) else {
                tracing::debug!(slide = %slide_id, "slide removed before capture");
                continue;
            };

            let content_hash = digest(slide);
            if self.thumbnail(&slide_id).map(|t| t.content_hash) == Some(content_hash) {
                continue;
            }

            self.dispatched.insert(slide_id.clone(), content_hash);
            requests.push(CaptureRequest {
                slide: slide.clone(),
                content_hash,
                exclude_chrome: true,
                width: CANVAS_WIDTH,
                height: CANVAS_HEIGHT,
            });
        }
        requests
    }

    /// Accept a renderer result for a dispatched request
    pub fn complete(
        &mut self,
        slide_id: &str,
        content_hash: u32,
        result: Result<ThumbnailImage, CaptureError>,
    ) -> CaptureOutcome {
        if self.dispatched.get(slide_id) != Some(&content_hash) {
            tracing::debug!(slide = %slide_id, content_hash, "ignoring stale capture");
            return CaptureOutcome::Stale {
                slide_id: slide_id.to_string(),
            };
        }

        match result {
            Ok(image) => {
                self.cache.insert(
                    slide_id.to_string(),
                    Thumbnail {
                        slide_id: slide_id.to_string(),
                        content_hash,
                        image,
                    },
                );
                CaptureOutcome::Stored {
                    slide_id: slide_id.to_string(),
                }
            }
            Err(error) => {
                tracing::warn!(slide = %slide_id, %error, "thumbnail capture failed");
                CaptureOutcome::Failed {
                    slide_id: slide_id.to_string(),
                    error,
                }
            }
        }
    }

    /// Poll and capture synchronously through `renderer`
    pub fn run<R: SnapshotRenderer>(
        &mut self,
        now: Instant,
        slides: &[Slide],
        renderer: &mut R,
    ) -> Vec<CaptureOutcome> {
        self.poll(now, slides)
            .into_iter()
            .map(|request| {
                let result = renderer.capture(&request);
                self.complete(&request.slide.id, request.content_hash, result)
            })
            .collect()
    }

    pub fn thumbnail(&self, slide_id: &str) -> Option<&Thumbnail> {
        self.cache.get(slide_id)
    }

    /// Drop the cached thumbnail for a slide
    pub fn invalidate(&mut self, slide_id: &str) {
        self.cache.remove(slide_id);
    }

    /// Forget cache entries for slides that no longer exist
    pub fn retain_slides(&mut self, slides: &[Slide]) {
        let alive = |id: &String| slides.iter().any(|s| s.id == *id);
        self.cache.retain(|id, _| alive(id));
        self.dispatched.retain(|id, _| alive(id));
        self.pending.retain(|id, _| alive(id));
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }
}
