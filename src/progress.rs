//! Progress-callback trait for pipeline events.
//!
//! Inject an [`Arc<dyn GenerationProgressCallback>`] via
//! [`crate::config::GenerationConfigBuilder::progress_callback`] to receive
//! stage transitions and per-image outcomes as the pipeline runs.
//!
//! # Example
//!
//! ```rust
//! use deckgen::{GenerationConfig, GenerationProgressCallback, PipelineStage};
//! use std::sync::Arc;
//!
//! struct StageLogger;
//!
//! impl GenerationProgressCallback for StageLogger {
//!     fn on_stage(&self, stage: PipelineStage) {
//!         eprintln!("stage: {stage}");
//!     }
//! }
//!
//! let config = GenerationConfig::builder()
//!     .progress_callback(Arc::new(StageLogger))
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// States of one pipeline invocation.
///
/// ```text
/// Idle → ComposingPrompt → AwaitingModelResponse → Parsing
///      → ImageResolution → Done
///      | RepairFailed | RateLimited | Failed
/// ```
///
/// The outline operation stops at `Parsing → Done`; only layouts go through
/// `ImageResolution`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineStage {
    Idle,
    ComposingPrompt,
    AwaitingModelResponse,
    Parsing,
    ImageResolution,
    Done,
    /// Terminal: the model output could not be repaired into the schema.
    RepairFailed,
    /// Terminal: the model provider reported rate exhaustion.
    RateLimited,
    /// Terminal: any other failure after the model was invoked.
    Failed,
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineStage::Done
                | PipelineStage::RepairFailed
                | PipelineStage::RateLimited
                | PipelineStage::Failed
        )
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::ComposingPrompt => "composing-prompt",
            PipelineStage::AwaitingModelResponse => "awaiting-model-response",
            PipelineStage::Parsing => "parsing",
            PipelineStage::ImageResolution => "image-resolution",
            PipelineStage::Done => "done",
            PipelineStage::RepairFailed => "repair-failed",
            PipelineStage::RateLimited => "rate-limited",
            PipelineStage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Called by the pipeline as it moves through its stages.
///
/// Implementations must be `Send + Sync`. Image events may arrive in any
/// order because images are resolved concurrently. All methods default to
/// no-ops so callers only override what they care about.
pub trait GenerationProgressCallback: Send + Sync {
    /// Called on every state transition.
    fn on_stage(&self, stage: PipelineStage) {
        let _ = stage;
    }

    /// Called once before the image fan-out is dispatched.
    ///
    /// # Arguments
    /// * `total_images`: image nodes found across all slides
    fn on_images_start(&self, total_images: usize) {
        let _ = total_images;
    }

    /// Called when one image has been resolved or has fallen back.
    ///
    /// # Arguments
    /// * `node_id`: id of the image node
    /// * `fallback`: true when the fallback URL was used
    fn on_image_complete(&self, node_id: &str, fallback: bool) {
        let _ = (node_id, fallback);
    }

    /// Called once after every image has been applied to the tree.
    fn on_images_complete(&self, total_images: usize, fallback_count: usize) {
        let _ = (total_images, fallback_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl GenerationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::GenerationConfig`].
pub type ProgressCallback = Arc<dyn GenerationProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct TrackingCallback {
        stages: Mutex<Vec<PipelineStage>>,
        images: AtomicUsize,
        fallbacks: AtomicUsize,
    }

    impl GenerationProgressCallback for TrackingCallback {
        fn on_stage(&self, stage: PipelineStage) {
            self.stages.lock().unwrap().push(stage);
        }

        fn on_image_complete(&self, _node_id: &str, fallback: bool) {
            self.images.fetch_add(1, Ordering::SeqCst);
            if fallback {
                self.fallbacks.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_stage(PipelineStage::Parsing);
        cb.on_images_start(3);
        cb.on_image_complete("img", true);
        cb.on_images_complete(3, 1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            stages: Mutex::new(vec![]),
            images: AtomicUsize::new(0),
            fallbacks: AtomicUsize::new(0),
        };
        tracker.on_stage(PipelineStage::ComposingPrompt);
        tracker.on_stage(PipelineStage::Done);
        tracker.on_image_complete("a", false);
        tracker.on_image_complete("b", true);

        assert_eq!(
            *tracker.stages.lock().unwrap(),
            vec![PipelineStage::ComposingPrompt, PipelineStage::Done]
        );
        assert_eq!(tracker.images.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.fallbacks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn terminal_stages() {
        assert!(PipelineStage::Done.is_terminal());
        assert!(PipelineStage::RateLimited.is_terminal());
        assert!(PipelineStage::RepairFailed.is_terminal());
        assert!(!PipelineStage::Parsing.is_terminal());
        assert_eq!(PipelineStage::ImageResolution.to_string(), "image-resolution");
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_stage(PipelineStage::Idle);
    }
}
