use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use tokio_util::sync::CancellationToken;

use crate::container::ContainerCodec;
use crate::persist::write_text_atomic;
use crate::text::TextExtractor;
use crate::{ExtractionError, FailureKind, Stage};

/// Open → normalize → extract → persist. Stops at the first failing stage;
/// nothing is written unless every earlier stage succeeded.
pub(crate) struct PdfPipeline<'a> {
    pub codec: &'a Arc<dyn ContainerCodec>,
    pub extractor: &'a Arc<dyn TextExtractor>,
    pub stage_timeout: Option<Duration>,
    pub max_abandoned_stages: usize,
    /// Helper threads that have not returned yet, shared across items.
    pub stage_threads: &'a Arc<AtomicUsize>,
    pub cancel: &'a CancellationToken,
}

impl PdfPipeline<'_> {
    pub fn run(&self, attachment: &str, save_path: &Path) -> Result<(), ExtractionError> {
        self.checkpoint(Stage::Open)?;
        let codec = Arc::clone(self.codec);
        let source = PathBuf::from(attachment);
        let container = self.bounded(Stage::Open, move || codec.open(&source))?;

        self.checkpoint(Stage::Normalize)?;
        let bytes = self.bounded(Stage::Normalize, move || container.normalize())?;
        engine_debug!("Normalized {} into {} bytes", attachment, bytes.len());

        self.checkpoint(Stage::Extract)?;
        let extractor = Arc::clone(self.extractor);
        let text = self.bounded(Stage::Extract, move || extractor.extract_text(&bytes))?;

        // Persisting stays on this thread so a timed-out stage can never write late.
        self.checkpoint(Stage::Persist)?;
        write_text_atomic(save_path, text.trim())
            .map_err(|err| ExtractionError::new(FailureKind::Persist, err.to_string()))
    }

    fn checkpoint(&self, next: Stage) -> Result<(), ExtractionError> {
        if self.cancel.is_cancelled() {
            return Err(ExtractionError::new(
                FailureKind::Cancelled,
                format!("shutdown requested before {next}"),
            ));
        }
        Ok(())
    }

    /// Runs one stage, isolating panics and applying the optional stage timeout.
    fn bounded<T, F>(&self, stage: Stage, work: F) -> Result<T, ExtractionError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, ExtractionError> + Send + 'static,
    {
        let Some(limit) = self.stage_timeout else {
            return panic::catch_unwind(AssertUnwindSafe(work))
                .unwrap_or_else(|payload| Err(panicked(stage, payload.as_ref())));
        };

        // Stages run one at a time, so every live helper here is an abandoned one.
        let running = self.stage_threads.load(Ordering::SeqCst);
        if running >= self.max_abandoned_stages {
            engine_warn!("Refusing {} stage: {} abandoned stages still running", stage, running);
            return Err(ExtractionError::new(
                FailureKind::Timeout { stage },
                format!("{running} abandoned stages still running"),
            ));
        }

        let (tx, rx) = mpsc::sync_channel(1);
        let live = Arc::clone(self.stage_threads);
        live.fetch_add(1, Ordering::SeqCst);
        thread::Builder::new()
            .name(format!("extract-{stage}"))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(work))
                    .unwrap_or_else(|payload| Err(panicked(stage, payload.as_ref())));
                live.fetch_sub(1, Ordering::SeqCst);
                let _ = tx.send(result);
            })
            .map_err(|err| {
                self.stage_threads.fetch_sub(1, Ordering::SeqCst);
                ExtractionError::new(stage_failure(stage), err.to_string())
            })?;

        match rx.recv_timeout(limit) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(ExtractionError::new(
                FailureKind::Timeout { stage },
                format!("no result after {limit:?}"),
            )),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(ExtractionError::new(
                stage_failure(stage),
                "stage thread exited without a result",
            )),
        }
    }
}

fn stage_failure(stage: Stage) -> FailureKind {
    match stage {
        Stage::Open => FailureKind::Open,
        Stage::Normalize => FailureKind::Normalize,
        Stage::Extract => FailureKind::Extract,
        Stage::Persist => FailureKind::Persist,
    }
}

fn panicked(stage: Stage, payload: &(dyn Any + Send)) -> ExtractionError {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    ExtractionError::new(stage_failure(stage), format!("panicked: {detail}"))
}
