use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use engine_logging::engine_warn;
use tokio_util::sync::CancellationToken;

use crate::container::{ContainerCodec, LopdfCodec};
use crate::pipeline::PdfPipeline;
use crate::queue::JobQueue;
use crate::report::{LogReportSink, ReportSink};
use crate::save_path::SavePathDeriver;
use crate::text::{LopdfTextExtractor, TextExtractor};
use crate::{ExtractionOutcome, WorkerEvent};

pub const DEFAULT_SUPPORTED_MARKER: &str = "pdf";
pub const DEFAULT_IDLE_BACKOFF: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_MAX_ABANDONED_STAGES: usize = 4;

#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// An attachment is extracted when its extension ends with this marker.
    pub supported_marker: String,
    /// Upper bound for each of open, normalize and extract. `None` waits forever.
    ///
    /// A stage that overruns is abandoned, not stopped: its helper thread keeps
    /// running until the capability returns.
    pub stage_timeout: Option<Duration>,
    /// Abandoned stage threads allowed to run at once. While this many are still
    /// busy, new bounded stages fail immediately with a timeout instead of
    /// spawning another thread.
    pub max_abandoned_stages: usize,
    /// Sleep between depth checks while the queue is empty.
    pub idle_backoff: Duration,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            supported_marker: DEFAULT_SUPPORTED_MARKER.to_string(),
            stage_timeout: None,
            max_abandoned_stages: DEFAULT_MAX_ABANDONED_STAGES,
            idle_backoff: DEFAULT_IDLE_BACKOFF,
        }
    }
}

/// Drains attachments from a job queue and extracts their text, one at a time.
///
/// No failure of a single attachment escapes this type: every outcome is reported
/// through the [`ReportSink`] and returned to the caller.
pub struct ExtractionWorker {
    queue: Arc<dyn JobQueue>,
    deriver: Arc<dyn SavePathDeriver>,
    codec: Arc<dyn ContainerCodec>,
    extractor: Arc<dyn TextExtractor>,
    sink: Arc<dyn ReportSink>,
    settings: WorkerSettings,
    cancel: CancellationToken,
    stage_threads: Arc<AtomicUsize>,
}

impl ExtractionWorker {
    /// Worker with the lopdf capabilities and log-based reporting.
    pub fn new(
        queue: Arc<dyn JobQueue>,
        deriver: Arc<dyn SavePathDeriver>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            queue,
            deriver,
            codec: Arc::new(LopdfCodec),
            extractor: Arc::new(LopdfTextExtractor),
            sink: Arc::new(LogReportSink),
            settings,
            cancel: CancellationToken::new(),
            stage_threads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_codec(mut self, codec: Arc<dyn ContainerCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_text_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_report_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Token observed by the run loop and at every pipeline stage boundary.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn settings(&self) -> &WorkerSettings {
        &self.settings
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Current queue depth. A failing queue backend reads as empty.
    pub fn pending_count(&self) -> usize {
        match self.queue.size() {
            Ok(depth) => depth,
            Err(err) => {
                engine_warn!("Could not read extraction queue size: {}", err);
                0
            }
        }
    }

    /// Takes one attachment off the queue and extracts it.
    ///
    /// Returns `None`, without reporting anything, when the queue is empty or the
    /// dequeue yields no item.
    pub fn process_next(&self) -> Option<ExtractionOutcome> {
        if self.pending_count() == 0 {
            return None;
        }
        let attachment = match self.queue.get() {
            Ok(Some(item)) if !item.trim().is_empty() => item,
            Ok(_) => return None,
            Err(err) => {
                engine_warn!("Could not dequeue attachment: {}", err);
                return None;
            }
        };
        let save_path = self.deriver.derive(&attachment);
        Some(self.extract(&attachment, &save_path))
    }

    /// Classifies `attachment` by extension and, when supported, runs the pipeline
    /// writing the trimmed text to `save_path`.
    pub fn extract(&self, attachment: &str, save_path: &Path) -> ExtractionOutcome {
        if !is_supported(attachment, &self.settings.supported_marker) {
            let outcome = ExtractionOutcome::UnsupportedType {
                attachment: attachment.to_string(),
            };
            self.sink.emit(WorkerEvent::Finished(outcome.clone()));
            return outcome;
        }

        self.sink.emit(WorkerEvent::Started {
            attachment: attachment.to_string(),
        });
        let started = Instant::now();

        let pipeline = PdfPipeline {
            codec: &self.codec,
            extractor: &self.extractor,
            stage_timeout: self.settings.stage_timeout,
            max_abandoned_stages: self.settings.max_abandoned_stages,
            stage_threads: &self.stage_threads,
            cancel: &self.cancel,
        };
        let outcome = match pipeline.run(attachment, save_path) {
            Ok(()) => ExtractionOutcome::Success {
                attachment: attachment.to_string(),
                save_path: save_path.to_path_buf(),
            },
            Err(error) => ExtractionOutcome::Failure {
                attachment: attachment.to_string(),
                error,
            },
        };
        self.sink.emit(WorkerEvent::Finished(outcome.clone()));
        self.sink.emit(WorkerEvent::Elapsed {
            attachment: attachment.to_string(),
            elapsed: started.elapsed(),
        });
        outcome
    }
}

/// Text after the last `.`, or the whole string when there is none.
pub fn file_type(attachment: &str) -> &str {
    match attachment.rfind('.') {
        Some(idx) => &attachment[idx + 1..],
        None => attachment,
    }
}

/// Suffix match on the file type, so `somepdf` passes for marker `pdf`.
pub fn is_supported(attachment: &str, marker: &str) -> bool {
    file_type(attachment).ends_with(marker)
}
