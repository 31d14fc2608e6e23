//! Extractor engine: job queue seam, extraction pipeline and the worker loop.
mod container;
mod persist;
mod pipeline;
mod queue;
mod report;
mod run_loop;
mod save_path;
mod spool;
mod text;
mod types;
mod worker;

pub use container::{ContainerCodec, LopdfCodec, OpenContainer};
pub use persist::{ensure_output_dir, write_text_atomic, PersistError};
pub use queue::{InMemoryQueue, JobQueue, QueueError};
pub use report::{LogReportSink, ReportSink};
pub use run_loop::{run_worker_loop, LoopSummary};
pub use save_path::{MirrorTreeDeriver, SavePathDeriver};
pub use spool::{SpoolDirQueue, JOB_EXTENSION};
pub use text::{LopdfTextExtractor, TextExtractor};
pub use types::{ExtractionError, ExtractionOutcome, FailureKind, Stage, WorkerEvent};
pub use worker::{
    file_type, is_supported, ExtractionWorker, WorkerSettings, DEFAULT_IDLE_BACKOFF,
    DEFAULT_MAX_ABANDONED_STAGES, DEFAULT_SUPPORTED_MARKER,
};
