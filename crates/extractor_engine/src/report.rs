use engine_logging::{engine_info, engine_warn};

use crate::WorkerEvent;

/// Receives the worker's report lines.
pub trait ReportSink: Send + Sync {
    fn emit(&self, event: WorkerEvent);
}

/// Routes report lines through the logging facade: failures at warn, everything else at info.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReportSink;

impl ReportSink for LogReportSink {
    fn emit(&self, event: WorkerEvent) {
        if event.is_failure() {
            engine_warn!("{event}");
        } else {
            engine_info!("{event}");
        }
    }
}
