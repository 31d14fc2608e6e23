use std::sync::Arc;

use chrono::Local;
use engine_logging::{engine_error, engine_info};
use extractor_core::{update, LoopEffect, LoopMsg, LoopState};

use crate::{ExtractionOutcome, ExtractionWorker};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Non-empty observations that ran `process_next`.
    pub iterations: u64,
    pub succeeded: u64,
    pub unsupported: u64,
    pub failed: u64,
    pub backoffs: u64,
}

impl LoopSummary {
    fn record(&mut self, outcome: &ExtractionOutcome) {
        match outcome {
            ExtractionOutcome::Success { .. } => self.succeeded += 1,
            ExtractionOutcome::UnsupportedType { .. } => self.unsupported += 1,
            ExtractionOutcome::Failure { .. } => self.failed += 1,
        }
    }
}

/// Polls the worker's queue until its cancellation token fires.
///
/// Queue calls and extraction run on the blocking pool, one item at a time.
/// An empty queue puts the loop to sleep for the idle backoff; cancellation
/// interrupts that sleep.
pub async fn run_worker_loop(worker: Arc<ExtractionWorker>) -> LoopSummary {
    let cancel = worker.cancellation_token().clone();
    let idle_backoff = worker.settings().idle_backoff;
    let mut state = LoopState::new();
    let mut summary = LoopSummary::default();
    let mut msg = LoopMsg::Started;

    loop {
        let (next, effects) = update(state, msg);
        state = next;
        let Some(effect) = effects.into_iter().next() else {
            engine_error!("Worker loop stalled in phase {:?}", state.phase());
            break;
        };
        if cancel.is_cancelled() {
            break;
        }

        msg = match effect {
            LoopEffect::CheckDepth => {
                let worker = Arc::clone(&worker);
                match tokio::task::spawn_blocking(move || worker.pending_count()).await {
                    Ok(depth) => LoopMsg::DepthObserved(depth),
                    Err(err) => {
                        engine_error!("Queue depth check failed: {}", err);
                        LoopMsg::DepthObserved(0)
                    }
                }
            }
            LoopEffect::ProcessNext => {
                let worker = Arc::clone(&worker);
                match tokio::task::spawn_blocking(move || worker.process_next()).await {
                    Ok(Some(outcome)) => summary.record(&outcome),
                    Ok(None) => {}
                    Err(err) => engine_error!("Extraction task aborted: {}", err),
                }
                LoopMsg::ItemProcessed
            }
            LoopEffect::Backoff => {
                engine_info!(
                    "Sleeping for {:?} : started at {}",
                    idle_backoff,
                    Local::now().format("%H:%M:%S")
                );
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(idle_backoff) => LoopMsg::BackoffElapsed,
                }
            }
        };
    }

    let view = state.view();
    summary.iterations = view.processed;
    summary.backoffs = view.backoffs;
    engine_info!(
        "Worker loop stopped after {} items ({} succeeded, {} unsupported, {} failed)",
        summary.iterations,
        summary.succeeded,
        summary.unsupported,
        summary.failed
    );
    summary
}
