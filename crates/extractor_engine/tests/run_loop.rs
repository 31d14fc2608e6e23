use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use extractor_engine::{
    run_worker_loop, ContainerCodec, ExtractionError, ExtractionWorker, FailureKind,
    InMemoryQueue, JobQueue, LoopSummary, MirrorTreeDeriver, OpenContainer, QueueError,
    TextExtractor, WorkerSettings,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

/// Wraps a queue, counting empty observations and cancelling after `stop_after` of them.
struct ObservedQueue {
    inner: InMemoryQueue,
    empty_observations: AtomicUsize,
    stop_after: usize,
    cancel: CancellationToken,
}

impl JobQueue for ObservedQueue {
    fn size(&self) -> Result<usize, QueueError> {
        let size = self.inner.size()?;
        if size == 0 {
            let seen = self.empty_observations.fetch_add(1, Ordering::SeqCst) + 1;
            if seen >= self.stop_after {
                self.cancel.cancel();
            }
        }
        Ok(size)
    }

    fn get(&self) -> Result<Option<String>, QueueError> {
        self.inner.get()
    }
}

struct PassthroughCodec;

impl ContainerCodec for PassthroughCodec {
    fn open(&self, _path: &Path) -> Result<Box<dyn OpenContainer>, ExtractionError> {
        Ok(Box::new(PassthroughContainer))
    }
}

struct PassthroughContainer;

impl OpenContainer for PassthroughContainer {
    fn normalize(self: Box<Self>) -> Result<Vec<u8>, ExtractionError> {
        Ok(b"bytes".to_vec())
    }
}

struct FixedText;

impl TextExtractor for FixedText {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        if bytes.is_empty() {
            return Err(ExtractionError::new(FailureKind::Extract, "empty"));
        }
        Ok(" text ".to_string())
    }
}

fn worker(
    temp: &TempDir,
    items: &[&str],
    stop_after: usize,
) -> (Arc<ExtractionWorker>, Arc<ObservedQueue>) {
    let cancel = CancellationToken::new();
    let queue = Arc::new(ObservedQueue {
        inner: items.iter().copied().collect(),
        empty_observations: AtomicUsize::new(0),
        stop_after,
        cancel: cancel.clone(),
    });
    let deriver = MirrorTreeDeriver::new(None, temp.path().join("out"));
    let worker = ExtractionWorker::new(queue.clone(), Arc::new(deriver), WorkerSettings::default())
        .with_codec(Arc::new(PassthroughCodec))
        .with_text_extractor(Arc::new(FixedText))
        .with_cancellation(cancel);
    (Arc::new(worker), queue)
}

#[tokio::test(start_paused = true)]
async fn drains_queue_then_sleeps_between_empty_checks() {
    let temp = TempDir::new().unwrap();
    let (worker, queue) = worker(&temp, &["a.pdf", "b.docx", "c.pdf"], 2);

    let started = tokio::time::Instant::now();
    let summary = run_worker_loop(worker).await;

    assert_eq!(
        summary,
        LoopSummary {
            iterations: 3,
            succeeded: 2,
            unsupported: 1,
            failed: 0,
            backoffs: 2,
        }
    );
    assert!(temp.path().join("out").join("a.txt").exists());
    assert!(temp.path().join("out").join("c.txt").exists());
    // Exactly one idle backoff elapsed between the two empty observations.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(3600), "loop spun: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(2 * 3600), "slept too long: {elapsed:?}");
    assert_eq!(queue.empty_observations.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_idle_sleep() {
    let temp = TempDir::new().unwrap();
    let (worker, _queue) = worker(&temp, &[], usize::MAX);
    let cancel = worker.cancellation_token().clone();

    let started = tokio::time::Instant::now();
    let handle = tokio::spawn(run_worker_loop(worker));
    tokio::time::sleep(Duration::from_secs(10)).await;
    cancel.cancel();
    let summary = handle.await.unwrap();

    assert_eq!(summary.iterations, 0);
    assert_eq!(summary.backoffs, 1);
    assert!(started.elapsed() < Duration::from_secs(3600));
}

#[tokio::test(start_paused = true)]
async fn cancellation_is_checked_before_sleeping() {
    let temp = TempDir::new().unwrap();
    let (worker, _queue) = worker(&temp, &[], 1);

    let started = tokio::time::Instant::now();
    let summary = run_worker_loop(worker).await;

    assert_eq!(summary.backoffs, 1);
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn pre_cancelled_worker_never_polls() {
    let temp = TempDir::new().unwrap();
    let (worker, queue) = worker(&temp, &["a.pdf"], usize::MAX);
    worker.cancellation_token().cancel();

    let summary = run_worker_loop(worker).await;

    assert_eq!(summary, LoopSummary::default());
    assert_eq!(queue.inner.size().unwrap(), 1);
}
