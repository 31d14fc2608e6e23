#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMsg {
    /// Driver started; nothing observed yet.
    Started,
    /// Result of a `size()` call on the job queue.
    DepthObserved(usize),
    /// `process_next` returned (whatever the outcome of the item).
    ItemProcessed,
    /// The idle backoff sleep finished.
    BackoffElapsed,
}
