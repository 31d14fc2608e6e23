/// Work the driver must perform after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopEffect {
    /// Observe the queue depth and report it back as `LoopMsg::DepthObserved`.
    CheckDepth,
    /// Dequeue and process exactly one item, then send `LoopMsg::ItemProcessed`.
    ProcessNext,
    /// Sleep for the idle backoff, then send `LoopMsg::BackoffElapsed`.
    Backoff,
}
