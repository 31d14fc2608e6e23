use crate::{LoopEffect, LoopMsg, LoopPhase, LoopState};

/// Pure update function: applies a message to the loop state and returns the effects to run.
///
/// A depth observation only starts work from `Idle`, so the driver never takes more
/// than one item per observation before rechecking the queue.
pub fn update(mut state: LoopState, msg: LoopMsg) -> (LoopState, Vec<LoopEffect>) {
    let effects = match (state.phase(), msg) {
        (LoopPhase::Idle, LoopMsg::Started) | (LoopPhase::Idle, LoopMsg::BackoffElapsed) => {
            vec![LoopEffect::CheckDepth]
        }
        (LoopPhase::Idle, LoopMsg::DepthObserved(depth)) => {
            state.observe_depth(depth);
            if depth > 0 {
                state.begin_processing();
                vec![LoopEffect::ProcessNext]
            } else {
                state.begin_backoff();
                vec![LoopEffect::Backoff]
            }
        }
        (LoopPhase::Processing, LoopMsg::ItemProcessed) => {
            state.finish_processing();
            vec![LoopEffect::CheckDepth]
        }
        // Stale or out-of-order messages are ignored.
        (LoopPhase::Idle, LoopMsg::ItemProcessed)
        | (LoopPhase::Processing, LoopMsg::Started)
        | (LoopPhase::Processing, LoopMsg::DepthObserved(_))
        | (LoopPhase::Processing, LoopMsg::BackoffElapsed) => Vec::new(),
    };

    (state, effects)
}
