use crate::view_model::LoopView;

/// Where the poll loop currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopPhase {
    /// Queue empty or just checked.
    #[default]
    Idle,
    /// One item in flight.
    Processing,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoopState {
    phase: LoopPhase,
    processed: u64,
    backoffs: u64,
    last_depth: Option<usize>,
}

impl LoopState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn view(&self) -> LoopView {
        LoopView {
            phase: self.phase,
            processed: self.processed,
            backoffs: self.backoffs,
            last_depth: self.last_depth,
        }
    }

    pub(crate) fn observe_depth(&mut self, depth: usize) {
        self.last_depth = Some(depth);
    }

    pub(crate) fn begin_processing(&mut self) {
        self.phase = LoopPhase::Processing;
    }

    pub(crate) fn finish_processing(&mut self) {
        self.phase = LoopPhase::Idle;
        self.processed += 1;
    }

    pub(crate) fn begin_backoff(&mut self) {
        self.backoffs += 1;
    }
}
