use crate::LoopPhase;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoopView {
    pub phase: LoopPhase,
    pub processed: u64,
    pub backoffs: u64,
    pub last_depth: Option<usize>,
}
