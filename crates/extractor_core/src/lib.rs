//! Extractor core: pure state machine for the worker's poll loop.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::LoopEffect;
pub use msg::LoopMsg;
pub use state::{LoopPhase, LoopState};
pub use update::update;
pub use view_model::LoopView;
