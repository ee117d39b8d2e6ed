// The pipeline board: grouped cache plus the optimistic move controller

pub mod cache;
pub mod controller;
pub mod transition;

pub use cache::{BoardCache, BoardSnapshot, StageColumn};
pub use controller::BoardController;
pub use transition::{DeleteOutcome, DropError, TransitionOutcome};
