// Core data models for Ridgeline
// These structs represent the domain entities

pub mod entry;
pub mod stage;

pub use entry::*;
pub use stage::*;
