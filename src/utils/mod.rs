// Shared utilities

pub mod fuzzy;
