//! Ridgeline - command-line pipeline board for the Ridgeline roofing CRM
//!
//! This library provides the core functionality for Ridgeline, including:
//! - Data models for pipeline entries and stages
//! - A typed backend client over the hosted CRM's HTTP surface
//! - The board controller: optimistic stage moves confirmed or rolled back
//!   by the backend's transition authority
//! - CLI command parsing and board rendering
//!
//! # Example
//!
//! ```no_run
//! use ridgeline::cli::run;
//!
//! #[tokio::main]
//! async fn main() {
//!     if let Err(e) = run().await {
//!         eprintln!("Error: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod api;
pub mod board;
pub mod cli;
pub mod config;
pub mod context;
pub mod models;
pub mod utils;
