//
// lib.rs
// EOTRH-Score-rs
//
// Exposes the crate's modules and re-exports the CLI entry point for both binary
// and library consumers.
//

// Public surface of the library: each module mirrors a pipeline stage or shared utility.
pub mod cli;
pub mod config;
pub mod entropy;
pub mod error;
pub mod models;
pub mod normalize;
pub mod prepare;
pub mod roi;
pub mod scoring;
pub mod texture;
pub mod web;

pub use cli::{run as run_cli, Cli, Commands};
