//! Command-line driver for `memadvise`.
//!
//! The binary in `main.rs` only wires flags and configuration together; the
//! per-target pipeline and its output live here so they can be unit tested
//! against fixture procfs trees.

pub mod args;
pub mod output;
pub mod pipeline;
