//! # ahab-runtime
//!
//! Turns logical operations into argument vectors for an external,
//! Docker-compatible runtime and runs them as child processes.
//!
//! - [`args`]: pure construction of [`ahab_common::types::ArgumentVector`]s.
//! - [`dispatch`]: the [`dispatch::Runtime`] seam and its process-backed
//!   implementation.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod args;
pub mod dispatch;
