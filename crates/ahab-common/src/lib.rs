//! # ahab-common
//!
//! Shared types, error definitions, configuration loading, and constants
//! used across the ahab workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and provides the primitives the argument builder and the
//! CLI are written against.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
