//! Shared utilities for the grava build-order planner.
//!
//! This crate provides the cross-cutting error types used by all other
//! grava crates.

pub mod errors;
