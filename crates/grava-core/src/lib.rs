//! Core data types for the grava build-order planner.
//!
//! Dependency kinds and requests, the metadata records returned by the
//! package providers, the provider traits themselves, JSON snapshot
//! provider implementations, and global configuration.

pub mod config;
pub mod dependency;
pub mod package;
pub mod provider;
pub mod snapshot;
