//! Dependency resolution engine for grava.
//!
//! Builds the dependency closure of requested packages from a local
//! sync database and a source-metadata cache, and orders the result
//! into topological layers for parallel building.

pub mod graph;
pub mod layers;
pub mod resolver;
