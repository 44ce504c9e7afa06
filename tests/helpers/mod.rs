//! Shared test helpers.

pub mod fixtures;
pub mod tree_assertions;
