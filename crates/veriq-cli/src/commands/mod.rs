//! CLI command implementations.

pub mod common;
pub mod compile;
pub mod stats;
pub mod topologies;
pub mod version;
