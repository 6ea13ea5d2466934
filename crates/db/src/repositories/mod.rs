//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&DbPool` as the first argument.

pub mod experiment_repo;

pub use experiment_repo::ExperimentRepo;
