//! Job orchestration: admission, background execution, progress reporting.
//!
//! - [`registry::JobRegistry`] deduplicates submissions and creates records.
//! - [`runner::TaskRunner`] runs a [`task::TrainingTask`] in the background
//!   and writes its progress and result back to the store.
//! - [`service::JobService`] ties both together for the HTTP layer.
//! - [`trainer::SyntheticTrainer`] is the built-in training task.

pub mod progress;
pub mod registry;
pub mod runner;
pub mod service;
pub mod task;
pub mod trainer;
