//! Experiment parameters, lifecycle status, and listing order.
//!
//! An experiment is identified by its full parameter tuple
//! `(lr, epochs, batch_size)`: two submissions with exactly equal tuples
//! describe the same experiment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Upper bound on the number of epochs a single experiment may request.
pub const MAX_EPOCHS: i64 = 1000;

/// Upper bound on the mini-batch size.
pub const MAX_BATCH_SIZE: i64 = 65_536;

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// The parameter tuple of a training job.
///
/// Used for deduplication and passed through untouched to the training task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperimentParams {
    /// Learning rate.
    pub lr: f64,
    /// Number of training epochs; also the job's `total_steps`.
    pub epochs: i64,
    /// Mini-batch size.
    pub batch_size: i64,
}

impl ExperimentParams {
    pub fn new(lr: f64, epochs: i64, batch_size: i64) -> Self {
        Self {
            lr,
            epochs,
            batch_size,
        }
    }

    /// Check that every parameter is usable by a training task.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.lr.is_finite() || self.lr <= 0.0 {
            return Err(CoreError::Validation(format!(
                "Learning rate must be a positive finite number, got {}",
                self.lr
            )));
        }
        if !(1..=MAX_EPOCHS).contains(&self.epochs) {
            return Err(CoreError::Validation(format!(
                "Epochs must be between 1 and {MAX_EPOCHS}, got {}",
                self.epochs
            )));
        }
        if !(1..=MAX_BATCH_SIZE).contains(&self.batch_size) {
            return Err(CoreError::Validation(format!(
                "Batch size must be between 1 and {MAX_BATCH_SIZE}, got {}",
                self.batch_size
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Experiment lifecycle status. Transitions only go `Running -> Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentStatus {
    Running,
    Done,
}

impl ExperimentStatus {
    /// The value stored in the `status` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for ExperimentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperimentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "done" => Ok(Self::Done),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for ExperimentStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Listing order
// ---------------------------------------------------------------------------

/// Column a completed-experiment listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Final test accuracy (the primary metric).
    #[default]
    Accuracy,
    /// Wall-clock training time in seconds.
    Runtime,
}

impl SortKey {
    /// Parse a client-supplied key. Anything unrecognised falls back to
    /// [`SortKey::Accuracy`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("runtime") | Some("elapsed_time") => Self::Runtime,
            _ => Self::Accuracy,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
            Self::Runtime => "runtime",
        }
    }
}

/// Direction of a listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Parse a client-supplied direction, case-insensitively. Anything other
    /// than `asc` means [`SortDirection::Desc`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.trim().eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
