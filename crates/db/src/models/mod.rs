//! Row types and response views for the `experiments` table.

pub mod experiment;
