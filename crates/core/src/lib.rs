//! Domain types shared by the store, the job runner, and the HTTP layer.
//!
//! Pure logic only: no I/O, no async.

pub mod error;
pub mod experiment;
pub mod types;
