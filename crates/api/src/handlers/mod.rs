pub mod experiments;
pub mod ui;
