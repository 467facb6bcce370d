pub mod config;
pub mod error;
pub mod loans;
pub mod telemetry;
