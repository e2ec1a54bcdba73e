//! Metrics module for the Portico server.

pub mod http;
pub mod setup;

pub use setup::init_metrics;
