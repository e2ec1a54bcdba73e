//! Route handlers served by the binary.

pub mod csrf;
pub mod health;
pub mod metrics;
