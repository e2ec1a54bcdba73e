//! Test helpers para portico-server.

#![allow(dead_code, unused_imports)]

pub mod assertions;
pub mod client;
pub mod routes;

pub use assertions::*;
pub use client::{CsrfSession, TestClient, TestResponse, client, client_for};
