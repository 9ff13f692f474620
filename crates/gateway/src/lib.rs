//! H.I.V.E gateway
//!
//! Validates honeypot submissions and forwards lifecycle requests to the
//! container backend.

pub mod api;
pub mod config;
