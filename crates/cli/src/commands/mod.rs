//! CLI command implementations

pub mod honeypot;
pub mod ports;
pub mod services;
pub mod types;
pub mod validate;
