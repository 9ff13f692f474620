//! Core library for Project H.I.V.E honeypot management
//!
//! This crate provides the core functionality for:
//! - Validation of honeypot submissions (resources, credentials, banners)
//! - The honeypot type catalog
//! - Lifecycle calls against the container backend
//! - Health checks and observability

pub mod catalog;
pub mod health;
pub mod lifecycle;
pub mod models;
pub mod observability;
pub mod validation;

pub use catalog::{CatalogError, HoneypotCatalog, HoneypotTypeSpec, PortBinding, PortRange};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use lifecycle::{
    HttpLifecycleClient, InFlightOperations, LifecycleApi, LifecycleError, PortCheckOutcome,
    PortChecker, RestartStrategy,
};
pub use models::*;
pub use observability::{GatewayMetrics, Outcome, StructuredLogger};
pub use validation::{
    validate_submission, SubmissionReport, ValidationReport, ValidationResult,
};
