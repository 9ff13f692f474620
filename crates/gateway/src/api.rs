//! HTTP API: validation endpoints, lifecycle forwarding, health and metrics

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dashmap::DashMap;
use hive_lib::{
    health::ComponentStatus,
    validation::{
        self, sanitize_banner, validate_admin_password, validate_all_credentials,
        validate_honeypot_name,
    },
    CreateHoneypotRequest, CredentialPair, GatewayMetrics, HealthRegistry, HoneypotAction,
    HoneypotCatalog, HoneypotList, InFlightOperations, LifecycleApi, LifecycleError, Outcome, PortAvailability,
    PortCheckOutcome, PortChecker, ResourceConfig, ServiceAction, ServiceActionRequest,
    ServiceList, StructuredLogger,
};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Header identifying a UI session for latest-wins port checks
pub const SESSION_HEADER: &str = "x-hive-session";

/// Operation-guard key for the bulk service set
pub const SERVICES_KEY: &str = "services:all";

/// Operation-guard key for a named honeypot
pub fn honeypot_key(name: &str) -> String {
    format!("honeypot:{}", name)
}

/// Operation-guard key for a honeypot still being created on `port`
pub fn port_key(port: u32) -> String {
    format!("port:{}", port)
}

pub const DEFAULT_MAX_SESSIONS: usize = 1024;
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(300);

struct SessionEntry {
    checker: Arc<PortChecker>,
    last_used: Instant,
}

/// One port checker per UI session
///
/// Holds at most `max_sessions` checkers. When full, sessions idle longer
/// than `idle_timeout` are dropped first, then the least recently used.
pub struct PortCheckSessions {
    checkers: DashMap<String, SessionEntry>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl Default for PortCheckSessions {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE)
    }
}

impl PortCheckSessions {
    pub fn new(max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            checkers: DashMap::new(),
            max_sessions: max_sessions.max(1),
            idle_timeout,
        }
    }

    pub fn checker_for(&self, session: &str, api: &Arc<dyn LifecycleApi>) -> Arc<PortChecker> {
        let now = Instant::now();
        if let Some(mut entry) = self.checkers.get_mut(session) {
            entry.last_used = now;
            return Arc::clone(&entry.checker);
        }

        if self.checkers.len() >= self.max_sessions {
            self.evict(now);
        }

        let entry = self
            .checkers
            .entry(session.to_string())
            .or_insert_with(|| SessionEntry {
                checker: Arc::new(PortChecker::new(Arc::clone(api))),
                last_used: now,
            });
        Arc::clone(&entry.checker)
    }

    fn evict(&self, now: Instant) {
        let before = self.checkers.len();
        self.checkers
            .retain(|_, entry| now.duration_since(entry.last_used) < self.idle_timeout);

        while self.checkers.len() >= self.max_sessions {
            let oldest = self
                .checkers
                .iter()
                .min_by_key(|entry| entry.last_used)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(session) => {
                    self.checkers.remove(&session);
                }
                None => break,
            }
        }

        debug!(
            evicted = before - self.checkers.len(),
            remaining = self.checkers.len(),
            "Evicted port check sessions"
        );
    }

    pub fn contains(&self, session: &str) -> bool {
        self.checkers.contains_key(session)
    }

    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }
}

/// Shared application state
pub struct AppState {
    pub upstream: Arc<dyn LifecycleApi>,
    pub catalog: HoneypotCatalog,
    pub health_registry: HealthRegistry,
    pub metrics: GatewayMetrics,
    pub logger: StructuredLogger,
    pub operations: InFlightOperations,
    pub port_checks: PortCheckSessions,
}

impl AppState {
    pub fn new(
        upstream: Arc<dyn LifecycleApi>,
        catalog: HoneypotCatalog,
        health_registry: HealthRegistry,
        metrics: GatewayMetrics,
        logger: StructuredLogger,
    ) -> Self {
        Self {
            upstream,
            catalog,
            health_registry,
            metrics,
            logger,
            operations: InFlightOperations::new(),
            port_checks: PortCheckSessions::default(),
        }
    }

    pub fn with_port_check_sessions(mut self, sessions: PortCheckSessions) -> Self {
        self.port_checks = sessions;
        self
    }

    /// Run an upstream call, recording latency and upstream health
    async fn call_upstream<T, F>(&self, action: &str, call: F) -> Result<T, LifecycleError>
    where
        F: Future<Output = Result<T, LifecycleError>>,
    {
        let start = Instant::now();
        let result = call.await;
        self.metrics
            .observe_upstream_latency(action, start.elapsed().as_secs_f64());

        match &result {
            Ok(_) => self.health_registry.observe_upstream(None).await,
            // The backend answered; a 4xx is about the request, not its health
            Err(LifecycleError::Api { status, .. }) if *status < 500 => {
                self.health_registry.observe_upstream(None).await
            }
            Err(LifecycleError::Validation(_)) => {}
            Err(e) => self.health_registry.observe_upstream(Some(&e.to_string())).await,
        }

        result
    }
}

/// Error responses produced by the API
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed; the body is the structured report
    Invalid(serde_json::Value),
    Conflict(String),
    BadRequest(String),
    Upstream(LifecycleError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Invalid(report) => (StatusCode::UNPROCESSABLE_ENTITY, Json(report)).into_response(),
            ApiError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Upstream(err) => {
                let status = match &err {
                    LifecycleError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    LifecycleError::Api { status, .. } if *status < 500 => {
                        StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                    }
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, Json(json!({ "error": err.to_string() }))).into_response()
            }
        }
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        ApiError::Upstream(err)
    }
}

fn outcome_of(err: &ApiError) -> Outcome {
    match err {
        ApiError::Invalid(_) | ApiError::BadRequest(_) => Outcome::Rejected,
        ApiError::Conflict(_) => Outcome::Conflict,
        ApiError::Upstream(LifecycleError::Validation(_)) => Outcome::Rejected,
        ApiError::Upstream(_) => Outcome::UpstreamError,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerBody {
    pub banner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsBody {
    pub authentication: Vec<CredentialPair>,
}

/// Health check response - returns 200 if healthy, 503 if degraded/unhealthy
async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.health_registry.health().await;

    let status_code = match health.status {
        ComponentStatus::Healthy | ComponentStatus::Degraded => StatusCode::OK,
        ComponentStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(health))
}

async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let readiness = state.health_registry.readiness().await;

    let status_code = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(readiness))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

async fn validate_resources(
    State(state): State<Arc<AppState>>,
    Json(resources): Json<ResourceConfig>,
) -> Json<validation::ValidationReport> {
    let report = validation::validate_resources(&resources);
    if !report.is_valid {
        state.metrics.inc_validation_rejection("resources");
    }
    Json(report)
}

async fn validate_credentials(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CredentialsBody>,
) -> Json<validation::CredentialReport> {
    let report = validate_all_credentials(&body.authentication);
    if !report.is_valid {
        state.metrics.inc_validation_rejection("credentials");
    }
    Json(report)
}

async fn validate_banner(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BannerBody>,
) -> Json<validation::ValidationResult> {
    let result = validation::validate_banner(&body.banner);
    if !result.is_valid {
        state.metrics.inc_validation_rejection("banner");
    }
    Json(result)
}

async fn sanitize(Json(body): Json<BannerBody>) -> Json<BannerBody> {
    Json(BannerBody {
        banner: sanitize_banner(&body.banner),
    })
}

fn record_rejections(state: &AppState, report: &validation::SubmissionReport) {
    let failed = [
        ("port", !report.port.is_valid),
        ("resources", !report.resources.is_valid),
        ("credentials", !report.credentials.is_valid),
        ("banner", !report.banner.is_valid),
    ];
    for (validator, _) in failed.iter().filter(|(_, failed)| *failed) {
        state.metrics.inc_validation_rejection(validator);
    }
}

async fn validate_submission(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateHoneypotRequest>,
) -> Json<validation::SubmissionReport> {
    let report = validation::validate_submission(&request, &state.catalog);
    record_rejections(&state, &report);
    Json(report)
}

async fn list_types(State(state): State<Arc<AppState>>) -> Json<HoneypotCatalog> {
    Json(state.catalog.clone())
}

async fn list_honeypots(State(state): State<Arc<AppState>>) -> Result<Json<HoneypotList>, ApiError> {
    let honeypots = state
        .call_upstream("list", state.upstream.list_honeypots())
        .await?;
    Ok(Json(HoneypotList { honeypots }))
}

async fn create_honeypot(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateHoneypotRequest>,
) -> Result<Response, ApiError> {
    let report = validation::validate_submission(&request, &state.catalog);
    if !report.is_valid {
        record_rejections(&state, &report);
        state.logger.log_submission_rejected(
            request.honeypot_type.as_str(),
            request.port,
            &report.messages,
        );
        state.metrics.record_lifecycle("create", Outcome::Rejected);
        return Err(ApiError::Invalid(json!(report)));
    }

    // The honeypot has no name yet; a repeated submission for the same port is
    // the double-submit case.
    let key = port_key(request.port);
    let _guard = match state.operations.try_begin(&key, "create") {
        Ok(guard) => guard,
        Err(_) => {
            state.metrics.record_lifecycle("create", Outcome::Conflict);
            return Err(ApiError::Conflict(format!(
                "A honeypot on port {} is already being created",
                request.port
            )));
        }
    };

    match state
        .call_upstream("create", state.upstream.create_honeypot(&request))
        .await
    {
        Ok(record) => {
            state.metrics.record_lifecycle("create", Outcome::Success);
            state
                .logger
                .log_lifecycle(&record.name, "create", Outcome::Success, record.status.as_str());
            Ok((StatusCode::CREATED, Json(record)).into_response())
        }
        Err(e) => {
            let err = ApiError::from(e);
            let outcome = outcome_of(&err);
            state.metrics.record_lifecycle("create", outcome);
            state
                .logger
                .log_lifecycle(&key, "create", outcome, &format!("{:?}", err));
            Err(err)
        }
    }
}

/// Names are forwarded as a URL path segment; refuse anything else up front
fn check_name(name: &str) -> Result<(), ApiError> {
    let check = validate_honeypot_name(name);
    if check.is_valid {
        Ok(())
    } else {
        Err(ApiError::BadRequest(check.message))
    }
}

async fn honeypot_status(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<hive_lib::HoneypotRecord>, ApiError> {
    check_name(&name)?;
    let record = state
        .call_upstream("status", state.upstream.honeypot_status(&name))
        .await?;
    Ok(Json(record))
}

async fn run_lifecycle(
    state: &AppState,
    name: &str,
    action: HoneypotAction,
) -> Result<Json<hive_lib::OperationResult>, ApiError> {
    check_name(name)?;
    let action_name = action.as_str();

    let _guard = match state.operations.try_begin(&honeypot_key(name), action_name) {
        Ok(guard) => guard,
        Err(running) => {
            state.metrics.record_lifecycle(action_name, Outcome::Conflict);
            state.logger.log_lifecycle(
                name,
                action_name,
                Outcome::Conflict,
                &format!("{} already in progress", running),
            );
            return Err(ApiError::Conflict(format!(
                "Honeypot {} is busy: {} in progress",
                name, running
            )));
        }
    };

    let call = state.upstream.apply_action(name, action);

    match state.call_upstream(action_name, call).await {
        Ok(result) => {
            let outcome = if result.success {
                Outcome::Success
            } else {
                Outcome::UpstreamError
            };
            state.metrics.record_lifecycle(action_name, outcome);
            state
                .logger
                .log_lifecycle(name, action_name, outcome, &result.message);
            Ok(Json(result))
        }
        Err(e) => {
            state.metrics.record_lifecycle(action_name, Outcome::UpstreamError);
            state
                .logger
                .log_lifecycle(name, action_name, Outcome::UpstreamError, &e.to_string());
            Err(e.into())
        }
    }
}

async fn honeypot_action(
    State(state): State<Arc<AppState>>,
    Path((name, action)): Path<(String, String)>,
) -> Result<Json<hive_lib::OperationResult>, ApiError> {
    // Delete has its own route
    let action = match action.parse::<HoneypotAction>() {
        Ok(HoneypotAction::Delete) | Err(_) => {
            return Err(ApiError::BadRequest(format!(
                "Unknown honeypot action: {}",
                action
            )))
        }
        Ok(action) => action,
    };
    run_lifecycle(&state, &name, action).await
}

async fn delete_honeypot(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<hive_lib::OperationResult>, ApiError> {
    run_lifecycle(&state, &name, HoneypotAction::Delete).await
}

async fn check_port(
    State(state): State<Arc<AppState>>,
    Path(port): Path<u16>,
    headers: HeaderMap,
) -> Result<Json<PortAvailability>, ApiError> {
    let range = state.catalog.validate_host_port(port as u32);
    if !range.is_valid {
        return Ok(Json(PortAvailability {
            port,
            available: false,
            message: range.message,
        }));
    }

    let session = headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty());

    let Some(session) = session else {
        let availability = state
            .call_upstream("port_check", state.upstream.check_port_availability(port))
            .await?;
        return Ok(Json(availability));
    };

    let checker = state.port_checks.checker_for(session, &state.upstream);
    match state.call_upstream("port_check", checker.check(port)).await? {
        PortCheckOutcome::Checked(availability) => Ok(Json(availability)),
        PortCheckOutcome::Superseded { token } => {
            state.metrics.inc_port_check_superseded();
            Err(ApiError::Conflict(format!(
                "Port check {} superseded by a newer check",
                token
            )))
        }
    }
}

async fn list_services(State(state): State<Arc<AppState>>) -> Result<Json<ServiceList>, ApiError> {
    let services = state
        .call_upstream("services_list", state.upstream.list_services())
        .await?;
    Ok(Json(ServiceList { services }))
}

async fn service_action(
    State(state): State<Arc<AppState>>,
    Path(action): Path<String>,
    Json(body): Json<ServiceActionRequest>,
) -> Result<Json<hive_lib::OperationResult>, ApiError> {
    let action: ServiceAction = action.parse().map_err(ApiError::BadRequest)?;

    let policy = validate_admin_password(&body.admin_password);
    if !policy.is_valid {
        state.metrics.inc_validation_rejection("admin_password");
        state
            .logger
            .log_service_bulk_action(action.as_str(), false, &policy.message);
        return Err(ApiError::Invalid(json!(policy)));
    }

    let _guard = state
        .operations
        .try_begin(SERVICES_KEY, action.as_str())
        .map_err(|running| {
            ApiError::Conflict(format!("Services are busy: {} in progress", running))
        })?;

    let result = state
        .call_upstream(
            action.as_str(),
            state.upstream.service_action(action, &body.admin_password),
        )
        .await;

    match result {
        Ok(result) => {
            state
                .logger
                .log_service_bulk_action(action.as_str(), result.success, &result.message);
            Ok(Json(result))
        }
        Err(e) => {
            state
                .logger
                .log_service_bulk_action(action.as_str(), false, &e.to_string());
            Err(e.into())
        }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/validate/resources", post(validate_resources))
        .route("/api/v1/validate/credentials", post(validate_credentials))
        .route("/api/v1/validate/banner", post(validate_banner))
        .route("/api/v1/validate/banner/sanitize", post(sanitize))
        .route("/api/v1/validate/submission", post(validate_submission))
        .route("/api/v1/types", get(list_types))
        .route("/api/v1/honeypots", get(list_honeypots).post(create_honeypot))
        .route(
            "/api/v1/honeypots/:name",
            get(honeypot_status).delete(delete_honeypot),
        )
        .route("/api/v1/honeypots/:name/:action", post(honeypot_action))
        .route("/api/v1/ports/:port", get(check_port))
        .route("/api/v1/services", get(list_services))
        .route("/api/v1/services/:action", post(service_action))
        .with_state(state)
}

/// Start the API server and run until `shutdown` resolves
pub async fn serve<F>(port: u16, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!(addr = %addr, "Starting gateway API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
