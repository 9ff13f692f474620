//! HTTP client for the container backend
//!
//! Submissions and admin passwords are checked locally first; a request that
//! fails validation never leaves the process.

use super::{LifecycleApi, LifecycleError, RestartStrategy};
use crate::catalog::HoneypotCatalog;
use crate::models::{
    CreateHoneypotRequest, HoneypotAction, HoneypotList, HoneypotRecord, OperationResult,
    PortAvailability, ServiceAction, ServiceActionRequest, ServiceList, ServiceRecord,
};
use crate::validation::{validate_admin_password, validate_honeypot_name, validate_submission};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::{ParseError, Url};

/// HTTP implementation of [`LifecycleApi`]
pub struct HttpLifecycleClient {
    client: Client,
    base_url: Url,
    restart_strategy: RestartStrategy,
    catalog: HoneypotCatalog,
}

impl HttpLifecycleClient {
    /// Create a client with default settings
    pub fn new(base_url: &str) -> Result<Self, LifecycleError> {
        HttpLifecycleClientBuilder::new(base_url).build()
    }

    pub fn builder(base_url: impl Into<String>) -> HttpLifecycleClientBuilder {
        HttpLifecycleClientBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn restart_strategy(&self) -> RestartStrategy {
        self.restart_strategy
    }

    pub fn catalog(&self) -> &HoneypotCatalog {
        &self.catalog
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, LifecycleError> {
        let url = self.base_url.join(path)?;
        Ok(self.client.request(method, url))
    }

    /// URL of `api/v1/honeypots/{name}[/{action}]`
    ///
    /// The name is checked first and then appended as a single encoded path
    /// segment, so it can never address another endpoint.
    pub fn honeypot_url(
        &self,
        name: &str,
        action: Option<HoneypotAction>,
    ) -> Result<Url, LifecycleError> {
        let check = validate_honeypot_name(name);
        if !check.is_valid {
            return Err(LifecycleError::Validation(vec![check.message]));
        }

        let mut endpoint = self.base_url.clone();
        {
            let mut segments = endpoint
                .path_segments_mut()
                .map_err(|_| {
                    LifecycleError::InvalidUrl(ParseError::RelativeUrlWithCannotBeABaseBase)
                })?;
            segments.pop_if_empty().extend(["api", "v1", "honeypots", name]);
            if let Some(action) = action {
                segments.push(action.as_str());
            }
        }
        Ok(endpoint)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, LifecycleError> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LifecycleError::Api { status, body });
        }

        Ok(response.json().await?)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, LifecycleError> {
        self.send(self.request(Method::GET, path)?).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, LifecycleError> {
        self.send(self.request(Method::POST, path)?.json(body)).await
    }

    async fn post_action(
        &self,
        name: &str,
        action: HoneypotAction,
    ) -> Result<OperationResult, LifecycleError> {
        let url = self.honeypot_url(name, Some(action))?;
        debug!(honeypot = %name, action = %action, "Sending lifecycle request");
        self.send(self.client.post(url).json(&serde_json::json!({}))).await
    }
}

#[async_trait]
impl LifecycleApi for HttpLifecycleClient {
    async fn create_honeypot(
        &self,
        request: &CreateHoneypotRequest,
    ) -> Result<HoneypotRecord, LifecycleError> {
        let report = validate_submission(request, &self.catalog);
        if !report.is_valid {
            warn!(
                honeypot_type = %request.honeypot_type,
                port = request.port,
                failures = report.messages.len(),
                "Refusing invalid honeypot submission"
            );
            return Err(LifecycleError::Validation(report.messages));
        }

        let record: HoneypotRecord = self.post("api/v1/honeypots", request).await?;
        info!(
            honeypot = %record.name,
            honeypot_type = %record.honeypot_type,
            port = record.port,
            "Honeypot created"
        );
        Ok(record)
    }

    async fn list_honeypots(&self) -> Result<Vec<HoneypotRecord>, LifecycleError> {
        let list: HoneypotList = self.get("api/v1/honeypots").await?;
        Ok(list.honeypots)
    }

    async fn honeypot_status(&self, name: &str) -> Result<HoneypotRecord, LifecycleError> {
        let url = self.honeypot_url(name, None)?;
        self.send(self.client.get(url)).await
    }

    async fn start_honeypot(&self, name: &str) -> Result<OperationResult, LifecycleError> {
        self.post_action(name, HoneypotAction::Start).await
    }

    async fn stop_honeypot(&self, name: &str) -> Result<OperationResult, LifecycleError> {
        self.post_action(name, HoneypotAction::Stop).await
    }

    async fn restart_honeypot(&self, name: &str) -> Result<OperationResult, LifecycleError> {
        match self.restart_strategy {
            RestartStrategy::Endpoint => self.post_action(name, HoneypotAction::Restart).await,
            RestartStrategy::StopThenStart { delay } => {
                let stopped = self.post_action(name, HoneypotAction::Stop).await?;
                if !stopped.success {
                    return Ok(OperationResult {
                        action: "restart".to_string(),
                        ..stopped
                    });
                }

                tokio::time::sleep(delay).await;

                let started = self.post_action(name, HoneypotAction::Start).await?;
                Ok(OperationResult {
                    action: "restart".to_string(),
                    ..started
                })
            }
        }
    }

    async fn delete_honeypot(&self, name: &str) -> Result<OperationResult, LifecycleError> {
        let url = self.honeypot_url(name, None)?;
        self.send(self.client.delete(url)).await
    }

    async fn check_port_availability(
        &self,
        port: u16,
    ) -> Result<PortAvailability, LifecycleError> {
        self.get(&format!("api/v1/ports/{}", port)).await
    }

    async fn list_services(&self) -> Result<Vec<ServiceRecord>, LifecycleError> {
        let list: ServiceList = self.get("api/v1/services").await?;
        Ok(list.services)
    }

    async fn service_action(
        &self,
        action: ServiceAction,
        admin_password: &str,
    ) -> Result<OperationResult, LifecycleError> {
        let policy = validate_admin_password(admin_password);
        if !policy.is_valid {
            return Err(LifecycleError::Validation(vec![policy.message]));
        }

        let body = ServiceActionRequest {
            admin_password: admin_password.to_string(),
        };
        let result: OperationResult = self
            .post(&format!("api/v1/services/{}", action), &body)
            .await?;
        info!(action = %action, success = result.success, "Service bulk action completed");
        Ok(result)
    }
}

/// Builder for [`HttpLifecycleClient`]
pub struct HttpLifecycleClientBuilder {
    base_url: String,
    timeout: Duration,
    restart_strategy: RestartStrategy,
    catalog: Option<HoneypotCatalog>,
}

impl HttpLifecycleClientBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            restart_strategy: RestartStrategy::default(),
            catalog: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn restart_strategy(mut self, strategy: RestartStrategy) -> Self {
        self.restart_strategy = strategy;
        self
    }

    /// Catalog used for local port validation (defaults to the built-in one)
    pub fn catalog(mut self, catalog: HoneypotCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn build(self) -> Result<HttpLifecycleClient, LifecycleError> {
        let client = Client::builder().timeout(self.timeout).build()?;

        // Url::join drops the last path segment unless the base ends with '/'
        let mut base = self.base_url;
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)?;

        Ok(HttpLifecycleClient {
            client,
            base_url,
            restart_strategy: self.restart_strategy,
            catalog: self.catalog.unwrap_or_else(HoneypotCatalog::builtin),
        })
    }
}
