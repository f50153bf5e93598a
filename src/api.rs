//! Client for the remote records API.
//!
//! The API owns all persistence. This process only posts new measurements
//! and lists existing ones; there are no timeouts or retries.

use crate::errors::ApiError;
use crate::models::{DateRange, GlucosePayload, Record, VitalsPayload};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

pub const VITALS_PATH: &str = "/api/registro";
pub const VITALS_LIST_PATH: &str = "/api/registros";
pub const GLUCOSE_PATH: &str = "/api/glicemia/mary";
pub const GLUCOSE_LIST_PATH: &str = "/api/glicemia/mary/list";

#[async_trait]
pub trait HealthApi: Send + Sync {
    async fn submit_vitals(&self, payload: &VitalsPayload) -> Result<(), ApiError>;

    async fn submit_glucose(&self, payload: &GlucosePayload) -> Result<(), ApiError>;

    async fn list_glucose(&self) -> Result<Vec<Record>, ApiError>;

    async fn list_vitals(&self, range: &DateRange) -> Result<Vec<Record>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpHealthApi {
    client: Client,
    base_url: String,
}

impl HttpHealthApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.build_url(path))
            .json(body)
            .send()
            .await
            .inspect_err(|err| warn!(path, "POST failed: {err}"))?;

        info!(path, status = %response.status(), "POST");
        ensure_success(response).await.map(|_| ())
    }

    async fn get_records(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<Record>, ApiError> {
        let response = self
            .client
            .get(self.build_url(path))
            .query(query)
            .send()
            .await
            .inspect_err(|err| warn!(path, "GET failed: {err}"))?;

        info!(path, status = %response.status(), "GET");
        let response = ensure_success(response).await?;
        let body: Value = response.json().await.map_err(|err| {
            warn!(path, "list body is not JSON: {err}");
            ApiError::UnexpectedFormat
        })?;
        records_from_json(&body)
    }
}

#[async_trait]
impl HealthApi for HttpHealthApi {
    async fn submit_vitals(&self, payload: &VitalsPayload) -> Result<(), ApiError> {
        self.post_json(VITALS_PATH, payload).await
    }

    async fn submit_glucose(&self, payload: &GlucosePayload) -> Result<(), ApiError> {
        self.post_json(GLUCOSE_PATH, payload).await
    }

    async fn list_glucose(&self) -> Result<Vec<Record>, ApiError> {
        self.get_records(GLUCOSE_LIST_PATH, &[]).await
    }

    async fn list_vitals(&self, range: &DateRange) -> Result<Vec<Record>, ApiError> {
        self.get_records(VITALS_LIST_PATH, &range.query_pairs()).await
    }
}

async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Rejected {
        status: status.as_u16(),
        body,
    })
}

/// A list body must be a JSON array; its elements are read leniently.
pub fn records_from_json(body: &Value) -> Result<Vec<Record>, ApiError> {
    body.as_array()
        .map(|items| items.iter().map(Record::from_value).collect())
        .ok_or(ApiError::UnexpectedFormat)
}
