use std::time::Duration;

use async_trait::async_trait;
use skysense_api::models::Id;
use skysense_api::restful::{
    DeviceListResponse, DeviceSummary, ErrorResponse, HistoryResponse, LoginRequest,
    LoginResponse, RainObservation, RainRecapResponse, TelemetryResponse,
};

use crate::error::{Error, Result};

/// Seam between the fetch-driving components and the HTTP client. Pollers
/// and pagers consume this; tests substitute fakes.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn device_telemetry(&self, token: &str, device_id: Id) -> Result<TelemetryResponse>;

    async fn device_history(
        &self,
        token: &str,
        device_id: Id,
        page: u32,
    ) -> Result<HistoryResponse>;
}

/// Typed client for the remote telemetry API.
///
/// Credential-agnostic: authenticated calls take the bearer token as an
/// argument and callers resolve it from the session store. No retries and
/// no caching; one call, one request.
#[derive(Debug, Clone)]
pub struct TelemetryClient {
    base_url: String,
    client: reqwest::Client,
}

impl TelemetryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();

        Self::with_http_client(base_url, client)
    }

    /// Same client with caller-tuned `reqwest` settings.
    pub fn with_http_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchanges credentials for a token and profile. No side effect on
    /// stored session state; persisting the result is the session guard's
    /// job.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        self.request_json(
            self.client
                .post(format!("{}/api/login", self.base_url))
                .json(&body),
        )
        .await
    }

    /// Stations registered to `user_id`, each with its freshest reading
    /// when one exists.
    pub async fn list_devices(&self, token: &str, user_id: Id) -> Result<Vec<DeviceSummary>> {
        let response: DeviceListResponse = self
            .request_json(
                self.client
                    .get(format!("{}/api/user-devices/{user_id}", self.base_url))
                    .bearer_auth(token),
            )
            .await?;

        Ok(response.data)
    }

    /// Latest reading plus the sparse per-model forecast rows for one
    /// station.
    pub async fn device_telemetry(&self, token: &str, device_id: Id) -> Result<TelemetryResponse> {
        self.request_json(
            self.client
                .get(format!("{}/api/device/exsmoth/{device_id}", self.base_url))
                .bearer_auth(token),
        )
        .await
    }

    /// One page of historical readings, 1-based. Pages past the end come
    /// back empty rather than failing; nothing is pre-validated here.
    pub async fn device_history(
        &self,
        token: &str,
        device_id: Id,
        page: u32,
    ) -> Result<HistoryResponse> {
        self.request_json(
            self.client
                .get(format!(
                    "{}/api/device/history/{device_id}?page={page}",
                    self.base_url
                ))
                .bearer_auth(token),
        )
        .await
    }

    /// Freshest reading of every station currently reporting rain-grade
    /// humidity, flattened out of the keyed wire map and ordered by device.
    pub async fn rainy_recap(&self, token: &str) -> Result<Vec<RainObservation>> {
        let response: RainRecapResponse = self
            .request_json(
                self.client
                    .get(format!("{}/api/device/weather/rainy", self.base_url))
                    .bearer_auth(token),
            )
            .await?;

        let mut observations: Vec<_> = response.rainy_conditions.into_values().collect();
        observations.sort_by_key(|observation| observation.device_id);

        Ok(observations)
    }

    async fn request_json<T: serde::de::DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| Error::server(status.as_u16(), format!("malformed body: {e}")));
        }

        let message = error_message(response).await;
        match status.as_u16() {
            401 | 403 => Err(Error::auth(message)),
            code => Err(Error::server(code, message)),
        }
    }
}

#[async_trait]
impl TelemetrySource for TelemetryClient {
    async fn device_telemetry(&self, token: &str, device_id: Id) -> Result<TelemetryResponse> {
        TelemetryClient::device_telemetry(self, token, device_id).await
    }

    async fn device_history(
        &self,
        token: &str,
        device_id: Id,
        page: u32,
    ) -> Result<HistoryResponse> {
        TelemetryClient::device_history(self, token, device_id, page).await
    }
}

/// Pulls the message out of the standard error envelope, falling back to
/// the HTTP reason phrase for non-conforming bodies.
async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    serde_json::from_str::<ErrorResponse>(&body)
        .map(|payload| payload.error.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        })
}
