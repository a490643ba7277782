use std::time::Duration;

use futures_util::StreamExt;
use outreach_logging::{outreach_debug, outreach_trace};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::{
    ApiError, EmailGenerateStartRequest, EmailRow, FailureKind, JobId, Phase, ResearchRow,
    ResearchStartRequest, SendOutcomeRow, SendStartRequest, StartResponse, StatusResponse,
};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_body_bytes: u64,
}

impl ApiSettings {
    pub const DEFAULT_BASE_URL: &'static str = "http://127.0.0.1:8000";

    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Start/status calls of the backend job API, one pair per phase.
#[async_trait::async_trait]
pub trait BackendApi: Send + Sync {
    async fn health(&self) -> Result<(), ApiError>;

    async fn start_research(&self, request: &ResearchStartRequest) -> Result<JobId, ApiError>;

    async fn research_status(&self, job_id: &str)
        -> Result<StatusResponse<ResearchRow>, ApiError>;

    async fn start_generation(
        &self,
        request: &EmailGenerateStartRequest,
    ) -> Result<JobId, ApiError>;

    async fn generation_status(&self, job_id: &str)
        -> Result<StatusResponse<EmailRow>, ApiError>;

    async fn start_send(&self, request: &SendStartRequest) -> Result<JobId, ApiError>;

    async fn send_status(&self, job_id: &str) -> Result<StatusResponse<SendOutcomeRow>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let mut settings = settings;
        // `Url::join` drops the last path segment unless the base ends with '/'.
        if !settings.base_url.path().ends_with('/') {
            let path = format!("{}/", settings.base_url.path());
            settings.base_url.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.settings
            .base_url
            .join(path)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn start<B: Serialize + Sync>(&self, phase: Phase, body: &B) -> Result<JobId, ApiError> {
        let url = self.endpoint(phase.start_path())?;
        let payload = serde_json::to_vec(body)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        outreach_debug!("POST {url} ({} bytes)", payload.len());

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let bytes = self.read_body(response).await?;
        let started: StartResponse = decode(&bytes)?;
        if started.job_id.trim().is_empty() {
            return Err(ApiError::new(FailureKind::Decode, "empty job_id"));
        }
        Ok(started.job_id)
    }

    async fn status<T: DeserializeOwned>(
        &self,
        phase: Phase,
        job_id: &str,
    ) -> Result<StatusResponse<T>, ApiError> {
        let mut url = self.endpoint(phase.status_path())?;
        url.path_segments_mut()
            .map_err(|_| ApiError::new(FailureKind::InvalidUrl, "base url cannot have a path"))?
            .push(job_id);
        outreach_trace!("GET {url}");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let bytes = self.read_body(response).await?;
        let status: StatusResponse<T> = decode(&bytes)?;
        status.check(job_id)?;
        Ok(status)
    }

    /// Fails on non-2xx with the response text, otherwise reads the body up to the size limit.
    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!(
                    "{} ({}): {}",
                    status.canonical_reason().unwrap_or("Error"),
                    status.as_u16(),
                    text
                ),
            ));
        }

        let max_bytes = self.settings.max_body_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ApiError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl BackendApi for ReqwestBackend {
    async fn health(&self) -> Result<(), ApiError> {
        let url = self.endpoint("health")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        self.read_body(response).await.map(|_| ())
    }

    async fn start_research(&self, request: &ResearchStartRequest) -> Result<JobId, ApiError> {
        self.start(Phase::Research, request).await
    }

    async fn research_status(
        &self,
        job_id: &str,
    ) -> Result<StatusResponse<ResearchRow>, ApiError> {
        self.status(Phase::Research, job_id).await
    }

    async fn start_generation(
        &self,
        request: &EmailGenerateStartRequest,
    ) -> Result<JobId, ApiError> {
        self.start(Phase::Generation, request).await
    }

    async fn generation_status(
        &self,
        job_id: &str,
    ) -> Result<StatusResponse<EmailRow>, ApiError> {
        self.status(Phase::Generation, job_id).await
    }

    async fn start_send(&self, request: &SendStartRequest) -> Result<JobId, ApiError> {
        self.start(Phase::Send, request).await
    }

    async fn send_status(
        &self,
        job_id: &str,
    ) -> Result<StatusResponse<SendOutcomeRow>, ApiError> {
        self.status(Phase::Send, job_id).await
    }
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(bytes).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
