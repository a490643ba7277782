use std::fmt;

use serde::{Deserialize, Serialize};

pub type JobId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Research,
    Generation,
    Send,
}

impl Phase {
    pub(crate) fn start_path(self) -> &'static str {
        match self {
            Phase::Research => "research/start",
            Phase::Generation => "emails/generate/start",
            Phase::Send => "send/start",
        }
    }

    pub(crate) fn status_path(self) -> &'static str {
        match self {
            Phase::Research => "research/status",
            Phase::Generation => "emails/generate/status",
            Phase::Send => "send/status",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Research => write!(f, "research"),
            Phase::Generation => write!(f, "generation"),
            Phase::Send => write!(f, "send"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatusKind {
    Queued,
    Running,
    Done,
    Error,
}

impl JobStatusKind {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatusKind::Done | JobStatusKind::Error)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StartResponse {
    pub job_id: JobId,
}

/// Body of every `GET …/status/{job_id}` endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatusResponse<T> {
    pub job_id: JobId,
    pub status: JobStatusKind,
    pub progress: f64,
    pub error: Option<String>,
    pub results: Option<Vec<T>>,
    pub saved_csv_path: Option<String>,
}

impl<T> StatusResponse<T> {
    /// Shape checks serde cannot express.
    pub(crate) fn check(&self, expected_job_id: &str) -> Result<(), ApiError> {
        if self.job_id != expected_job_id {
            return Err(ApiError::new(
                FailureKind::Decode,
                format!(
                    "status for job {} returned job {}",
                    expected_job_id, self.job_id
                ),
            ));
        }
        if !self.progress.is_finite() {
            return Err(ApiError::new(
                FailureKind::Decode,
                "progress is not a finite number",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResearchRow {
    pub url: String,
    pub domain: String,
    pub title: String,
    pub contact_email: String,
    pub contact_form_url: Option<String>,
    pub guidelines_url: Option<String>,
    pub context_source: Option<String>,
    pub page_excerpt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailRow {
    pub to_email: String,
    pub subject: String,
    pub body: String,
    pub url: Option<String>,
    pub domain: Option<String>,
    pub title: Option<String>,
    pub context_source: Option<String>,
    pub excerpt_chars: Option<u64>,
    pub status: Option<String>,
    pub note: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OutcomeRowRef {
    Index(u64),
    Key(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SendOutcomeRow {
    pub row: Option<OutcomeRowRef>,
    pub to_email: Option<String>,
    pub status: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResearchStartRequest {
    pub keyword: String,
    pub max_results: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailGenerateStartRequest {
    pub research_job_id: JobId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_urls: Option<Vec<String>>,
    pub subject: String,
    pub take: u32,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub your_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub your_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendRowPayload {
    pub to_email: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct SendStartRequest {
    pub provider: String,
    pub from_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<SendRowPayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_csv: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_per_sec: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smtp_pass: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Health {
        result: Result<(), ApiError>,
    },
    /// Outcome of a start call.
    Started {
        phase: Phase,
        result: Result<JobId, ApiError>,
    },
    ResearchStatus {
        job_id: JobId,
        result: Result<StatusResponse<ResearchRow>, ApiError>,
    },
    GenerationStatus {
        job_id: JobId,
        result: Result<StatusResponse<EmailRow>, ApiError>,
    },
    SendStatus {
        job_id: JobId,
        result: Result<StatusResponse<SendOutcomeRow>, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "unexpected response shape"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
