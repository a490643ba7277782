//! Outreach engine: backend HTTP client, job polling and effect execution.
mod client;
mod engine;
mod poll;
mod types;

pub use client::{ApiSettings, BackendApi, ReqwestBackend};
pub use engine::{EngineCommand, EngineHandle};
pub use poll::{poll, PollHandle};
pub use types::{
    ApiError, EmailGenerateStartRequest, EmailRow, EngineEvent, FailureKind, JobId,
    JobStatusKind, OutcomeRowRef, Phase, ResearchRow, ResearchStartRequest, SendOutcomeRow,
    SendRowPayload, SendStartRequest, StartResponse, StatusResponse,
};
