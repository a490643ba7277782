//! Outreach core: pure workflow state machine and view-model helpers.
mod effect;
mod form;
mod msg;
mod phase;
mod state;
mod types;
mod update;
mod validate;
mod view_model;

pub use effect::Effect;
pub use form::{
    GenerationForm, GenerationRequest, LlmProvider, ResearchForm, ResearchRequest, SendForm,
    SendProvider, SendRequest, SendRow, SmtpSettings, DEFAULT_SUBJECT,
};
pub use msg::{DraftField, Msg};
pub use phase::PhaseState;
pub use state::AppState;
pub use types::{
    EmailDraft, JobId, JobSnapshot, JobStatus, OutcomeRow, Phase, PhaseStatus, ResearchResult,
    SendOutcome,
};
pub use update::update;
pub use validate::{
    is_valid_email, ValidationError, MAX_RESULTS_RANGE, RATE_LIMIT_RANGE, SELECTION_RANGE,
    SUBJECT_CHARS_RANGE, TAKE_RANGE,
};
pub use view_model::{AppViewModel, PhaseView, ResearchRowView, EXCERPT_PREVIEW_CHARS};
