use crate::form::{LlmProvider, SendProvider, SmtpSettings};
use crate::{EmailDraft, JobId, JobSnapshot, Phase, ResearchResult, SendOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    ToEmail,
    Subject,
    Body,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the research keyword.
    KeywordChanged(String),
    MaxResultsChanged(u32),
    /// User asked to start research.
    ResearchSubmitted,
    /// User toggled selection of one research row.
    UrlToggled(String),
    SelectAll,
    SelectionCleared,
    /// User corrected the contact address of a research row.
    ContactEmailEdited { url: String, email: String },
    SubjectChanged(String),
    TakeChanged(u32),
    LlmProviderChanged(LlmProvider),
    ModelChanged(String),
    YourNameChanged(String),
    YourEmailChanged(String),
    /// User asked to generate drafts from the selected rows.
    GenerationSubmitted,
    /// User edited one field of one draft.
    DraftEdited {
        index: usize,
        field: DraftField,
        value: String,
    },
    FromEmailChanged(String),
    SendProviderChanged(SendProvider),
    RateLimitChanged(u32),
    DryRunToggled(bool),
    SandboxToggled(bool),
    SmtpChanged(Option<SmtpSettings>),
    /// User asked to send the drafts.
    SendSubmitted,
    /// Backend accepted a start call.
    JobStarted { phase: Phase, job_id: JobId },
    /// Start call failed before a job id was issued.
    JobStartFailed { phase: Phase, error: String },
    /// Poll loop read a research job status.
    ResearchPolled {
        job_id: JobId,
        snapshot: JobSnapshot<ResearchResult>,
    },
    GenerationPolled {
        job_id: JobId,
        snapshot: JobSnapshot<EmailDraft>,
    },
    SendPolled {
        job_id: JobId,
        snapshot: JobSnapshot<SendOutcome>,
    },
    /// Poll loop stopped on a transport or decode failure.
    PollFailed {
        phase: Phase,
        job_id: JobId,
        error: String,
    },
    /// Render tick.
    Tick,
    NoOp,
}
