use std::fmt;

/// Opaque identifier issued by the backend when a job is started.
pub type JobId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Research,
    Generation,
    Send,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Research => write!(f, "research"),
            Phase::Generation => write!(f, "email generation"),
            Phase::Send => write!(f, "send"),
        }
    }
}

/// Client-side lifecycle of a single phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseStatus {
    #[default]
    Idle,
    Starting,
    Polling,
    Done,
    Failed,
}

impl PhaseStatus {
    /// A start call or poll loop is outstanding.
    pub fn is_busy(self) -> bool {
        matches!(self, PhaseStatus::Starting | PhaseStatus::Polling)
    }
}

/// Backend-reported job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }
}

/// One status read for a job, already decoded into core row types.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot<R> {
    pub status: JobStatus,
    pub progress: f64,
    pub error: Option<String>,
    pub results: Option<Vec<R>>,
    pub saved_csv_path: Option<String>,
}

impl<R> JobSnapshot<R> {
    pub fn running(progress: f64) -> Self {
        Self {
            status: JobStatus::Running,
            progress,
            error: None,
            results: None,
            saved_csv_path: None,
        }
    }

    pub fn done(results: Vec<R>) -> Self {
        Self {
            status: JobStatus::Done,
            progress: 1.0,
            error: None,
            results: Some(results),
            saved_csv_path: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Error,
            progress: 0.0,
            error: Some(error.into()),
            results: None,
            saved_csv_path: None,
        }
    }
}

/// A prospect found by the research phase. `url` is unique within a result set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResearchResult {
    pub url: String,
    pub domain: String,
    pub title: String,
    pub contact_email: String,
    pub contact_form_url: Option<String>,
    pub guidelines_url: Option<String>,
    pub context_source: Option<String>,
    pub page_excerpt: Option<String>,
}

impl ResearchResult {
    /// Domain as reported, falling back to the URL host, then the URL itself.
    pub fn display_domain(&self) -> String {
        if !self.domain.trim().is_empty() {
            return self.domain.clone();
        }
        url::Url::parse(&self.url)
            .ok()
            .and_then(|parsed| parsed.host_str().map(ToOwned::to_owned))
            .unwrap_or_else(|| self.url.clone())
    }
}

/// A generated email. Recipient, subject and body are user-editable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmailDraft {
    pub to_email: String,
    pub subject: String,
    pub body: String,
    pub url: Option<String>,
    pub domain: Option<String>,
    pub title: Option<String>,
    pub context_source: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub status: Option<String>,
    pub note: Option<String>,
}

/// Reference to the submitted row a send outcome belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeRow {
    Index(u64),
    Key(String),
}

impl fmt::Display for OutcomeRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeRow::Index(index) => write!(f, "{index}"),
            OutcomeRow::Key(key) => write!(f, "{key}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SendOutcome {
    pub row: Option<OutcomeRow>,
    pub to_email: Option<String>,
    pub status: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}
