use crate::JobId;

pub const DEFAULT_SUBJECT: &str = "Guest post collaboration";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchForm {
    pub keyword: String,
    pub max_results: u32,
}

impl Default for ResearchForm {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            max_results: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LlmProvider {
    #[default]
    Gemini,
    Openai,
}

impl LlmProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini",
            LlmProvider::Openai => "openai",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationForm {
    pub subject: String,
    pub take: u32,
    pub provider: LlmProvider,
    pub model: String,
    pub your_name: String,
    pub your_email: String,
}

impl Default for GenerationForm {
    fn default() -> Self {
        Self {
            subject: DEFAULT_SUBJECT.to_string(),
            take: 5,
            provider: LlmProvider::default(),
            model: String::new(),
            your_name: String::new(),
            your_email: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SendProvider {
    #[default]
    Smtp,
    Sendgrid,
    Mailersend,
}

impl SendProvider {
    pub fn as_str(self) -> &'static str {
        match self {
            SendProvider::Smtp => "smtp",
            SendProvider::Sendgrid => "sendgrid",
            SendProvider::Mailersend => "mailersend",
        }
    }
}

/// Explicit SMTP server settings. When absent the backend uses its own environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub pass: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendForm {
    pub from_email: String,
    /// Set once the user types a sender; stops prefill from the generation form.
    pub from_email_edited: bool,
    pub provider: SendProvider,
    pub rate_limit_per_sec: u32,
    pub dry_run: bool,
    pub sandbox: bool,
    pub smtp: Option<SmtpSettings>,
}

impl Default for SendForm {
    fn default() -> Self {
        Self {
            from_email: String::new(),
            from_email_edited: false,
            provider: SendProvider::default(),
            rate_limit_per_sec: 10,
            dry_run: true,
            sandbox: false,
            smtp: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchRequest {
    pub keyword: String,
    pub max_results: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub research_job_id: JobId,
    pub selected_urls: Vec<String>,
    pub subject: String,
    pub take: u32,
    pub provider: LlmProvider,
    pub model: Option<String>,
    pub your_name: Option<String>,
    pub your_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRow {
    pub to_email: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRequest {
    pub provider: SendProvider,
    pub from_email: String,
    pub rows: Vec<SendRow>,
    pub rate_limit_per_sec: u32,
    pub dry_run: bool,
    pub sandbox: bool,
    pub smtp: Option<SmtpSettings>,
}
