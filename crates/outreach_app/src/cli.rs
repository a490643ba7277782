use clap::{Args, Parser, Subcommand, ValueEnum};
use outreach_core::{LlmProvider, SendProvider, DEFAULT_SUBJECT};
use outreach_engine::ApiSettings;

use crate::logging::LogDestination;

#[derive(Debug, Parser)]
#[command(
    name = "outreach",
    version,
    about = "Research sites, draft outreach emails and send them through the outreach backend"
)]
pub struct Cli {
    /// Base URL of the backend job API.
    #[arg(long, env = "OUTREACH_API_BASE_URL", default_value = ApiSettings::DEFAULT_BASE_URL, global = true)]
    pub api_base_url: String,

    /// Delay between status requests for a running job.
    #[arg(long, env = "OUTREACH_POLL_INTERVAL_MS", default_value_t = 1500, global = true)]
    pub poll_interval_ms: u64,

    /// Upper bound for a single HTTP request.
    #[arg(long, env = "OUTREACH_REQUEST_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub request_timeout_secs: u64,

    #[arg(long, env = "OUTREACH_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    #[arg(long, value_enum, default_value_t = LogDestination::File, global = true)]
    pub log_to: LogDestination,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the backend is reachable
    Health,
    /// Run research, draft generation and sending end to end
    Run(RunArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    #[arg(long)]
    pub keyword: String,

    #[arg(long, default_value_t = 10)]
    pub max_results: u32,

    /// Research row to draft for, by URL. Repeatable; defaults to the first 100 rows.
    #[arg(long = "select", value_name = "URL")]
    pub select: Vec<String>,

    #[arg(long, default_value = DEFAULT_SUBJECT)]
    pub subject: String,

    /// Number of drafts to generate.
    #[arg(long, default_value_t = 5)]
    pub take: u32,

    #[arg(long, value_enum, default_value_t = LlmChoice::Gemini)]
    pub llm: LlmChoice,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub your_name: Option<String>,

    #[arg(long)]
    pub your_email: Option<String>,

    /// Sender address; defaults to --your-email.
    #[arg(long)]
    pub from_email: Option<String>,

    #[arg(long, value_enum, default_value_t = SendChoice::Smtp)]
    pub send_provider: SendChoice,

    #[arg(long, default_value_t = 10)]
    pub rate_limit: u32,

    /// Actually deliver mail. Without this flag the send phase is a dry run.
    #[arg(long)]
    pub live: bool,

    #[arg(long)]
    pub sandbox: bool,

    #[arg(long)]
    pub smtp_host: Option<String>,

    #[arg(long, default_value_t = 587)]
    pub smtp_port: u16,

    #[arg(long)]
    pub smtp_user: Option<String>,

    #[arg(long, env = "OUTREACH_SMTP_PASS", hide_env_values = true)]
    pub smtp_pass: Option<String>,

    /// Stop after draft generation.
    #[arg(long)]
    pub no_send: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LlmChoice {
    Gemini,
    Openai,
}

impl From<LlmChoice> for LlmProvider {
    fn from(choice: LlmChoice) -> Self {
        match choice {
            LlmChoice::Gemini => LlmProvider::Gemini,
            LlmChoice::Openai => LlmProvider::Openai,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SendChoice {
    Smtp,
    Sendgrid,
    Mailersend,
}

impl From<SendChoice> for SendProvider {
    fn from(choice: SendChoice) -> Self {
        match choice {
            SendChoice::Smtp => SendProvider::Smtp,
            SendChoice::Sendgrid => SendProvider::Sendgrid,
            SendChoice::Mailersend => SendProvider::Mailersend,
        }
    }
}
