use crate::validate::is_valid_email;
use crate::{AppState, EmailDraft, PhaseState, PhaseStatus, SendOutcome};

/// Research excerpts longer than this are cut for display.
pub const EXCERPT_PREVIEW_CHARS: usize = 160;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub keyword: String,
    pub research: PhaseView,
    pub research_rows: Vec<ResearchRowView>,
    pub selected_count: usize,
    pub generation: PhaseView,
    pub can_start_generation: bool,
    pub drafts: Vec<EmailDraft>,
    pub send: PhaseView,
    pub can_start_send: bool,
    pub from_email: String,
    pub dry_run: bool,
    pub outcomes: Vec<SendOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhaseView {
    pub status: PhaseStatus,
    pub job_id: Option<String>,
    pub progress_percent: u8,
    /// Validation message if the last start was rejected, else the phase error.
    pub error: Option<String>,
    pub saved_csv_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchRowView {
    pub url: String,
    pub domain: String,
    pub title: String,
    pub contact_email: String,
    /// Empty counts as valid; the user may fill it in later.
    pub contact_email_valid: bool,
    pub contact_form_url: Option<String>,
    pub guidelines_url: Option<String>,
    pub excerpt: Option<String>,
    pub selected: bool,
}

impl AppViewModel {
    pub(crate) fn from_state(state: &AppState) -> Self {
        let research_rows = state
            .research
            .results()
            .iter()
            .map(|row| ResearchRowView {
                url: row.url.clone(),
                domain: row.display_domain(),
                title: row.title.clone(),
                contact_email: row.contact_email.clone(),
                contact_email_valid: row.contact_email.trim().is_empty()
                    || is_valid_email(&row.contact_email),
                contact_form_url: row.contact_form_url.clone(),
                guidelines_url: row.guidelines_url.clone(),
                excerpt: row.page_excerpt.as_deref().map(preview),
                selected: state.selection.contains(&row.url),
            })
            .collect();

        Self {
            keyword: state.research_form.keyword.clone(),
            research: phase_view(&state.research),
            research_rows,
            selected_count: state.selection.len(),
            generation: phase_view(&state.generation),
            can_start_generation: !state.generation.status().is_busy()
                && state.generation_request().is_ok(),
            drafts: state.generation.results().to_vec(),
            send: phase_view(&state.send),
            can_start_send: !state.send.status().is_busy() && state.send_request().is_ok(),
            from_email: state.send_form.from_email.clone(),
            dry_run: state.send_form.dry_run,
            outcomes: state.send.results().to_vec(),
        }
    }
}

fn phase_view<R>(phase: &PhaseState<R>) -> PhaseView {
    PhaseView {
        status: phase.status(),
        job_id: phase.job_id().map(ToOwned::to_owned),
        progress_percent: (phase.progress() * 100.0).round() as u8,
        error: phase
            .validation_error()
            .map(ToString::to_string)
            .or_else(|| phase.error().map(ToOwned::to_owned)),
        saved_csv_path: phase.saved_csv_path().map(ToOwned::to_owned),
    }
}

fn preview(excerpt: &str) -> String {
    let mut chars = excerpt.chars();
    let head: String = chars.by_ref().take(EXCERPT_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
