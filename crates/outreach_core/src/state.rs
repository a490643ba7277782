use std::collections::BTreeSet;

use crate::form::{
    GenerationForm, GenerationRequest, ResearchForm, SendForm, SendRequest, SendRow,
};
use crate::validate::{self, is_valid_email, ValidationError};
use crate::view_model::AppViewModel;
use crate::{EmailDraft, Phase, PhaseState, PhaseStatus, ResearchResult, SendOutcome};

/// Whole-workflow state. Only [`crate::update`] mutates it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) research_form: ResearchForm,
    pub(crate) research: PhaseState<ResearchResult>,
    /// Selected research rows, keyed by URL.
    pub(crate) selection: BTreeSet<String>,
    pub(crate) generation_form: GenerationForm,
    pub(crate) generation: PhaseState<EmailDraft>,
    pub(crate) send_form: SendForm,
    pub(crate) send: PhaseState<SendOutcome>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::from_state(self)
    }

    pub fn research(&self) -> &PhaseState<ResearchResult> {
        &self.research
    }

    pub fn generation(&self) -> &PhaseState<EmailDraft> {
        &self.generation
    }

    pub fn send(&self) -> &PhaseState<SendOutcome> {
        &self.send
    }

    pub fn research_form(&self) -> &ResearchForm {
        &self.research_form
    }

    pub fn generation_form(&self) -> &GenerationForm {
        &self.generation_form
    }

    pub fn send_form(&self) -> &SendForm {
        &self.send_form
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selection
    }

    pub fn phase_status(&self, phase: Phase) -> PhaseStatus {
        match phase {
            Phase::Research => self.research.status(),
            Phase::Generation => self.generation.status(),
            Phase::Send => self.send.status(),
        }
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Builds the generation request from the research results and current selection.
    pub(crate) fn generation_request(&self) -> Result<GenerationRequest, ValidationError> {
        let research_job_id = match (self.research.status(), self.research.completed_job_id()) {
            (PhaseStatus::Done, Some(job_id)) => job_id.to_string(),
            _ => return Err(ValidationError::ResearchNotDone),
        };
        validate::selection(self.selection.len())?;
        // Rows without a usable contact address are dropped from the request.
        let selected_urls: Vec<String> = self
            .research
            .results()
            .iter()
            .filter(|row| self.selection.contains(&row.url) && is_valid_email(&row.contact_email))
            .map(|row| row.url.clone())
            .collect();
        if selected_urls.is_empty() {
            return Err(ValidationError::NoContactEmails);
        }
        validate::generation_form(&self.generation_form)?;

        let form = &self.generation_form;
        Ok(GenerationRequest {
            research_job_id,
            selected_urls,
            subject: form.subject.trim().to_string(),
            take: form.take,
            provider: form.provider,
            model: non_empty(&form.model),
            your_name: non_empty(&form.your_name),
            your_email: non_empty(&form.your_email),
        })
    }

    /// Builds the send request from drafts that have a recipient.
    pub(crate) fn send_request(&self) -> Result<SendRequest, ValidationError> {
        if self.generation.status() != PhaseStatus::Done {
            return Err(ValidationError::GenerationNotDone);
        }
        let drafts = self.generation.results();
        if drafts.is_empty() {
            return Err(ValidationError::NoDrafts);
        }

        let mut rows = Vec::with_capacity(drafts.len());
        for (index, draft) in drafts.iter().enumerate() {
            let to_email = draft.to_email.trim();
            if to_email.is_empty() {
                continue;
            }
            if !is_valid_email(to_email) {
                return Err(ValidationError::InvalidRecipient {
                    index,
                    address: to_email.to_string(),
                });
            }
            rows.push(SendRow {
                to_email: to_email.to_string(),
                subject: draft.subject.clone(),
                body: draft.body.clone(),
            });
        }
        if rows.is_empty() {
            return Err(ValidationError::NoRecipients);
        }

        let form = &self.send_form;
        let from_email = validate::sender(&form.from_email)?;
        validate::rate_limit(form.rate_limit_per_sec)?;
        Ok(SendRequest {
            provider: form.provider,
            from_email,
            rows,
            rate_limit_per_sec: form.rate_limit_per_sec,
            dry_run: form.dry_run,
            sandbox: form.sandbox,
            smtp: form.smtp.clone(),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
