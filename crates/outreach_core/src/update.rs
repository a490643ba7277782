use outreach_logging::{outreach_debug, outreach_info};

use crate::msg::DraftField;
use crate::validate::{self, ValidationError};
use crate::{AppState, Effect, Msg, Phase, PhaseState, PhaseStatus};

const RESEARCH_FAILED: &str = "Research failed";
const GENERATION_FAILED: &str = "Email generation failed";
const SEND_FAILED: &str = "Sending failed";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::KeywordChanged(keyword) => {
            state.research_form.keyword = keyword;
            state.mark_dirty();
            Vec::new()
        }
        Msg::MaxResultsChanged(max_results) => {
            state.research_form.max_results = max_results;
            state.mark_dirty();
            Vec::new()
        }
        Msg::ResearchSubmitted => submit_research(&mut state),
        Msg::UrlToggled(url) => {
            if state.research.results().iter().any(|row| row.url == url) {
                if !state.selection.remove(&url) {
                    state.selection.insert(url);
                }
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SelectAll => {
            let urls: Vec<String> = state
                .research
                .results()
                .iter()
                .map(|row| row.url.clone())
                .collect();
            state.selection.extend(urls);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SelectionCleared => {
            state.selection.clear();
            state.mark_dirty();
            Vec::new()
        }
        Msg::ContactEmailEdited { url, email } => {
            if let Some(row) = state
                .research
                .results_mut()
                .iter_mut()
                .find(|row| row.url == url)
            {
                row.contact_email = email;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SubjectChanged(subject) => {
            state.generation_form.subject = subject;
            state.mark_dirty();
            Vec::new()
        }
        Msg::TakeChanged(take) => {
            state.generation_form.take = take;
            state.mark_dirty();
            Vec::new()
        }
        Msg::LlmProviderChanged(provider) => {
            state.generation_form.provider = provider;
            state.mark_dirty();
            Vec::new()
        }
        Msg::ModelChanged(model) => {
            state.generation_form.model = model;
            state.mark_dirty();
            Vec::new()
        }
        Msg::YourNameChanged(name) => {
            state.generation_form.your_name = name;
            state.mark_dirty();
            Vec::new()
        }
        Msg::YourEmailChanged(email) => {
            // The sender address mirrors this field until the user sets it directly.
            if !state.send_form.from_email_edited {
                state.send_form.from_email = email.trim().to_string();
            }
            state.generation_form.your_email = email;
            state.mark_dirty();
            Vec::new()
        }
        Msg::GenerationSubmitted => submit_generation(&mut state),
        Msg::DraftEdited {
            index,
            field,
            value,
        } => {
            if let Some(draft) = state.generation.results_mut().get_mut(index) {
                match field {
                    DraftField::ToEmail => draft.to_email = value,
                    DraftField::Subject => draft.subject = value,
                    DraftField::Body => draft.body = value,
                }
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FromEmailChanged(email) => {
            state.send_form.from_email = email;
            state.send_form.from_email_edited = true;
            state.mark_dirty();
            Vec::new()
        }
        Msg::SendProviderChanged(provider) => {
            state.send_form.provider = provider;
            state.mark_dirty();
            Vec::new()
        }
        Msg::RateLimitChanged(rate) => {
            state.send_form.rate_limit_per_sec = rate;
            state.mark_dirty();
            Vec::new()
        }
        Msg::DryRunToggled(dry_run) => {
            state.send_form.dry_run = dry_run;
            state.mark_dirty();
            Vec::new()
        }
        Msg::SandboxToggled(sandbox) => {
            state.send_form.sandbox = sandbox;
            state.mark_dirty();
            Vec::new()
        }
        Msg::SmtpChanged(smtp) => {
            state.send_form.smtp = smtp;
            state.mark_dirty();
            Vec::new()
        }
        Msg::SendSubmitted => submit_send(&mut state),
        Msg::JobStarted { phase, job_id } => {
            let accepted = match phase {
                Phase::Research => state.research.start_succeeded(&job_id),
                Phase::Generation => state.generation.start_succeeded(&job_id),
                Phase::Send => state.send.start_succeeded(&job_id),
            };
            if accepted {
                outreach_info!("{phase} job {job_id} started");
                state.mark_dirty();
                vec![Effect::BeginPolling { phase, job_id }]
            } else {
                Vec::new()
            }
        }
        Msg::JobStartFailed { phase, error } => {
            let applied = match phase {
                Phase::Research => state.research.start_failed(error),
                Phase::Generation => state.generation.start_failed(error),
                Phase::Send => state.send.start_failed(error),
            };
            if applied {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ResearchPolled { job_id, snapshot } => {
            if state
                .research
                .apply_snapshot(&job_id, snapshot, RESEARCH_FAILED)
            {
                if state.research.status() == PhaseStatus::Done {
                    retain_known_selection(&mut state);
                }
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::GenerationPolled { job_id, snapshot } => {
            if state
                .generation
                .apply_snapshot(&job_id, snapshot, GENERATION_FAILED)
            {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::SendPolled { job_id, snapshot } => {
            if state.send.apply_snapshot(&job_id, snapshot, SEND_FAILED) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PollFailed {
            phase,
            job_id,
            error,
        } => {
            let applied = match phase {
                Phase::Research => state.research.poll_failed(&job_id, error),
                Phase::Generation => state.generation.poll_failed(&job_id, error),
                Phase::Send => state.send.poll_failed(&job_id, error),
            };
            if applied {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit_research(state: &mut AppState) -> Vec<Effect> {
    let request = validate::research_request(&state.research_form);
    let effects = submit(&mut state.research, Phase::Research, request, Effect::StartResearch);
    if !effects.is_empty() {
        state.selection.clear();
    }
    state.mark_dirty();
    effects
}

fn submit_generation(state: &mut AppState) -> Vec<Effect> {
    let request = state.generation_request();
    let effects = submit(
        &mut state.generation,
        Phase::Generation,
        request,
        Effect::StartGeneration,
    );
    state.mark_dirty();
    effects
}

fn submit_send(state: &mut AppState) -> Vec<Effect> {
    let request = state.send_request();
    let effects = submit(&mut state.send, Phase::Send, request, Effect::StartSend);
    state.mark_dirty();
    effects
}

/// Shared start transition: ignore while `Starting`, reject invalid input in
/// place, otherwise cancel any active poll and emit the start effect.
fn submit<R, T>(
    phase_state: &mut PhaseState<R>,
    phase: Phase,
    request: Result<T, ValidationError>,
    start: impl FnOnce(T) -> Effect,
) -> Vec<Effect> {
    if phase_state.status() == PhaseStatus::Starting {
        outreach_debug!("{phase} start ignored: already starting");
        return Vec::new();
    }
    let request = match request {
        Ok(request) => request,
        Err(err) => {
            outreach_debug!("{phase} start rejected: {err}");
            phase_state.reject(err);
            return Vec::new();
        }
    };

    let mut effects = Vec::with_capacity(2);
    if let Some(active) = phase_state.begin_start() {
        outreach_debug!("{phase} restart cancels poll of job {active}");
        effects.push(Effect::CancelPolling { phase });
    }
    effects.push(start(request));
    effects
}

fn retain_known_selection(state: &mut AppState) {
    let results = state.research.results();
    state
        .selection
        .retain(|url| results.iter().any(|row| &row.url == url));
}
