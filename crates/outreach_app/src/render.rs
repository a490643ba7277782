//! Plain-text rendering of the view model.

use outreach_core::{AppViewModel, EmailDraft, PhaseStatus, PhaseView, ResearchRowView, SendOutcome};

/// Longest body preview shown in the drafts table.
const BODY_PREVIEW_CHARS: usize = 72;

/// Full report: phase headers followed by the tables that have rows.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(phase_line("Research", &view.research));
    if !view.research_rows.is_empty() {
        lines.push(format!(
            "  {} results for {:?}, {} selected",
            view.research_rows.len(),
            view.keyword,
            view.selected_count
        ));
        lines.extend(view.research_rows.iter().enumerate().map(|(i, row)| research_line(i, row)));
    }
    push_saved(&mut lines, &view.research);

    lines.push(phase_line("Email generation", &view.generation));
    lines.extend(view.drafts.iter().enumerate().map(|(i, draft)| draft_line(i, draft)));
    push_saved(&mut lines, &view.generation);

    let mode = if view.dry_run { "dry run" } else { "live" };
    lines.push(format!(
        "{} [{mode}, from {}]",
        phase_line("Send", &view.send),
        or_dash(&view.from_email)
    ));
    lines.extend(view.outcomes.iter().map(outcome_line));
    push_saved(&mut lines, &view.send);

    lines
}

/// One-line status such as `Research: Polling 40% (job r-1)`.
pub fn phase_line(label: &str, phase: &PhaseView) -> String {
    let mut line = format!("{label}: {}", status_label(phase.status));
    if matches!(phase.status, PhaseStatus::Polling | PhaseStatus::Done) {
        line.push_str(&format!(" {}%", phase.progress_percent));
    }
    if let Some(job_id) = &phase.job_id {
        line.push_str(&format!(" (job {job_id})"));
    }
    if let Some(error) = &phase.error {
        line.push_str(&format!(" - {error}"));
    }
    line
}

fn status_label(status: PhaseStatus) -> &'static str {
    match status {
        PhaseStatus::Idle => "Idle",
        PhaseStatus::Starting => "Starting",
        PhaseStatus::Polling => "Polling",
        PhaseStatus::Done => "Done",
        PhaseStatus::Failed => "Failed",
    }
}

fn research_line(index: usize, row: &ResearchRowView) -> String {
    let mark = if row.selected { "x" } else { " " };
    let email = if row.contact_email_valid {
        or_dash(&row.contact_email).to_string()
    } else {
        format!("{} (invalid)", row.contact_email)
    };
    let mut line = format!(
        "  [{mark}] #{index} {domain} | {title} | {email} | {url}",
        domain = row.domain,
        title = or_dash(&row.title),
        url = row.url
    );
    if let Some(form) = &row.contact_form_url {
        line.push_str(&format!(" | form {form}"));
    }
    if let Some(guidelines) = &row.guidelines_url {
        line.push_str(&format!(" | guidelines {guidelines}"));
    }
    line
}

fn draft_line(index: usize, draft: &EmailDraft) -> String {
    let mut body: String = draft
        .body
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if body.chars().count() > BODY_PREVIEW_CHARS {
        body = body.chars().take(BODY_PREVIEW_CHARS).collect::<String>() + "…";
    }
    let mut line = format!(
        "  #{index} to {} | {} | {body}",
        or_dash(&draft.to_email),
        draft.subject
    );
    if let Some(status) = &draft.status {
        line.push_str(&format!(" [{status}]"));
    }
    line
}

fn outcome_line(outcome: &SendOutcome) -> String {
    let row = outcome
        .row
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!(
        "  row {row} {} {}",
        outcome.to_email.as_deref().unwrap_or("-"),
        outcome.status.as_deref().unwrap_or("-")
    );
    if let Some(code) = &outcome.code {
        line.push_str(&format!(" ({code})"));
    }
    if let Some(message) = &outcome.message {
        line.push_str(&format!(": {message}"));
    }
    line
}

fn push_saved(lines: &mut Vec<String>, phase: &PhaseView) {
    if let Some(path) = &phase.saved_csv_path {
        lines.push(format!("  saved to {path}"));
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}
