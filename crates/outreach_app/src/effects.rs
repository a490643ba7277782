use std::time::Duration;

use outreach_core::{
    EmailDraft, Effect, GenerationRequest, JobSnapshot, JobStatus, Msg, OutcomeRow, Phase,
    ResearchRequest, ResearchResult, SendOutcome, SendRequest,
};
use outreach_engine::{
    ApiError, EmailGenerateStartRequest, EmailRow, EngineCommand, EngineEvent, EngineHandle,
    JobStatusKind, OutcomeRowRef, ResearchRow, ResearchStartRequest, SendOutcomeRow,
    SendRowPayload, SendStartRequest, StatusResponse,
};
use outreach_logging::{outreach_debug, outreach_info};

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            outreach_debug!("effect {}", describe(&effect));
            self.engine.submit(to_command(effect));
        }
    }

    /// Waits up to `timeout` for the next workflow message.
    pub fn next_msg(&self, timeout: Duration) -> Option<Msg> {
        loop {
            let event = self.engine.recv_timeout(timeout)?;
            if let Some(msg) = to_msg(event) {
                return Some(msg);
            }
        }
    }

    /// Calls `GET /health` and waits up to `timeout` for the answer.
    pub fn health(&self, timeout: Duration) -> anyhow::Result<()> {
        self.engine.submit(EngineCommand::Health);
        loop {
            match self.engine.recv_timeout(timeout) {
                Some(EngineEvent::Health { result }) => return result.map_err(Into::into),
                Some(other) => outreach_debug!("ignoring {other:?} while waiting for health"),
                None => anyhow::bail!("no answer from backend within {timeout:?}"),
            }
        }
    }
}

fn describe(effect: &Effect) -> String {
    match effect {
        Effect::StartResearch(request) => format!("start research {:?}", request.keyword),
        Effect::StartGeneration(request) => format!(
            "start generation from job {} with {} rows",
            request.research_job_id,
            request.selected_urls.len()
        ),
        Effect::StartSend(request) => format!(
            "start send of {} rows via {}",
            request.rows.len(),
            request.provider.as_str()
        ),
        Effect::BeginPolling { phase, job_id } => format!("poll {phase} job {job_id}"),
        Effect::CancelPolling { phase } => format!("cancel {phase} poll"),
    }
}

pub fn to_command(effect: Effect) -> EngineCommand {
    match effect {
        Effect::StartResearch(request) => EngineCommand::StartResearch(research_request(request)),
        Effect::StartGeneration(request) => {
            EngineCommand::StartGeneration(generation_request(request))
        }
        Effect::StartSend(request) => EngineCommand::StartSend(send_request(request)),
        Effect::BeginPolling { phase, job_id } => EngineCommand::Poll {
            phase: engine_phase(phase),
            job_id,
        },
        Effect::CancelPolling { phase } => EngineCommand::Cancel {
            phase: engine_phase(phase),
        },
    }
}

/// `None` for events that carry no workflow message.
pub fn to_msg(event: EngineEvent) -> Option<Msg> {
    let msg = match event {
        EngineEvent::Health { .. } => return None,
        EngineEvent::Started { phase, result } => match result {
            Ok(job_id) => Msg::JobStarted {
                phase: core_phase(phase),
                job_id,
            },
            Err(err) => Msg::JobStartFailed {
                phase: core_phase(phase),
                error: err.to_string(),
            },
        },
        EngineEvent::ResearchStatus { job_id, result } => match result {
            Ok(status) => Msg::ResearchPolled {
                job_id,
                snapshot: snapshot(status, research_row),
            },
            Err(err) => poll_failed(Phase::Research, job_id, err),
        },
        EngineEvent::GenerationStatus { job_id, result } => match result {
            Ok(status) => Msg::GenerationPolled {
                job_id,
                snapshot: snapshot(status, email_row),
            },
            Err(err) => poll_failed(Phase::Generation, job_id, err),
        },
        EngineEvent::SendStatus { job_id, result } => match result {
            Ok(status) => Msg::SendPolled {
                job_id,
                snapshot: snapshot(status, outcome_row),
            },
            Err(err) => poll_failed(Phase::Send, job_id, err),
        },
    };
    Some(msg)
}

fn poll_failed(phase: Phase, job_id: String, err: ApiError) -> Msg {
    outreach_info!("{phase} job {job_id} poll failed: {err}");
    Msg::PollFailed {
        phase,
        job_id,
        error: err.to_string(),
    }
}

fn engine_phase(phase: Phase) -> outreach_engine::Phase {
    match phase {
        Phase::Research => outreach_engine::Phase::Research,
        Phase::Generation => outreach_engine::Phase::Generation,
        Phase::Send => outreach_engine::Phase::Send,
    }
}

fn core_phase(phase: outreach_engine::Phase) -> Phase {
    match phase {
        outreach_engine::Phase::Research => Phase::Research,
        outreach_engine::Phase::Generation => Phase::Generation,
        outreach_engine::Phase::Send => Phase::Send,
    }
}

fn research_request(request: ResearchRequest) -> ResearchStartRequest {
    ResearchStartRequest {
        keyword: request.keyword,
        max_results: request.max_results,
    }
}

fn generation_request(request: GenerationRequest) -> EmailGenerateStartRequest {
    EmailGenerateStartRequest {
        research_job_id: request.research_job_id,
        selected_urls: Some(request.selected_urls),
        subject: request.subject,
        take: request.take,
        provider: request.provider.as_str().to_string(),
        model: request.model,
        your_name: request.your_name,
        your_email: request.your_email,
    }
}

fn send_request(request: SendRequest) -> SendStartRequest {
    let rows = request
        .rows
        .into_iter()
        .map(|row| SendRowPayload {
            to_email: row.to_email,
            subject: row.subject,
            body: row.body,
        })
        .collect();
    let mut payload = SendStartRequest {
        provider: request.provider.as_str().to_string(),
        from_email: request.from_email,
        rows: Some(rows),
        rate_limit_per_sec: Some(request.rate_limit_per_sec),
        dry_run: Some(request.dry_run),
        sandbox: Some(request.sandbox),
        ..SendStartRequest::default()
    };
    if let Some(smtp) = request.smtp {
        payload.smtp_host = Some(smtp.host);
        payload.smtp_port = Some(smtp.port);
        payload.smtp_user = smtp.user;
        payload.smtp_pass = smtp.pass;
    }
    payload
}

fn snapshot<T, R>(status: StatusResponse<T>, row: fn(T) -> R) -> JobSnapshot<R> {
    JobSnapshot {
        status: job_status(status.status),
        progress: status.progress,
        error: status.error,
        results: status
            .results
            .map(|rows| rows.into_iter().map(row).collect()),
        saved_csv_path: status.saved_csv_path,
    }
}

fn job_status(kind: JobStatusKind) -> JobStatus {
    match kind {
        JobStatusKind::Queued => JobStatus::Queued,
        JobStatusKind::Running => JobStatus::Running,
        JobStatusKind::Done => JobStatus::Done,
        JobStatusKind::Error => JobStatus::Error,
    }
}

fn research_row(row: ResearchRow) -> ResearchResult {
    ResearchResult {
        url: row.url,
        domain: row.domain,
        title: row.title,
        contact_email: row.contact_email,
        contact_form_url: row.contact_form_url,
        guidelines_url: row.guidelines_url,
        context_source: row.context_source,
        page_excerpt: row.page_excerpt,
    }
}

fn email_row(row: EmailRow) -> EmailDraft {
    EmailDraft {
        to_email: row.to_email,
        subject: row.subject,
        body: row.body,
        url: row.url,
        domain: row.domain,
        title: row.title,
        context_source: row.context_source,
        provider: row.provider,
        model: row.model,
        status: row.status,
        note: row.note,
    }
}

fn outcome_row(row: SendOutcomeRow) -> SendOutcome {
    SendOutcome {
        row: row.row.map(|row| match row {
            OutcomeRowRef::Index(index) => OutcomeRow::Index(index),
            OutcomeRowRef::Key(key) => OutcomeRow::Key(key),
        }),
        to_email: row.to_email,
        status: row.status,
        code: row.code,
        message: row.message,
    }
}
