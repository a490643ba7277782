use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use outreach_logging::{outreach_error, outreach_info, outreach_warn};

use crate::client::{ApiSettings, BackendApi, ReqwestBackend};
use crate::poll::{poll, PollHandle};
use crate::{
    ApiError, EmailGenerateStartRequest, EngineEvent, JobId, Phase, ResearchStartRequest,
    SendStartRequest, StatusResponse,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    StartResearch(ResearchStartRequest),
    StartGeneration(EmailGenerateStartRequest),
    StartSend(SendStartRequest),
    /// Probe `GET /health`; answered with [`EngineEvent::Health`].
    Health,
    /// Poll a job, replacing any poll loop already running for the phase.
    Poll { phase: Phase, job_id: JobId },
    Cancel { phase: Phase },
}

/// Runs backend calls on a background runtime. Commands go in, events come
/// out; at most one poll loop per phase is alive at any time.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ApiSettings, poll_interval: Duration) -> Result<Self, ApiError> {
        let backend = ReqwestBackend::new(settings)?;
        Ok(Self::with_backend(Arc::new(backend), poll_interval))
    }

    pub fn with_backend(api: Arc<dyn BackendApi>, poll_interval: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    outreach_error!("failed to start engine runtime: {err}");
                    return;
                }
            };
            let mut polls: HashMap<Phase, PollHandle> = HashMap::new();

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Poll { phase, job_id } => {
                        if let Some(previous) = polls.remove(&phase) {
                            previous.cancel();
                        }
                        let _guard = runtime.enter();
                        let handle =
                            spawn_poll(api.clone(), phase, job_id, event_tx.clone(), poll_interval);
                        polls.insert(phase, handle);
                    }
                    EngineCommand::Cancel { phase } => {
                        if let Some(handle) = polls.remove(&phase) {
                            outreach_info!("cancelling {phase} poll of job {}", handle.job_id());
                            handle.cancel();
                        }
                    }
                    request => {
                        let api = api.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            handle_request(api.as_ref(), request, event_tx).await;
                        });
                    }
                }
            }

            for handle in polls.values() {
                handle.cancel();
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn submit(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }

    /// Waits up to `timeout` for the next event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_request(
    api: &dyn BackendApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let (phase, result) = match command {
        EngineCommand::Health => {
            let result = api.health().await;
            if let Err(err) = &result {
                outreach_warn!("health check failed ({}): {err}", err.kind);
            }
            let _ = event_tx.send(EngineEvent::Health { result });
            return;
        }
        EngineCommand::StartResearch(request) => {
            (Phase::Research, api.start_research(&request).await)
        }
        EngineCommand::StartGeneration(request) => {
            (Phase::Generation, api.start_generation(&request).await)
        }
        EngineCommand::StartSend(request) => (Phase::Send, api.start_send(&request).await),
        EngineCommand::Poll { .. } | EngineCommand::Cancel { .. } => return,
    };
    match &result {
        Ok(job_id) => outreach_info!("{phase} start accepted as job {job_id}"),
        Err(err) => outreach_warn!("{phase} start failed ({}): {err}", err.kind),
    }
    let _ = event_tx.send(EngineEvent::Started { phase, result });
}

fn spawn_poll(
    api: Arc<dyn BackendApi>,
    phase: Phase,
    job_id: JobId,
    event_tx: mpsc::Sender<EngineEvent>,
    interval: Duration,
) -> PollHandle {
    outreach_info!("polling {phase} job {job_id} every {interval:?}");
    match phase {
        Phase::Research => poll(
            move |id| {
                let api = api.clone();
                async move { api.research_status(&id).await }
            },
            job_id.clone(),
            move |result| {
                log_poll_result(phase, &job_id, &result);
                let _ = event_tx.send(EngineEvent::ResearchStatus {
                    job_id: job_id.clone(),
                    result,
                });
            },
            interval,
        ),
        Phase::Generation => poll(
            move |id| {
                let api = api.clone();
                async move { api.generation_status(&id).await }
            },
            job_id.clone(),
            move |result| {
                log_poll_result(phase, &job_id, &result);
                let _ = event_tx.send(EngineEvent::GenerationStatus {
                    job_id: job_id.clone(),
                    result,
                });
            },
            interval,
        ),
        Phase::Send => poll(
            move |id| {
                let api = api.clone();
                async move { api.send_status(&id).await }
            },
            job_id.clone(),
            move |result| {
                log_poll_result(phase, &job_id, &result);
                let _ = event_tx.send(EngineEvent::SendStatus {
                    job_id: job_id.clone(),
                    result,
                });
            },
            interval,
        ),
    }
}

fn log_poll_result<T>(phase: Phase, job_id: &str, result: &Result<StatusResponse<T>, ApiError>) {
    match result {
        Ok(status) if status.status.is_terminal() => outreach_info!(
            "{phase} job {job_id} finished with status {:?}",
            status.status
        ),
        Ok(_) => {}
        Err(err) => outreach_warn!("{phase} job {job_id} poll failed ({}): {err}", err.kind),
    }
}
