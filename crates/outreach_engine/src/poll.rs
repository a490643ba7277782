use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use outreach_logging::outreach_debug;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::{ApiError, JobId, StatusResponse};

/// Handle to a running poll loop.
///
/// Dropping the handle does not stop the loop; call [`PollHandle::cancel`].
#[derive(Debug)]
pub struct PollHandle {
    job_id: JobId,
    stopped: Arc<Mutex<bool>>,
    wake: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Stops the loop. Once this returns the observer will not be called
    /// again, even if a status request is still in flight; that request is
    /// left to finish and its result is dropped.
    pub fn cancel(&self) {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.wake.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The loop task has exited, either after a terminal status, a failure, or cancellation.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Polls `fetch(job_id)` until a terminal status, a failure, or cancellation.
///
/// The first request goes out immediately; each later one `interval` after the
/// previous one completed, so requests for one job never overlap. Every result
/// is passed to `on_update` in fetch order. A failed fetch is delivered as
/// `Err` and ends the loop without retrying.
///
/// Must be called from within a tokio runtime.
pub fn poll<T, F, Fut, U>(
    fetch: F,
    job_id: impl Into<JobId>,
    mut on_update: U,
    interval: Duration,
) -> PollHandle
where
    T: Send + 'static,
    F: Fn(JobId) -> Fut + Send + 'static,
    Fut: Future<Output = Result<StatusResponse<T>, ApiError>> + Send + 'static,
    U: FnMut(Result<StatusResponse<T>, ApiError>) + Send + 'static,
{
    let job_id = job_id.into();
    let stopped = Arc::new(Mutex::new(false));
    let wake = CancellationToken::new();

    let task = tokio::spawn({
        let job_id = job_id.clone();
        let stopped = stopped.clone();
        let wake = wake.clone();
        async move {
            loop {
                if wake.is_cancelled() {
                    return;
                }
                let result = fetch(job_id.clone()).await;
                let terminal = match &result {
                    Ok(status) => status.status.is_terminal(),
                    Err(_) => true,
                };
                {
                    // Held while notifying so `cancel` cannot interleave with a delivery.
                    let mut stopped = stopped.lock().unwrap_or_else(PoisonError::into_inner);
                    if *stopped {
                        outreach_debug!("poll of job {job_id} cancelled; dropping in-flight result");
                        return;
                    }
                    on_update(result);
                    if terminal {
                        *stopped = true;
                    }
                }
                if terminal {
                    outreach_debug!("poll of job {job_id} reached a terminal state");
                    return;
                }
                tokio::select! {
                    _ = wake.cancelled() => return,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        }
    });

    PollHandle {
        job_id,
        stopped,
        wake,
        task,
    }
}
