use outreach_logging::outreach_debug;

use crate::{JobId, JobSnapshot, JobStatus, PhaseStatus, ValidationError};

/// State of one phase: the active job, its last reported progress, and the
/// outcome of the most recent attempt.
///
/// `job_id` is only set while a poll loop is expected to report for it. It is
/// cleared as soon as a terminal status has been applied, so a repeated
/// terminal report for the same job is ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseState<R> {
    status: PhaseStatus,
    job_id: Option<JobId>,
    completed_job_id: Option<JobId>,
    progress: f64,
    error: Option<String>,
    validation_error: Option<ValidationError>,
    results: Vec<R>,
    saved_csv_path: Option<String>,
}

impl<R> Default for PhaseState<R> {
    fn default() -> Self {
        Self {
            status: PhaseStatus::Idle,
            job_id: None,
            completed_job_id: None,
            progress: 0.0,
            error: None,
            validation_error: None,
            results: Vec::new(),
            saved_csv_path: None,
        }
    }
}

impl<R> PhaseState<R> {
    pub fn status(&self) -> PhaseStatus {
        self.status
    }

    /// Job currently being polled, if any.
    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    /// Job whose `done` status produced the current results.
    pub fn completed_job_id(&self) -> Option<&str> {
        self.completed_job_id.as_deref()
    }

    /// Last reported progress, clamped to `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn validation_error(&self) -> Option<&ValidationError> {
        self.validation_error.as_ref()
    }

    pub fn results(&self) -> &[R] {
        &self.results
    }

    pub fn saved_csv_path(&self) -> Option<&str> {
        self.saved_csv_path.as_deref()
    }

    pub(crate) fn results_mut(&mut self) -> &mut Vec<R> {
        &mut self.results
    }

    /// Records a rejected start without changing the phase status.
    pub(crate) fn reject(&mut self, err: ValidationError) {
        self.validation_error = Some(err);
    }

    /// Moves to `Starting`, clearing the previous attempt.
    ///
    /// Returns the job id of a poll loop that is still active and must be cancelled.
    pub(crate) fn begin_start(&mut self) -> Option<JobId> {
        let active = self.job_id.take();
        self.status = PhaseStatus::Starting;
        self.progress = 0.0;
        self.error = None;
        self.validation_error = None;
        self.results.clear();
        self.saved_csv_path = None;
        self.completed_job_id = None;
        active
    }

    pub(crate) fn start_succeeded(&mut self, job_id: &str) -> bool {
        if self.status != PhaseStatus::Starting {
            outreach_debug!("ignoring start of job {job_id}: phase is {:?}", self.status);
            return false;
        }
        self.status = PhaseStatus::Polling;
        self.job_id = Some(job_id.to_string());
        true
    }

    pub(crate) fn start_failed(&mut self, error: String) -> bool {
        if self.status != PhaseStatus::Starting {
            return false;
        }
        self.status = PhaseStatus::Failed;
        self.error = Some(error);
        true
    }

    /// Applies one status read. Reads for any job other than the active one are dropped.
    pub(crate) fn apply_snapshot(
        &mut self,
        job_id: &str,
        snapshot: JobSnapshot<R>,
        failure_text: &str,
    ) -> bool {
        if !self.is_active_job(job_id) {
            outreach_debug!("ignoring status for inactive job {job_id}");
            return false;
        }
        self.progress = clamp_progress(snapshot.progress);
        match snapshot.status {
            JobStatus::Queued | JobStatus::Running => {}
            JobStatus::Done => {
                self.status = PhaseStatus::Done;
                self.validation_error = None;
                self.progress = 1.0;
                self.results = snapshot.results.unwrap_or_default();
                self.saved_csv_path = snapshot.saved_csv_path;
                self.completed_job_id = self.job_id.take();
            }
            JobStatus::Error => {
                self.status = PhaseStatus::Failed;
                self.validation_error = None;
                self.error = Some(
                    snapshot
                        .error
                        .filter(|message| !message.trim().is_empty())
                        .unwrap_or_else(|| failure_text.to_string()),
                );
                self.job_id = None;
            }
        }
        true
    }

    pub(crate) fn poll_failed(&mut self, job_id: &str, error: String) -> bool {
        if !self.is_active_job(job_id) {
            return false;
        }
        self.status = PhaseStatus::Failed;
        self.error = Some(error);
        self.validation_error = None;
        self.job_id = None;
        true
    }

    fn is_active_job(&self, job_id: &str) -> bool {
        self.status == PhaseStatus::Polling && self.job_id.as_deref() == Some(job_id)
    }
}

fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}
