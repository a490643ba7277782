use crate::form::{GenerationRequest, ResearchRequest, SendRequest};
use crate::{JobId, Phase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartResearch(ResearchRequest),
    StartGeneration(GenerationRequest),
    StartSend(SendRequest),
    /// Begin polling a freshly started job.
    BeginPolling { phase: Phase, job_id: JobId },
    /// Stop the phase's active poll loop; always precedes a restart of that phase.
    CancelPolling { phase: Phase },
}
