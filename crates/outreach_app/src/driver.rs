use std::time::{Duration, Instant};

use anyhow::bail;
use outreach_core::{
    update, AppState, AppViewModel, Effect, Msg, Phase, PhaseStatus, SmtpSettings,
    SELECTION_RANGE,
};
use outreach_logging::{outreach_info, outreach_warn};

use crate::cli::RunArgs;
use crate::effects::EffectRunner;

/// How often an idle driver re-renders while waiting on the engine.
const TICK: Duration = Duration::from_millis(250);

/// Owns the workflow state on the calling thread and feeds it engine events.
pub struct WorkflowDriver {
    state: AppState,
    runner: EffectRunner,
    stall_timeout: Duration,
}

impl WorkflowDriver {
    pub fn new(runner: EffectRunner, stall_timeout: Duration) -> Self {
        Self {
            state: AppState::new(),
            runner,
            stall_timeout,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    /// Applies one message and hands its effects to the engine.
    /// Returns whether the visible state changed.
    pub fn dispatch(&mut self, msg: Msg) -> bool {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let dirty = state.consume_dirty();
        self.state = state;
        self.runner.enqueue(effects);
        dirty
    }

    /// Dispatches `submit` and pumps engine events until `phase` is no longer busy.
    ///
    /// Fails only if the engine goes quiet for longer than the stall timeout;
    /// a rejected or failed phase is reported through the returned status.
    pub fn run_phase(
        &mut self,
        phase: Phase,
        submit: Msg,
        on_change: &mut dyn FnMut(&AppViewModel),
    ) -> anyhow::Result<PhaseStatus> {
        if self.dispatch(submit) {
            on_change(&self.view());
        }

        let mut last_event = Instant::now();
        while self.state.phase_status(phase).is_busy() {
            let changed = match self.runner.next_msg(TICK) {
                Some(msg) => {
                    last_event = Instant::now();
                    self.dispatch(msg)
                }
                None if last_event.elapsed() >= self.stall_timeout => {
                    self.runner.enqueue(vec![Effect::CancelPolling { phase }]);
                    bail!(
                        "no word from the backend on the {phase} job for {:?}",
                        self.stall_timeout
                    );
                }
                None => self.dispatch(Msg::Tick),
            };
            if changed {
                on_change(&self.view());
            }
        }
        Ok(self.state.phase_status(phase))
    }

    fn require_done(&self, phase: Phase, status: PhaseStatus) -> anyhow::Result<()> {
        if status == PhaseStatus::Done {
            return Ok(());
        }
        let view = self.view();
        let phase_view = match phase {
            Phase::Research => &view.research,
            Phase::Generation => &view.generation,
            Phase::Send => &view.send,
        };
        match &phase_view.error {
            Some(error) => bail!("{phase} did not complete: {error}"),
            None => bail!("{phase} did not complete ({status:?})"),
        }
    }
}

/// Runs research, generation and (unless `--no-send`) sending in order.
pub fn run_workflow(
    driver: &mut WorkflowDriver,
    args: &RunArgs,
    on_change: &mut dyn FnMut(&AppViewModel),
) -> anyhow::Result<()> {
    driver.dispatch(Msg::KeywordChanged(args.keyword.clone()));
    driver.dispatch(Msg::MaxResultsChanged(args.max_results));
    let status = driver.run_phase(Phase::Research, Msg::ResearchSubmitted, on_change)?;
    driver.require_done(Phase::Research, status)?;

    select_rows(driver, &args.select);
    driver.dispatch(Msg::SubjectChanged(args.subject.clone()));
    driver.dispatch(Msg::TakeChanged(args.take));
    driver.dispatch(Msg::LlmProviderChanged(args.llm.into()));
    driver.dispatch(Msg::ModelChanged(args.model.clone().unwrap_or_default()));
    driver.dispatch(Msg::YourNameChanged(args.your_name.clone().unwrap_or_default()));
    driver.dispatch(Msg::YourEmailChanged(args.your_email.clone().unwrap_or_default()));
    let status = driver.run_phase(Phase::Generation, Msg::GenerationSubmitted, on_change)?;
    driver.require_done(Phase::Generation, status)?;

    if args.no_send {
        outreach_info!("skipping send phase");
        return Ok(());
    }

    if let Some(from_email) = &args.from_email {
        driver.dispatch(Msg::FromEmailChanged(from_email.clone()));
    }
    driver.dispatch(Msg::SendProviderChanged(args.send_provider.into()));
    driver.dispatch(Msg::RateLimitChanged(args.rate_limit));
    driver.dispatch(Msg::DryRunToggled(!args.live));
    driver.dispatch(Msg::SandboxToggled(args.sandbox));
    driver.dispatch(Msg::SmtpChanged(args.smtp_host.as_ref().map(|host| {
        SmtpSettings {
            host: host.clone(),
            port: args.smtp_port,
            user: args.smtp_user.clone(),
            pass: args.smtp_pass.clone(),
        }
    })));
    let status = driver.run_phase(Phase::Send, Msg::SendSubmitted, on_change)?;
    driver.require_done(Phase::Send, status)
}

/// Selects the given URLs, or the first rows up to the selection limit when none are given.
fn select_rows(driver: &mut WorkflowDriver, urls: &[String]) {
    driver.dispatch(Msg::SelectionCleared);
    let rows: Vec<String> = driver
        .view()
        .research_rows
        .into_iter()
        .map(|row| row.url)
        .collect();

    if urls.is_empty() {
        for url in rows.into_iter().take(*SELECTION_RANGE.end()) {
            driver.dispatch(Msg::UrlToggled(url));
        }
        return;
    }
    for url in urls {
        if rows.contains(url) {
            if !driver.state().selection().contains(url) {
                driver.dispatch(Msg::UrlToggled(url.clone()));
            }
        } else {
            outreach_warn!("--select {url} is not among the research results");
        }
    }
}
