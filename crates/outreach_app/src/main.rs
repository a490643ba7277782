use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use outreach_app::cli::{Cli, Command};
use outreach_app::config::AppConfig;
use outreach_app::driver::{run_workflow, WorkflowDriver};
use outreach_app::effects::EffectRunner;
use outreach_app::{logging, render};
use outreach_engine::EngineHandle;
use outreach_logging::{outreach_error, outreach_info};

fn main() -> ExitCode {
    // A missing .env is fine; flags and the process environment still apply.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            outreach_error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_cli(&cli)?;
    logging::initialize(cli.log_to, config.log_level);
    outreach_info!("backend at {}", config.api_base_url);

    let engine = EngineHandle::new(config.api_settings(), config.poll_interval)
        .context("failed to set up the HTTP client")?;
    let runner = EffectRunner::new(engine);

    match cli.command {
        Command::Health => {
            runner
                .health(config.stall_timeout())
                .with_context(|| format!("backend at {} is not reachable", config.api_base_url))?;
            println!("backend at {} is reachable", config.api_base_url);
        }
        Command::Run(args) => {
            let mut driver = WorkflowDriver::new(runner, config.stall_timeout());
            let mut last_lines = Vec::new();
            let mut print_headers = |view: &outreach_core::AppViewModel| {
                let lines = vec![
                    render::phase_line("Research", &view.research),
                    render::phase_line("Email generation", &view.generation),
                    render::phase_line("Send", &view.send),
                ];
                if lines != last_lines {
                    println!("{}", lines.join(" | "));
                    last_lines = lines;
                }
            };
            let result = run_workflow(&mut driver, &args, &mut print_headers);
            println!();
            for line in render::render(&driver.view()) {
                println!("{line}");
            }
            result?;
        }
    }
    Ok(())
}
