use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use automator_api::{AutomatorClient, WorkflowApi};
use automator_engine::{PollPhase, PollingController};
use automator_types::WorkflowRun;
use automator_util::{AutomatorConfig, ConfigOverrides, init_file_logging, init_stderr_logging, redact_parameters};
use clap::{Args, Parser, Subcommand};
use indexmap::IndexMap;
use serde::Serialize;
use tokio::signal;
use tracing::{debug, info};

/// Terminal dashboard and scripting front-end for the workflow automation API.
///
/// Without a subcommand the interactive dashboard starts.
#[derive(Debug, Parser)]
#[command(name = "automator", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Base URL of the automation API.
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Status poll period in milliseconds.
    #[arg(long, global = true)]
    poll_interval_ms: Option<u64>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check whether the API is reachable.
    Health,
    /// Submit a workflow and follow it until it completes or fails.
    Run(RunArgs),
    /// Fetch the current status of a run.
    Status { workflow_id: String },
    /// Fetch a recorded execution.
    Execution { workflow_id: String },
    /// List workflow definitions.
    Workflows,
    /// List executions.
    Executions,
    /// List extracted data.
    Extracted,
    /// Clear the backend's in-memory workflows, executions and extracted data.
    Reset,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Natural-language description of the workflow.
    #[arg(long, short)]
    description: String,

    #[arg(long)]
    username: Option<String>,

    #[arg(long)]
    password: Option<String>,

    /// Extra parameter passed through to the backend, as KEY=VALUE.
    #[arg(long = "param", value_parser = parse_key_val)]
    params: Vec<(String, String)>,
}

impl RunArgs {
    fn parameters(&self) -> IndexMap<String, String> {
        let mut parameters = IndexMap::new();
        if let Some(username) = &self.username {
            parameters.insert("username".to_string(), username.clone());
        }
        if let Some(password) = &self.password {
            parameters.insert("password".to_string(), password.clone());
        }
        for (key, value) in &self.params {
            parameters.insert(key.clone(), value.clone());
        }
        parameters
    }
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let overrides = ConfigOverrides {
        api_base: cli.global.api_base.clone(),
        poll_interval_ms: cli.global.poll_interval_ms,
    };
    let config = AutomatorConfig::load(&overrides).context("load configuration")?;

    // No subcommand => TUI
    let Some(command) = cli.command else {
        init_file_logging(&config.log_path)
            .with_context(|| format!("open log file {}", config.log_path.display()))?;
        automator_tui::run(&config).await?;
        return Ok(ExitCode::SUCCESS);
    };

    init_stderr_logging();
    debug!(api_base = %config.api_base, "configuration resolved");
    let client = AutomatorClient::from_config(&config).context("build API client")?;
    let output = Output { json: cli.global.json };
    run_command(command, Arc::new(client), &config, output).await
}

#[derive(Debug, Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    fn print<T: Serialize>(self, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            println!("{}", text(value));
        }
        Ok(())
    }
}

async fn run_command(
    command: Command,
    api: Arc<dyn WorkflowApi>,
    config: &AutomatorConfig,
    output: Output,
) -> Result<ExitCode> {
    match command {
        Command::Health => {
            let healthy = api.check_health().await;
            output.print(&serde_json::json!({ "healthy": healthy }), |_| {
                (if healthy { "API Online" } else { "API Offline" }).to_string()
            })?;
            Ok(if healthy { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Command::Run(args) => run_workflow(api, config, &args, output).await,
        Command::Status { workflow_id } => {
            let run = api.fetch_status(&workflow_id).await?;
            output.print(&run, describe_run)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Execution { workflow_id } => {
            let run = api.get_execution(&workflow_id).await?;
            output.print(&run, describe_run)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Workflows => {
            let envelope = api.list_workflows().await?;
            output.print(&envelope, |envelope| {
                if envelope.items.is_empty() {
                    return "No workflows yet".to_string();
                }
                envelope
                    .items
                    .iter()
                    .map(|item| {
                        format!(
                            "{}\t{}\t{}\t{} steps",
                            item.workflow_id,
                            item.name.as_deref().unwrap_or(""),
                            item.description.as_deref().unwrap_or(""),
                            item.steps_count
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Executions => {
            let envelope = api.list_executions().await?;
            output.print(&envelope, |envelope| {
                if envelope.items.is_empty() {
                    return "No executions yet".to_string();
                }
                envelope
                    .items
                    .iter()
                    .map(|item| {
                        let last_step = item.last_step.as_ref().and_then(|step| step.action_label()).unwrap_or("-");
                        format!(
                            "{}\t{}\t{}%\t{}\t{} completed",
                            item.workflow_id, item.status, item.progress, last_step, item.steps_completed
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Extracted => {
            let envelope = api.list_extracted().await?;
            output.print(&envelope, |envelope| {
                if envelope.items.is_empty() {
                    return "No extracted data yet".to_string();
                }
                envelope
                    .items
                    .iter()
                    .map(|item| {
                        let data = serde_json::to_string_pretty(&item.data).unwrap_or_else(|_| item.data.to_string());
                        format!("{}\n{data}", item.workflow_id)
                    })
                    .collect::<Vec<_>>()
                    .join("\n\n")
            })?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Reset => {
            api.reset().await?;
            output.print(&serde_json::json!({ "reset": true }), |_| "Backend state cleared".to_string())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Drive one run through the polling controller, printing each change.
async fn run_workflow(api: Arc<dyn WorkflowApi>, config: &AutomatorConfig, args: &RunArgs, output: Output) -> Result<ExitCode> {
    let parameters = args.parameters();
    info!(parameters = ?redact_parameters(&parameters), "submitting workflow");

    let (mut controller, mut events) = PollingController::new(api, config.poll_interval);
    controller.submit(args.description.clone(), parameters);

    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    bail!("polling stopped unexpectedly");
                };
                if !controller.apply(event) {
                    continue;
                }
                if controller.phase() == PollPhase::Polling
                    && controller.run().is_none()
                    && let Some(workflow_id) = controller.workflow_id()
                    && !output.json
                {
                    println!("submitted {workflow_id}");
                }
                if let Some(run) = controller.run()
                    && !output.json
                {
                    println!("{}", progress_line(run));
                }
                if controller.phase().is_terminal() {
                    break;
                }
            }
            _ = signal::ctrl_c() => {
                controller.cancel();
                bail!("interrupted");
            }
        }
    }

    if let Some(error) = controller.error() {
        eprintln!("{error}");
    }
    if output.json
        && let Some(run) = controller.run()
    {
        println!("{}", serde_json::to_string_pretty(run)?);
    } else if let Some(result) = controller.run().and_then(|run| run.result.as_deref()) {
        println!("{result}");
    }

    Ok(match controller.phase() {
        PollPhase::Completed => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

fn progress_line(run: &WorkflowRun) -> String {
    let current = run
        .current_step
        .as_ref()
        .and_then(|step| step.action_label())
        .unwrap_or("-");
    format!(
        "[{}] {}% ({}/{} steps) current: {}",
        run.status,
        run.progress,
        run.completed_steps(),
        run.steps.len(),
        current
    )
}

fn describe_run(run: &WorkflowRun) -> String {
    let mut lines = vec![format!("{} {}", run.workflow_id, progress_line(run))];
    for step in &run.steps {
        let marker = if step.is_completed() { "●" } else { "○" };
        let detail = step.details.as_deref().unwrap_or(step.status.as_str());
        lines.push(format!("  {marker} {} - {detail}", step.step));
    }
    if let Some(result) = &run.result {
        lines.push(result.clone());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use automator_types::{RunStatus, Step};
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_collects_parameters_in_order() {
        let cli = Cli::try_parse_from([
            "automator",
            "--api-base",
            "http://localhost:9000",
            "run",
            "--description",
            "Login",
            "--username",
            "a",
            "--password",
            "b",
            "--param",
            "region=eu",
        ])
        .expect("parse");
        assert_eq!(cli.global.api_base.as_deref(), Some("http://localhost:9000"));
        let Some(Command::Run(args)) = cli.command else {
            panic!("expected run");
        };
        let parameters = args.parameters();
        let keys: Vec<&str> = parameters.keys().map(String::as_str).collect();
        assert_eq!(keys, ["username", "password", "region"]);
    }

    #[test]
    fn no_subcommand_means_dashboard() {
        let cli = Cli::try_parse_from(["automator", "--json"]).expect("parse");
        assert!(cli.command.is_none());
        assert!(cli.global.json);
    }

    #[test]
    fn key_value_parser_rejects_missing_separator() {
        assert_eq!(parse_key_val("a=b=c"), Ok(("a".to_string(), "b=c".to_string())));
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn progress_line_summarizes_run() {
        let run = WorkflowRun {
            workflow_id: "wf-1".into(),
            status: RunStatus::Running,
            progress: 40,
            steps: vec![Step {
                step: "login".into(),
                status: RunStatus::Completed,
                details: None,
            }],
            ..WorkflowRun::default()
        };
        assert_eq!(progress_line(&run), "[running] 40% (1/1 steps) current: -");
    }
}
