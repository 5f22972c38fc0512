use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use ensemble::config::Config;
use ensemble::core::task::Task;
use ensemble::metrics::MetricsSummary;
use ensemble::orchestration::{
    run_service, service_channel, BuiltinSkills, Ensemble, EnsembleClient, EnsembleEvent,
    TaskReport,
};
use ensemble::{elog, Error, Result};

/// Ensemble - dispatch natural-language tasks to a pool of specialist workers
#[derive(Parser, Debug)]
#[command(name = "ensemble")]
#[command(version, about, long_about = None)]
#[command(
    after_help = "ENVIRONMENT:\n    ENSEMBLE_DEBUG=1                 Enable debug logging (alternative to --debug)\n    ENSEMBLE_CONSENSUS_THRESHOLD     Override the consensus threshold\n    ENSEMBLE_MAX_SUB_TASKS           Override the decomposition ceiling\n    ENSEMBLE_TASK_TIMEOUT            Override the per-execution timeout (seconds)"
)]
pub struct Cli {
    /// Enable debug logging (writes to ~/.ensemble/ensemble.log)
    #[arg(short = 'd', long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Submit one or more tasks and process them to completion
    Run {
        /// Task descriptions in natural language
        #[arg(required = true)]
        descriptions: Vec<String>,

        /// Priority for the submitted tasks (higher is more urgent)
        #[arg(short, long, default_value_t = 1)]
        priority: i32,

        /// Requirement attached to every task (repeatable)
        #[arg(short, long = "requirement")]
        requirements: Vec<String>,

        /// Constraint attached to every task (repeatable)
        #[arg(short, long = "constraint")]
        constraints: Vec<String>,

        /// Override the consensus threshold for this run
        #[arg(long)]
        threshold: Option<f64>,

        /// Emit machine-readable JSON instead of progress lines
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration after environment overrides
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    ensemble::log::init_with_debug(cli.debug);

    match cli.command {
        Command::Run {
            descriptions,
            priority,
            requirements,
            constraints,
            threshold,
            json,
        } => run_tasks(descriptions, priority, requirements, constraints, threshold, json),
        Command::Config => show_config(),
    }
}

fn show_config() -> Result<()> {
    let mut config = Config::load()?;
    config.apply_env();
    config.validate()?;
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn load_config() -> Result<Config> {
    let mut config = Config::load()?;
    config.apply_env();
    config.validate()?;
    Ok(config)
}

/// Submit the tasks, drain the queue, and report every outcome.
fn run_tasks(
    descriptions: Vec<String>,
    priority: i32,
    requirements: Vec<String>,
    constraints: Vec<String>,
    threshold: Option<f64>,
    json: bool,
) -> Result<()> {
    let mut config = load_config()?;
    if let Some(threshold) = threshold {
        config.consensus_threshold = threshold;
        config.validate()?;
    }
    elog!(
        "run: {} task(s) at priority {} (threshold {:.2})",
        descriptions.len(),
        priority,
        config.consensus_threshold
    );

    let rt = tokio::runtime::Runtime::new()?;
    let (reports, metrics) = rt.block_on(async {
        let (event_tx, event_rx) = mpsc::channel(256);
        let (client, command_rx) = service_channel(64);
        let engine = Ensemble::new(config, BuiltinSkills, event_tx);

        let tasks: Vec<Task> = descriptions
            .iter()
            .map(|description| {
                Task::new(description)
                    .with_requirements(requirements.clone())
                    .with_constraints(constraints.clone())
                    .with_priority(priority)
            })
            .collect();

        let (_, outcome, ()) = tokio::join!(
            run_service(engine, command_rx),
            drive(client, tasks),
            print_events(event_rx, json),
        );
        outcome
    })?;

    let failed = reports.iter().filter(|r| !r.is_completed()).count();

    if json {
        let output = serde_json::json!({
            "reports": reports,
            "metrics": metrics,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!();
        for report in &reports {
            println!(
                "task {} [{}]: {}",
                report.task_id.short(),
                report.state,
                report.summary.as_deref().unwrap_or(&report.description)
            );
        }
        println!(
            "{}/{} tasks completed ({} executions, success rate {:.0}%)",
            reports.len() - failed,
            reports.len(),
            metrics.total_executions,
            metrics.success_rate * 100.0
        );
    }

    if failed > 0 {
        return Err(Error::Execution(format!(
            "{} of {} tasks failed",
            failed,
            reports.len()
        )));
    }
    Ok(())
}

/// Submit everything, then collect the terminal reports and metrics.
/// Dropping the client ends the service loop.
async fn drive(
    client: EnsembleClient,
    tasks: Vec<Task>,
) -> Result<(Vec<TaskReport>, MetricsSummary)> {
    let submissions = tasks.into_iter().map(|task| client.submit(task));
    let ids = futures::future::try_join_all(submissions).await?;

    let mut reports = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(report) = client.outcome(id).await? {
            reports.push(report);
        }
    }
    let metrics = client.metrics().await?;
    Ok((reports, metrics))
}

/// Print engine events as progress lines. Runs until the engine drops its
/// event channel; in JSON mode events are consumed silently so the channel
/// never backs up.
async fn print_events(mut events: mpsc::Receiver<EnsembleEvent>, quiet: bool) {
    while let Some(event) = events.recv().await {
        if quiet {
            continue;
        }
        match event {
            EnsembleEvent::TaskStarted { task_id } => {
                println!("task {}: started", task_id.short());
            }
            EnsembleEvent::TaskCompleted { task_id } => {
                println!("task {}: completed", task_id.short());
            }
            EnsembleEvent::TaskFailed { task_id, error } => {
                println!("task {}: failed ({})", task_id.short(), error);
            }
            EnsembleEvent::SubTaskStarted { task_id, worker } => {
                println!("  sub-task {}: claimed by {}", task_id.short(), worker);
            }
            EnsembleEvent::SubTaskFinished {
                task_id,
                worker,
                success,
            } => {
                let verdict = if success { "done" } else { "failed" };
                println!("  sub-task {}: {} by {}", task_id.short(), verdict, worker);
            }
            EnsembleEvent::SubTaskBlocked { task_id, reason } => {
                println!("  sub-task {}: blocked ({})", task_id.short(), reason);
            }
            EnsembleEvent::ConsensusEvaluated {
                task_id,
                score,
                accepted,
            } => {
                let verdict = if accepted { "accepted" } else { "rejected" };
                println!(
                    "  consensus {}: {:.2} ({})",
                    task_id.short(),
                    score,
                    verdict
                );
            }
            EnsembleEvent::CollaborationTriggered {
                task_id,
                participants,
            } => {
                println!(
                    "  collaboration {}: {} workers",
                    task_id.short(),
                    participants.len()
                );
            }
            EnsembleEvent::CollaborationSkipped { task_id, reason } => {
                println!("  collaboration {}: skipped ({})", task_id.short(), reason);
            }
            EnsembleEvent::QueueDrained { completed, failed } => {
                println!("queue drained: {} completed, {} failed", completed, failed);
            }
        }
    }
}
