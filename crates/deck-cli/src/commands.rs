//! Subcommand dispatch

use crate::input;
use crate::render::{AgentTable, DashboardView, IntegrationTable, ReportView, TaskTable};
use anyhow::{Context, Result};
use clap::ArgMatches;
use deck_core::{Dashboard, DeckConfig, PollEvent};
use deck_model::{AgentKind, ExecuteRequest, NewIntegration, TaskQuery};
use deck_scan::Tab;
use serde_json::Value;
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration from file, environment and global flags
pub fn config(matches: &ArgMatches) -> Result<DeckConfig> {
    let path = matches.get_one::<PathBuf>("config");
    let mut config = DeckConfig::load(path.map(PathBuf::as_path))?;
    if let Some(url) = matches.get_one::<String>("api-url") {
        config = config.with_api_base_url(url.clone());
    }
    config.validate()?;
    Ok(config)
}

fn query(args: &ArgMatches, config: &DeckConfig) -> TaskQuery {
    let limit = args.get_one::<u32>("limit").copied().unwrap_or(config.page_size);
    let offset = args.try_get_one::<u64>("offset").ok().flatten().copied().unwrap_or(0);
    let query = TaskQuery::new(limit).at_offset(offset);
    match args.get_one::<String>("agent") {
        Some(agent) => query.for_agent(agent.clone()),
        None => query,
    }
}

fn pairs(args: &ArgMatches, id: &str) -> serde_json::Map<String, Value> {
    input::collect(
        args.get_many::<(String, Value)>(id)
            .into_iter()
            .flatten()
            .cloned(),
    )
}

/// Run one subcommand, writing its output to `out`
pub async fn dispatch<W: Write>(
    matches: &ArgMatches,
    dashboard: &Dashboard,
    config: &DeckConfig,
    out: &mut W,
) -> Result<()> {
    match matches.subcommand() {
        Some(("agents", _)) => {
            let agents = dashboard.backend().agents().await?;
            write!(out, "{}", AgentTable(&agents))?;
        }
        Some(("integrations", _)) => {
            let integrations = dashboard.backend().integrations().await?;
            write!(out, "{}", IntegrationTable(&integrations))?;
        }
        Some(("integration", sub)) => match sub.subcommand() {
            Some(("add", args)) => {
                let request = NewIntegration {
                    name: required(args, "name")?,
                    service: required(args, "type")?,
                    config: pairs(args, "set"),
                };
                let created = dashboard.backend().add_integration(&request).await?;
                writeln!(out, "Added integration {} ({})", created.id, created.status.as_str())?;
            }
            Some(("remove", args)) => {
                let id = required(args, "id")?;
                dashboard.backend().remove_integration(&id).await?;
                writeln!(out, "Removed integration {id}")?;
            }
            _ => anyhow::bail!("unknown integration command"),
        },
        Some(("tasks", args)) => {
            let (rows, pagination) = dashboard.tasks(&query(args, config)).await?;
            write!(out, "{}", TaskTable { rows: &rows, pagination })?;
        }
        Some(("report", args)) => {
            let task_id = required(args, "task-id")?;
            let (task, report) = dashboard
                .report(&task_id)
                .await
                .with_context(|| format!("fetching task {task_id}"))?;
            if args.get_flag("json") {
                serde_json::to_writer_pretty(&mut *out, report.as_ref())?;
                writeln!(out)?;
            } else {
                let tab = args.get_one::<Tab>("tab").copied();
                write!(out, "{}", ReportView { task: &task, report: &report, tab })?;
            }
        }
        Some(("execute", args)) => {
            let kind = AgentKind::from(required(args, "agent-type")?);
            let mut request = ExecuteRequest::new(required(args, "action")?);
            request.input = pairs(args, "input");
            let task = dashboard.execute(&kind, request).await?;
            writeln!(
                out,
                "Started task {} ({}, {})",
                task.id,
                task.action,
                task.status.as_str()
            )?;
        }
        Some(("mcc", args)) => {
            let task_id = required(args, "task-id")?;
            let code = required(args, "code")?;
            let selected_by = args
                .get_one::<String>("selected-by")
                .cloned()
                .or_else(|| config.operator.clone())
                .unwrap_or_default();
            let (task, _) = dashboard.report(&task_id).await?;
            let selection = dashboard
                .select_mcc(
                    &task,
                    &code,
                    args.get_one::<String>("reason").map(String::as_str),
                    &selected_by,
                )
                .await?;
            writeln!(
                out,
                "Recorded MCC {} for task {task_id} ({:?} selection by {})",
                selection.mcc_code, selection.source, selection.selected_by
            )?;
        }
        Some(("watch", args)) => {
            let period = args
                .get_one::<u64>("interval")
                .map_or_else(|| config.poll_interval(), |s| Duration::from_secs(*s));
            let stop = async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    tracing::warn!(error = %err, "could not listen for Ctrl-C");
                    std::future::pending::<()>().await;
                }
            };
            watch(dashboard, query(args, config), period, out, stop).await?;
        }
        _ => anyhow::bail!("no command given, see --help"),
    }
    Ok(())
}

fn required(args: &ArgMatches, id: &str) -> Result<String> {
    args.get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing <{id}>"))
}

/// Print a dashboard on every poll until `stop` resolves
///
/// Failed cycles are reported and polling continues.
pub async fn watch<W, S>(
    dashboard: &Dashboard,
    query: TaskQuery,
    period: Duration,
    out: &mut W,
    stop: S,
) -> Result<()>
where
    W: Write,
    S: Future<Output = ()>,
{
    let (handle, mut events) = dashboard.watch(query, period);
    tokio::pin!(stop);

    loop {
        tokio::select! {
            biased;
            () = &mut stop => break,
            event = events.recv() => match event {
                Some(PollEvent::Snapshot(snapshot)) => {
                    writeln!(out, "{}", DashboardView(&snapshot))?;
                }
                Some(PollEvent::Failed(err)) => {
                    writeln!(out, "refresh failed: {err} (retrying in {}s)", period.as_secs())?;
                }
                None => break,
            },
        }
        out.flush()?;
    }

    handle.shutdown().await;
    tracing::info!("watch stopped");
    Ok(())
}
