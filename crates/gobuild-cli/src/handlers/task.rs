//! Run one Go task under supervision.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gobuild_core::{
    ActiveDocument, BuildCompleteEvent, BuildTask, CROSS_COMPILE_TARGETS, ConfigError,
    GO_ENV_VARS, ProcessOutcome, ResolveContext, ResolvedConfig, TaskOptions,
    cross_compile_labels, determine_working_dir, plan_task, report_config_error,
};
use tracing::{info, warn};

use crate::bootstrap::{CLI_TARGET, CliContext};
use crate::error::CliError;

/// Plan, start and stream `task`, returning its terminal result.
///
/// Ctrl-C cancels the running process tree. When `report` is given the
/// completion record is written there as JSON.
pub async fn execute(
    ctx: &CliContext,
    task: BuildTask,
    flags: Option<Vec<String>>,
    mut options: TaskOptions,
    report: Option<&Path>,
) -> Result<ProcessOutcome, CliError> {
    options.active_file = options.active_file.map(|file| absolutize(&ctx.folder, file));
    let active = options
        .active_file
        .clone()
        .map_or(ActiveDocument::None, ActiveDocument::Saved);
    let working_dir = determine_working_dir(&active, std::slice::from_ref(&ctx.folder))?;

    let resolved = resolve_go(ctx, &options).await?;
    fill_interactive_options(ctx, task, &mut options).await?;

    let flags = flags.or_else(|| ctx.settings.flags_for(task));
    let plan = plan_task(
        task,
        &resolved.executable.to_string_lossy(),
        flags,
        resolved.env,
        &options,
    )?;

    if ctx
        .supervisor
        .yield_to_running(CLI_TARGET, Arc::clone(&ctx.prompt))
        .await?
    {
        return Err(CliError::Aborted);
    }

    let mut completions = ctx.supervisor.subscribe_completions();
    let run = ctx
        .supervisor
        .start_supervised_process(task.as_str(), CLI_TARGET, plan.args, working_dir, plan.env)
        .await?;

    let outcome = tokio::select! {
        outcome = run.process.wait() => outcome,
        () = interrupted(tokio::signal::ctrl_c()) => {
            info!("Interrupted, cancelling");
            ctx.supervisor.cancel_supervised_process(CLI_TARGET);
            run.process.wait().await
        }
    };
    run.printer.wait().await?;
    println!();

    match completions.try_recv() {
        Ok(event) => {
            if let Some(path) = report {
                write_report(path, &event)?;
            }
        }
        Err(e) => warn!(error = %e, "No completion record received"),
    }

    Ok(outcome)
}

fn absolutize(folder: &Path, file: PathBuf) -> PathBuf {
    if file.is_absolute() {
        file
    } else {
        folder.join(file)
    }
}

/// Locate go, offering the configuration docs on failure.
async fn resolve_go(ctx: &CliContext, options: &TaskOptions) -> Result<ResolvedConfig, CliError> {
    let resolve_ctx = ResolveContext {
        active_file: options.active_file.clone(),
        folders: vec![ctx.folder.clone()],
    };
    match ctx.config.resolve(&ctx.go, &[], GO_ENV_VARS, &resolve_ctx) {
        Ok(resolved) => Ok(resolved),
        Err(err) => {
            report_on_coordinator(ctx, err.clone()).await;
            Err(err.into())
        }
    }
}

async fn report_on_coordinator(ctx: &CliContext, err: ConfigError) {
    let prompt = Arc::clone(&ctx.prompt);
    if let Err(e) = ctx
        .supervisor
        .coordinator()
        .run(move || report_config_error(&*prompt, &err))
        .await
    {
        warn!(error = %e, "Could not show configuration error");
    }
}

/// Ask for what the arguments left out: the platform to cross compile for
/// and the package to get.
async fn fill_interactive_options(
    ctx: &CliContext,
    task: BuildTask,
    options: &mut TaskOptions,
) -> Result<(), CliError> {
    let prompt = Arc::clone(&ctx.prompt);
    let coordinator = ctx.supervisor.coordinator();
    match task {
        BuildTask::CrossCompile if options.platform.is_none() => {
            let choice = coordinator
                .run(move || prompt.quick_panel(&cross_compile_labels()))
                .await?;
            let (os, arch) = choice
                .and_then(|index| CROSS_COMPILE_TARGETS.get(index))
                .ok_or(CliError::Aborted)?;
            options.platform = Some(((*os).to_string(), (*arch).to_string()));
        }
        BuildTask::Get if options.url.is_none() => {
            let url = coordinator
                .run(move || prompt.input("go get Package URL", ""))
                .await?
                .filter(|url| !url.trim().is_empty())
                .ok_or(CliError::Aborted)?;
            options.url = Some(url.trim().to_string());
        }
        _ => {}
    }
    Ok(())
}

fn write_report(path: &Path, event: &BuildCompleteEvent) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(event)
        .map_err(|e| CliError::Io(format!("Failed to encode completion record: {e}")))?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Resolves once `signal` fires. Never resolves if the listener could not be
/// installed.
async fn interrupted(signal: impl Future<Output = io::Result<()>>) {
    if let Err(e) = signal.await {
        warn!(error = %e, "Could not listen for Ctrl-C, interrupts will not cancel the build");
        std::future::pending::<()>().await;
    }
}
