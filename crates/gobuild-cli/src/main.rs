//! CLI entry point - the composition root.

use clap::Parser;

use gobuild_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = bootstrap(CliConfig {
        settings_path: cli.settings.clone(),
        go: cli.go.clone(),
        cwd: cli.cwd.clone(),
        assume_yes: cli.yes,
    })?;

    let result = match &cli.command {
        Commands::Terminal => handlers::terminal::execute(&ctx),
        command => match command.task() {
            Some(task) => handlers::task::execute(
                &ctx,
                task,
                command.flags(),
                command.options(),
                cli.report.as_deref(),
            )
            .await
            .and_then(|outcome| CliError::from_outcome(outcome).map_or(Ok(()), Err)),
            None => Ok(()),
        },
    };

    ctx.supervisor.shutdown();

    if let Err(e) = result {
        if !matches!(e, CliError::Task(_)) {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
    Ok(())
}
