use application::{run_migration_command, MigrateCommand, SocialApp};
use clap::{error::ErrorKind, Args, Parser, Subcommand};
use config::Config;
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// MiniSocial maintenance commands.
#[derive(Debug, Parser)]
#[command(name = "mini-social", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending database migrations.
    Migrate(MigrateArgs),
}

#[derive(Debug, Args)]
struct MigrateArgs {
    /// Show current version, applied and pending migrations.
    #[arg(long, conflicts_with = "target_version")]
    status: bool,
    /// Apply pending migrations up to and including this version.
    #[arg(long = "target-version", value_name = "version")]
    target_version: Option<String>,
}

impl From<MigrateArgs> for MigrateCommand {
    fn from(args: MigrateArgs) -> Self {
        match (args.status, args.target_version) {
            (true, _) => MigrateCommand::Status,
            (false, Some(version)) => MigrateCommand::ToVersion(version),
            (false, None) => MigrateCommand::Latest,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    // Logs go to stderr; stdout carries the command report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mini_social=info,application=info,infrastructure=info")),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<u8> {
    let config = Config::from_env(None)?;
    let app = SocialApp::new(&config)?;

    match cli.command {
        Command::Migrate(args) => {
            let command = MigrateCommand::from(args);
            let mut stdout = io::stdout().lock();
            let code = run_migration_command(&app.migration_runner, &command, &mut stdout).await?;
            stdout.flush()?;
            Ok(if code == 0 { 0 } else { 1 })
        }
    }
}
