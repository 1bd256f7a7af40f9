// ABOUTME: Entry point for the deploylog CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::Completion;
use deploylog::config::{self, Config};
use deploylog::dashboard::Renderer;
use deploylog::error::Result;
use deploylog::output::{Output, OutputMode};
use deploylog::types::{ChannelId, User};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let output = Output::new(mode);

    match run(cli, &output).await {
        Ok(completion) => completion.exit_code(),
        Err(e) => {
            output.error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, output: &Output) -> Result<Completion> {
    let cwd = env::current_dir()?;
    let Cli {
        config: config_path,
        state_dir,
        command,
        ..
    } = cli;
    let load = || load_config(config_path.as_deref(), state_dir.clone(), &cwd);

    match command {
        Commands::Init { force } => {
            let path = config::init_config(&cwd, state_dir.as_deref(), force)?;
            output.event("init", &format!("Created {}", path.display()), None);
            Ok(Completion::Done)
        }
        Commands::Start {
            channel,
            subject,
            user_id,
            user_name,
        } => {
            let channel = ChannelId::new(&channel)?;
            let config = load()?;
            let user_name = user_name.unwrap_or_else(|| user_id.clone());
            let tracker = commands::open_tracker(&config).await?;
            commands::start(
                &tracker,
                &channel,
                User::new(user_id, user_name),
                subject.join(" "),
                &Renderer::new(config.display_offset),
                output,
            )
            .await
        }
        Commands::Finish { channel } => {
            let channel = ChannelId::new(&channel)?;
            let tracker = commands::open_tracker(&load()?).await?;
            commands::finish(&tracker, &channel, output).await
        }
        Commands::Abort { channel, reason } => {
            let channel = ChannelId::new(&channel)?;
            let tracker = commands::open_tracker(&load()?).await?;
            commands::abort(&tracker, &channel, &reason.join(" "), output).await
        }
        Commands::Status { channel } => {
            let channel = ChannelId::new(&channel)?;
            let config = load()?;
            let tracker = commands::open_tracker(&config).await?;
            let renderer = Renderer::new(config.display_offset);
            commands::status(&tracker, &channel, &renderer, output).await
        }
        Commands::History { channel, since } => {
            let channel = ChannelId::new(&channel)?;
            let config = load()?;
            let backend = commands::open_backend(&config).await?;
            commands::history(
                backend.as_ref(),
                &channel,
                since.as_deref(),
                &Renderer::new(config.display_offset),
                output,
            )
            .await
        }
        Commands::Serve { listen } => commands::serve(&load()?, listen, output).await,
    }
}

/// Load the explicit config file, or discover one in `cwd`, then apply overrides.
fn load_config(path: Option<&Path>, state_dir: Option<PathBuf>, cwd: &Path) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)?,
        None => Config::discover_or_default(cwd)?,
    };

    if let Some(dir) = state_dir {
        config.state_dir = Some(dir);
    }
    Ok(config)
}
