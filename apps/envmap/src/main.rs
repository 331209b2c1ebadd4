//! envmap - resolve and stream HDR environment maps
//!
//! Main CLI application; every command runs through the ops crate.

mod cli;
mod display;
mod error;
mod events;
mod frontend;
mod logging;

use crate::cli::{Cli, Commands};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use crate::frontend::FileFrontend;
use clap::Parser;
use envmap_config::Config;
use envmap_events::EventReceiver;
use envmap_ops::{AssetListing, OperationResult, OpsCtx};
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting envmap v{}", env!("CARGO_PKG_VERSION"));

    // file config (or defaults), then environment, then CLI flags
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global);

    let (event_sender, event_receiver) = envmap_events::channel();
    let ctx = OpsCtx::from_config(config.clone(), event_sender)?;

    let renderer = OutputRenderer::new(cli.global.json, config.general.color);
    let mut event_handler =
        EventHandler::new(renderer.colors_enabled(), cli.global.debug, cli.global.json);

    let result =
        execute_command_with_events(cli.command, ctx.clone(), event_receiver, &mut event_handler)
            .await;
    envmap_ops::shutdown(&ctx).await;

    let result = result?;
    // asset bytes already went to stdout
    if !matches!(&result, OperationResult::Stream(report) if report.destination.is_none()) {
        renderer.render_result(&result)?;
    }
    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    ctx: OpsCtx,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, ctx));

    loop {
        select! {
            result = &mut command_future => {
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }

            _ = tokio::signal::ctrl_c() => {
                return Err(CliError::Interrupted);
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(command: Commands, ctx: OpsCtx) -> Result<OperationResult, CliError> {
    match command {
        Commands::Resolve => {
            let result = envmap_ops::resolve_assets(&ctx).await;
            Ok(OperationResult::AssetList(AssetListing::from(&result)))
        }

        Commands::Push { target, ready_file } => {
            let frontend = FileFrontend::new(target, ready_file);
            let result = envmap_ops::push_when_ready(&ctx, &frontend).await?;
            Ok(OperationResult::AssetList(AssetListing::from(&result)))
        }

        Commands::Open { uri, output } => {
            let report = match output {
                Some(path) => {
                    let mut file = tokio::fs::File::create(&path).await?;
                    envmap_ops::copy_asset(&ctx, &uri, &mut file, Some(path)).await?
                }
                None => envmap_ops::copy_asset(&ctx, &uri, &mut tokio::io::stdout(), None).await?,
            };
            Ok(OperationResult::Stream(report))
        }

        Commands::Install => {
            // progress is rendered from install events
            let report = envmap_ops::install_module(&ctx, |_| {}).await?;
            Ok(OperationResult::Install(report))
        }

        Commands::Status => Ok(OperationResult::Status(envmap_ops::status(&ctx))),
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs) {
    if let Some(color) = global.color {
        config.general.color = color;
    }
    if global.offline {
        config.delivery.remote_enabled = false;
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;
    let debug_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,envmap=debug,envmap_ops=info"))
    };

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        let log_dir = Config::default().logs_path();
        let log_file = log_dir.join(format!(
            "envmap-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        let file = std::fs::create_dir_all(&log_dir).and_then(|()| std::fs::File::create(&log_file));
        match file {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(debug_filter())
                    .init();
                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) if !json_mode => {
                eprintln!("Warning: Failed to create log file: {e}");
                tracing_subscriber::fmt()
                    .with_writer(std::io::stderr)
                    .with_env_filter(debug_filter())
                    .init();
                return;
            }
            Err(_) => {}
        }
    }

    if json_mode {
        // JSON mode: suppress all console output to avoid contaminating JSON
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("warn,envmap=warn,envmap_ops=warn")
                }),
            )
            .init();
    }
}
