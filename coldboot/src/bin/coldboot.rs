//! coldboot - worker cold-start entry point.
//!
//! Usage:
//!   coldboot [run] [--volume PATH] [--framework-root PATH] ...
//!   coldboot inspect [--json]

use clap::{Parser, Subcommand};
use coldboot::config::{InspectArgs, RunArgs};
use coldboot::fs::NativeFs;
use coldboot::inspect::inspect;
use coldboot::layout::{FrameworkLayout, VolumeLayout};
use coldboot::{BootConfig, BootResult, Bootstrapper, init_logging};
use std::process::ExitCode;

/// Prepare the model volume and hand the instance to the request handler
#[derive(Parser, Debug)]
#[command(name = "coldboot", version, about, long_about = None, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the bootstrap sequence (default)
    Run(RunArgs),

    /// Report volume, layout and link state without changing anything
    Inspect(InspectArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::Run(args)) => run_bootstrap(args),
        None => run_bootstrap(cli.run),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("coldboot: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_bootstrap(args: RunArgs) -> BootResult<u8> {
    init_logging(args.log_dir.as_deref())?;

    let config = BootConfig::from_args(&args)?;
    if let Ok(json) = serde_json::to_string(&config) {
        tracing::debug!(config = %json, "Loaded configuration");
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(Bootstrapper::from_config(config).run())?;

    Ok(exit_code_byte(report.exit_code()))
}

fn run_inspect(args: InspectArgs) -> BootResult<u8> {
    init_logging(None)?;

    let report = inspect(
        &NativeFs,
        &VolumeLayout::new(&args.volume),
        &FrameworkLayout::new(&args.framework_root),
    )?;

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| coldboot::BootError::Internal(format!("failed to encode report: {}", e)))?;
        println!("{}", json);
    } else {
        println!("{}", report.render());
    }

    Ok(if report.is_ready() { 0 } else { 1 })
}

/// Clamp a handler exit status into the range a process can report.
fn exit_code_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
