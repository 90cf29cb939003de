//! CLI interface for voix-transfer.
//!
//! A thin shell over the transfer system. `run` and `console` drive the
//! background loop; `cycle`, `state` and `latest` are one-shot probes that
//! are handy when setting up a device.

mod format;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::channel::DeviceChannel;
use crate::config::Config;
use crate::detector::CallStateDetector;
use crate::lifecycle::{OrchestratorState, RunFlag, StartOutcome, TransferSystem};
use crate::locator::RecordingLocator;
use crate::model::RecordingCategory;
use crate::orchestrator::TransferOrchestrator;

use format::{format_entry, format_outcome, format_state};

/// How often `run` checks the logbook for new entries.
const FOLLOW_INTERVAL: Duration = Duration::from_millis(500);

/// voix-transfer: pull call recordings off a phone once each call ends.
#[derive(Debug, Parser)]
#[command(name = "voix-transfer", version, after_long_help = USAGE_HELP)]
pub struct Cli {
    /// Config file (default: ~/.voix-transfer/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Device serial, overriding the config file.
    #[arg(long, global = true)]
    serial: Option<String>,

    /// Local directory to pull recordings into, overriding the config file.
    #[arg(long, global = true)]
    destination: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const USAGE_HELP: &str = r"Typical use:
  voix-transfer state                 # is adb talking to the phone?
  voix-transfer latest incoming       # can we see the recordings?
  voix-transfer run                   # transfer after every call until Ctrl-C

Diagnostics go to stderr; set RUST_LOG=voix_transfer=debug for more.";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the transfer system and print log entries as they happen.
    ///
    /// Runs until interrupted.
    Run {
        /// Print each entry as a JSON line.
        #[arg(long)]
        json: bool,
    },

    /// Interactive control: type start, stop, logs, status, or quit.
    Console,

    /// Run a single transfer cycle in the foreground.
    ///
    /// Waits for any call in progress to end first.
    Cycle,

    /// Print the device's current call state.
    State,

    /// Print the newest recording in a category.
    Latest {
        /// Which recording directory to look in.
        #[arg(value_enum)]
        category: CategoryArg,
    },
}

/// CLI-facing recording category, mapped to the domain `RecordingCategory`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    /// Recordings of incoming calls.
    Incoming,
    /// Recordings of outgoing calls.
    Outgoing,
}

impl CategoryArg {
    fn to_domain(self) -> RecordingCategory {
        match self {
            Self::Incoming => RecordingCategory::Incoming,
            Self::Outgoing => RecordingCategory::Outgoing,
        }
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run() -> Result<(), String> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).map_err(|e| e.to_string())?;
    if let Some(serial) = cli.serial {
        config.serial = Some(serial);
    }
    if let Some(destination) = cli.destination {
        config.destination = destination;
    }

    let channel: Arc<dyn DeviceChannel> = Arc::new(config.channel());

    match cli.command {
        Command::Run { json } => cmd_run(&config, channel, json),
        Command::Console => cmd_console(&config, channel),
        Command::Cycle => cmd_cycle(&config, channel),
        Command::State => {
            cmd_state(&config, channel);
            Ok(())
        }
        Command::Latest { category } => {
            cmd_latest(&config, channel, category.to_domain());
            Ok(())
        }
    }
}

/// Build an orchestrator, making sure the destination exists first.
fn orchestrator(
    config: &Config,
    channel: Arc<dyn DeviceChannel>,
) -> Result<TransferOrchestrator, String> {
    std::fs::create_dir_all(&config.destination).map_err(|e| {
        format!(
            "failed to create destination {}: {e}",
            config.destination.display()
        )
    })?;
    Ok(TransferOrchestrator::new(channel, config.settings()))
}

fn cmd_run(config: &Config, channel: Arc<dyn DeviceChannel>, json: bool) -> Result<(), String> {
    let system = TransferSystem::new(orchestrator(config, channel)?);
    system
        .start()
        .map_err(|e| format!("failed to start transfer system: {e}"))?;

    eprintln!(
        "Transferring recordings into {} (Ctrl-C to stop)",
        config.destination.display()
    );

    let mut seen = 0;
    loop {
        let fresh = system.logbook().since(seen);
        seen += fresh.len();
        for entry in &fresh {
            if json {
                let line = serde_json::to_string(entry)
                    .map_err(|e| format!("failed to serialize log entry: {e}"))?;
                println!("{line}");
            } else {
                println!("{}", format_entry(entry));
            }
        }
        thread::sleep(FOLLOW_INTERVAL);
    }
}

const CONSOLE_HELP: &str = "Commands:
  start   start the transfer system
  stop    stop the transfer system
  logs    show the transfer log
  status  show whether the system is running
  help    show this help
  quit    stop and exit";

fn cmd_console(config: &Config, channel: Arc<dyn DeviceChannel>) -> Result<(), String> {
    let system = TransferSystem::new(orchestrator(config, channel)?);

    eprintln!("{CONSOLE_HELP}");
    prompt();

    for line in io::stdin().lock().lines() {
        let line = line.map_err(|e| format!("failed to read stdin: {e}"))?;

        match line.trim() {
            "" => {}
            "start" => match system.start() {
                Ok(StartOutcome::Started) => println!("Transfer system started."),
                Ok(StartOutcome::AlreadyRunning) => {
                    println!("Transfer system is already running.");
                }
                Err(e) => eprintln!("failed to start transfer system: {e}"),
            },
            "stop" => {
                system.stop();
                println!("Transfer system stopped.");
            }
            "logs" => {
                if system.logbook().is_empty() {
                    println!("No log entries");
                }
                for entry in &system.logs() {
                    println!("{}", format_entry(entry));
                }
            }
            "status" => {
                let state = match system.state() {
                    OrchestratorState::Running => "running",
                    OrchestratorState::Stopped => "stopped",
                };
                println!("{state} ({} log entries)", system.logbook().len());
            }
            "help" => eprintln!("{CONSOLE_HELP}"),
            "quit" | "exit" => break,
            other => eprintln!("unknown command: {other} (try `help`)"),
        }

        prompt();
    }

    if system.state() == OrchestratorState::Running {
        system.stop();
    }
    Ok(())
}

fn prompt() {
    eprint!("> ");
    // A prompt that fails to flush is cosmetic.
    let _ = io::stderr().flush();
}

fn cmd_cycle(config: &Config, channel: Arc<dyn DeviceChannel>) -> Result<(), String> {
    let mut orchestrator = orchestrator(config, channel)?;
    let logbook = orchestrator.logbook();

    eprintln!("Waiting for the current call to end...");
    let outcome = orchestrator.run_cycle(&RunFlag::raised());

    for entry in &logbook.snapshot() {
        println!("{}", format_entry(entry));
    }
    eprintln!("{}", format_outcome(&outcome));

    Ok(())
}

fn cmd_state(config: &Config, channel: Arc<dyn DeviceChannel>) {
    let detector = CallStateDetector::new(channel, config.settings().call_poll);
    println!("{}", format_state(detector.poll_once()));
}

fn cmd_latest(config: &Config, channel: Arc<dyn DeviceChannel>, category: RecordingCategory) {
    let locator = RecordingLocator::new(channel, config.remote_root.clone());
    match locator.latest_recording(category) {
        Some(id) => println!("{id}"),
        None => println!("none"),
    }
}
