//! Disputecast command line
//!
//! Plays scripted bank-dispute walkthroughs in the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::Config;
use crate::errors::DisputecastError;
use crate::output;
use crate::playback::{PlaybackRuntime, Stage};
use crate::script::{ScenarioLibrary, Script};
use crate::telemetry::{init_tracing, init_tracing_verbose};

/// How long to wait for the playback task to stop on exit.
const SHUTDOWN_TIMEOUT_MS: u64 = 2000;

#[derive(Parser, Debug)]
#[command(name = "disputecast")]
#[command(about = "Scripted multi-agent bank dispute walkthroughs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Playback speed multiplier (values below 0.25 clamp to 0.25)
    #[arg(short, long, value_name = "X", global = true)]
    speed: Option<f64>,

    /// Scenario to select at startup
    #[arg(long, value_name = "ID", global = true)]
    scenario: Option<String>,

    /// Debug logging to stderr
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Play a scenario (default)
    #[command(alias = "p")]
    Play {
        /// Print the transcript line by line instead of opening the TUI
        #[arg(long)]
        plain: bool,
    },

    /// List available scenarios
    #[command(alias = "ls")]
    List,

    /// Show the agent directory
    Roster,

    /// Check a scenario script file
    Validate {
        /// Path to a JSON script
        file: PathBuf,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        init_tracing_verbose();
    } else {
        init_tracing();
    }

    if cli.no_color || std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    }

    match cli.command.clone().unwrap_or(Commands::Play { plain: false }) {
        Commands::Validate { file } => validate(&file),
        Commands::List => {
            let (_, library) = prepare(&cli)?;
            output::print_scenarios(&library);
            Ok(())
        }
        Commands::Roster => {
            output::print_roster();
            Ok(())
        }
        Commands::Play { plain } => {
            let (config, library) = prepare(&cli)?;
            play(library, &config, plain).await
        }
    }
}

/// Config with CLI overrides applied, and the scenario library.
fn prepare(cli: &Cli) -> Result<(Config, ScenarioLibrary)> {
    let mut config = Config::load(cli.config.as_deref())
        .map_err(|e| DisputecastError::Config(format!("{:#}", e)))?;
    if let Some(speed) = cli.speed {
        config.playback.default_speed = speed;
    }
    if let Some(scenario) = &cli.scenario {
        config.playback.default_scenario = Some(scenario.clone());
    }
    let library = load_library(&config)?;
    Ok((config, library))
}

/// Built-in scenarios plus any in `scripts_dir`.
fn load_library(config: &Config) -> Result<ScenarioLibrary> {
    let mut library = ScenarioLibrary::builtin();
    if let Some(dir) = &config.scripts_dir {
        let loaded = library
            .load_dir(dir)
            .map_err(DisputecastError::from)
            .with_context(|| format!("Failed to load scripts from {}", dir.display()))?;
        info!(count = loaded, dir = %dir.display(), "Loaded extra scenarios");
    }
    Ok(library)
}

async fn play(library: ScenarioLibrary, config: &Config, plain: bool) -> Result<()> {
    let mut playback = config.playback.clone();
    if plain {
        // the plain host starts playback itself once subscribed
        playback.autoplay = false;
    }
    let stage = Stage::new(library.clone(), &playback)?;
    debug!(scenario = %stage.transport().selected_scenario, "Stage ready");

    let handle = PlaybackRuntime::spawn(stage);
    let result = if plain {
        output::run_plain(&handle).await
    } else {
        crate::tui::run(&handle, &library, &config.ui).await
    };
    handle
        .shutdown_timeout(std::time::Duration::from_millis(SHUTDOWN_TIMEOUT_MS))
        .await?;
    result
}

fn validate(file: &std::path::Path) -> Result<()> {
    let script = Script::load(file).map_err(DisputecastError::from)?;
    script.ensure_not_empty().map_err(DisputecastError::from)?;
    let warnings = script.lint();
    output::print_validation(&script, &warnings);
    Ok(())
}
