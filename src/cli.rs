//! Coinfall - falling coins and a timed splash for the terminal

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{Config, Preset};
use crate::errors::CoinfallError;
use crate::observability::telemetry::{init_file_tracing, init_tracing, LOG_FILE_NAME};
use crate::runtime::spawn_page;
use crate::sequencing::{LandingPage, PageEventKind};
use crate::simulate::{simulate, SimulationPlan, Timeline};
use crate::ui::tui;

#[derive(Parser)]
#[command(name = "coinfall")]
#[command(about = "Falling coins and a timed splash, in your terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Landing page variant; overrides the config file
    #[arg(short, long, value_enum, global = true)]
    preset: Option<Preset>,

    /// Seed for particle randomness (reproducible runs)
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

/// Output format for the simulation timeline
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// One event per line (default)
    #[default]
    Text,
    /// JSON document for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the page in the terminal (default)
    #[command(alias = "r")]
    Run,

    /// Run headless in real time, printing events as they happen
    #[command(alias = "w")]
    Watch {
        /// Stop after this many milliseconds; runs until Ctrl+C otherwise
        #[arg(long, value_name = "MS")]
        duration_ms: Option<u64>,

        /// Pick an icon this many milliseconds after mount
        #[arg(long, value_name = "MS")]
        choose_after_ms: Option<u64>,

        /// Icon index to pick
        #[arg(long, default_value = "0")]
        choice: usize,
    },

    /// Step through virtual time and print the event timeline
    #[command(alias = "s")]
    Simulate {
        /// Virtual time to simulate
        #[arg(long, value_name = "MS")]
        duration_ms: u64,

        /// Pick an icon at this virtual time
        #[arg(long, value_name = "MS")]
        choose_at_ms: Option<u64>,

        /// Icon index to pick
        #[arg(long, default_value = "0")]
        choice: usize,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the effective configuration as TOML
    Config,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = effective_config(&cli)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let dir = log_dir();
            let _guard = init_file_tracing(&dir, cli.verbose)
                .with_context(|| format!("Failed to open log in {}", dir.display()))?;
            tracing::info!(log = %dir.join(LOG_FILE_NAME).display(), "Starting terminal UI");

            tokio::task::spawn_blocking(move || tui::run_page(&config))
                .await
                .context("Terminal UI task failed")??;
        }
        Commands::Watch {
            duration_ms,
            choose_after_ms,
            choice,
        } => {
            init_tracing(cli.verbose);
            watch(&config, duration_ms, choose_after_ms, choice).await?;
        }
        Commands::Simulate {
            duration_ms,
            choose_at_ms,
            choice,
            format,
        } => {
            init_tracing(cli.verbose);
            let mut plan = SimulationPlan::new(Duration::from_millis(duration_ms));
            if let Some(at) = choose_at_ms {
                plan = plan.choose_at(Duration::from_millis(at), choice);
            }
            let timeline = simulate(&config, &plan)?;
            print_timeline(&timeline, format)?;
        }
        Commands::Config => {
            init_tracing(cli.verbose);
            let rendered =
                toml::to_string_pretty(&config).context("Failed to serialize config")?;
            print!("{}", rendered);
        }
    }

    Ok(())
}

/// Config file, then preset and seed from the command line, validated last
fn effective_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::read(cli.config.as_deref())?;
    if let Some(preset) = cli.preset {
        config.apply_preset(preset);
    }
    if let Some(seed) = cli.seed {
        config.particles.seed = Some(seed);
    }
    config.validate().map_err(CoinfallError::Config)?;
    Ok(config)
}

fn log_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("coinfall"))
        .unwrap_or_else(std::env::temp_dir)
}

async fn watch(
    config: &Config,
    duration_ms: Option<u64>,
    choose_after_ms: Option<u64>,
    choice: usize,
) -> Result<()> {
    let page = LandingPage::from_config(config);
    let handle = spawn_page(page, |event| println!("{}", event));

    if let Some(after) = choose_after_ms {
        let inputs = handle.inputs();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(after)).await;
            let _ = inputs.send(crate::runtime::PageInput::Choose(choice)).await;
        });
    }

    match duration_ms {
        Some(ms) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(ms)) => {}
                _ = tokio::signal::ctrl_c() => {}
            }
        }
        None => {
            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl+C")?;
        }
    }

    let summary = handle.shutdown().await?;
    eprintln!(
        "{} events, {} particles spawned, main content {} after {}ms",
        summary.events,
        summary.particles_spawned,
        if summary.main_content_revealed {
            "revealed"
        } else {
            "hidden"
        },
        summary.elapsed.as_millis()
    );
    Ok(())
}

fn print_timeline(timeline: &Timeline, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(timeline)?);
        }
        OutputFormat::Text => {
            for event in &timeline.events {
                println!("{}", event);
            }
            let spawned = timeline.count(|k| matches!(k, PageEventKind::ParticleSpawned { .. }));
            println!(
                "-- {} events, {} spawned, {} live at end, main content {}",
                timeline.events.len(),
                spawned,
                timeline.final_view.particles.len(),
                if timeline.final_view.main_content_revealed {
                    "revealed"
                } else {
                    "hidden"
                }
            );
        }
    }
    Ok(())
}
