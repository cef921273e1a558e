//! Flappy Neuro entry point
//!
//! Parses the command line, picks a surface and runs a session.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use flappy_neuro::Settings;
use flappy_neuro::logging::LogOutput;
use flappy_neuro::persistence::BestAgentStore;
use flappy_neuro::platform::{FlapButton, Paced, QuitSignal, Surface, TerminalSurface};
use flappy_neuro::render::LogSink;
use flappy_neuro::session::{self, SessionSummary};

#[derive(Debug, Parser)]
#[command(name = "flappy-neuro", version, about = "Flappy bird flown by an evolving population")]
struct Cli {
    /// Settings file (JSON); defaults are used when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log a HUD line instead of drawing in the terminal
    #[arg(long, global = true)]
    headless: bool,

    /// Draw guide lines from each bird to its target gap
    #[arg(long, global = true)]
    guides: bool,

    /// Log file used while the terminal display is active
    #[arg(long, global = true, default_value = "flappy-neuro.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evolve a population (the default)
    Train {
        /// Generations to run
        #[arg(short, long)]
        generations: Option<u32>,
        /// Birds per generation
        #[arg(short, long)]
        population: Option<usize>,
        /// Seed for a reproducible run
        #[arg(short, long)]
        seed: Option<u64>,
        /// Train even when a best agent is already saved
        #[arg(long)]
        fresh: bool,
    },
    /// Fly the saved best agent
    Replay {
        #[arg(short, long, default_value_t = 1)]
        episodes: u32,
    },
    /// Fly a bird yourself (space or up to flap)
    Play,
}

fn open_surface(cli: &Cli, settings: &Settings, quit: &QuitSignal, flap: &FlapButton) -> Result<Box<dyn Surface>> {
    if cli.headless {
        let sink = LogSink::new(settings.log_every);
        let surface: Box<dyn Surface> = if settings.realtime {
            Box::new(Paced(sink))
        } else {
            Box::new(sink)
        };
        return Ok(surface);
    }
    let surface =
        TerminalSurface::new(quit.clone(), flap.clone(), cli.guides).context("failed to take over the terminal")?;
    Ok(Box::new(surface))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    LogOutput::choose(cli.headless, &cli.log_file)
        .builder()
        .with_context(|| format!("failed to open log file {}", cli.log_file.display()))?
        .init();

    let mut settings = Settings::load_or_default(cli.config.as_deref());
    let quit = QuitSignal::new();
    let flap = FlapButton::new();

    let default = Command::Train {
        generations: None,
        population: None,
        seed: None,
        fresh: false,
    };
    let command = cli.command.as_ref().unwrap_or(&default);

    if matches!(command, Command::Play) && cli.headless {
        bail!("play needs the terminal; run it without --headless");
    }

    let mut surface = open_surface(&cli, &settings, &quit, &flap)?;
    let summary: SessionSummary = match *command {
        Command::Train {
            generations,
            population,
            seed,
            fresh,
        } => {
            if let Some(generations) = generations {
                settings.generations = generations;
            }
            if let Some(population) = population {
                settings.population_size = population;
            }
            if seed.is_some() {
                settings.seed = seed;
            }

            let store = BestAgentStore::new(&settings.best_agent_path);
            if !fresh && store.exists() {
                log::info!(
                    "Found a saved agent at {}; replaying it (pass --fresh to train anyway)",
                    store.path().display()
                );
                session::replay(&settings, &mut *surface, &quit, 1).context("failed to replay the saved agent")?
            } else {
                session::train(&settings, &mut *surface, &quit).context("training failed")?
            }
        }
        Command::Replay { episodes } => session::replay(&settings, &mut *surface, &quit, episodes)
            .with_context(|| format!("failed to replay {}", settings.best_agent_path.display()))?,
        Command::Play => session::play(&settings, &mut *surface, &quit, &flap, None),
    };
    // Restore the terminal before reporting
    drop(surface);

    log::info!(
        "Ran {} episode(s); best score {}, best fitness {:.3}{}",
        summary.generations,
        summary.best_score,
        summary.best_fitness,
        if summary.quit { " (quit early)" } else { "" }
    );
    if summary.saved {
        log::info!("Best agent saved to {}", settings.best_agent_path.display());
    }
    Ok(())
}
