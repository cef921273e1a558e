//! Session driver
//!
//! Wires the population, the episode loop, persistence and a surface into the
//! three run modes: evolve a population, replay the saved champion, or fly a
//! bird from the keyboard.

use std::ops::ControlFlow;

use rand::Rng;

use crate::evolve::{Genome, Population};
use crate::persistence::{BestAgentStore, PersistenceError};
use crate::platform::{FlapButton, ManualAgent, QuitSignal, Surface};
use crate::settings::Settings;
use crate::sim::{Agent, EndReason, Episode, EpisodeConfig, EpisodeReport, Roster, Sprites};

/// What a session accomplished
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSummary {
    /// Generations (or replay/play rounds) that ran an episode
    pub generations: u32,
    pub best_score: u32,
    pub best_fitness: f32,
    /// The run was cut short by a quit request
    pub quit: bool,
    /// A champion was written to the best-agent store
    pub saved: bool,
}

impl SessionSummary {
    fn record(&mut self, report: &EpisodeReport) {
        self.generations += 1;
        self.best_score = self.best_score.max(report.score);
        if report.reason == EndReason::Quit {
            self.quit = true;
        }
    }
}

/// Base seed from settings, or a fresh one
pub fn session_seed(settings: &Settings) -> u64 {
    settings.seed.unwrap_or_else(|| rand::rng().random())
}

/// Pipe-course seed for one generation
#[inline]
pub fn episode_seed(base: u64, generation: u32) -> u64 {
    (generation as u64).wrapping_mul(2_654_435_761).wrapping_add(base)
}

/// Evolve a population, saving the champion of any episode that reaches the
/// score cutoff
pub fn train<S: Surface + ?Sized>(
    settings: &Settings,
    surface: &mut S,
    quit: &QuitSignal,
) -> Result<SessionSummary, PersistenceError> {
    let sprites = Sprites::standard();
    let store = BestAgentStore::new(&settings.best_agent_path);
    let seed = session_seed(settings);
    log::info!(
        "Training {} birds for up to {} generations (seed {})",
        settings.population_size,
        settings.generations,
        seed
    );

    let mut population = Population::new(settings.population_size, settings.evolution.clone(), seed);
    let mut summary = SessionSummary::default();
    let mut failure = None;

    population.run(settings.generations, |genomes, generation| {
        let config = EpisodeConfig {
            generation,
            seed: episode_seed(seed, generation),
            score_cutoff: settings.score_cutoff,
        };
        let report = {
            let roster = Roster::Population(genomes.iter_mut().map(|g| g as &mut dyn Agent).collect());
            let mut episode = Episode::new(roster, &sprites, config);
            episode.run(&mut *surface, quit)
        };
        summary.record(&report);
        log::info!(
            "Generation {} finished: score {} after {} ticks ({:?})",
            generation,
            report.score,
            report.ticks,
            report.reason
        );

        match report.reason {
            EndReason::Quit => return ControlFlow::Break(()),
            EndReason::ScoreCutoff => {
                if let Some(champion) = report.champion.and_then(|slot| genomes.get(slot)) {
                    match store.save(champion, generation, report.score) {
                        Ok(()) => summary.saved = true,
                        Err(err) => {
                            failure = Some(err);
                            return ControlFlow::Break(());
                        }
                    }
                }
            }
            EndReason::Extinct => {}
        }
        ControlFlow::Continue(())
    });

    if let Some(err) = failure {
        return Err(err);
    }
    summary.best_fitness = population.best().map_or(0.0, |g| g.fitness);
    log::info!(
        "Training done: {} generations, best score {}, best fitness {:.3}",
        summary.generations,
        summary.best_score,
        summary.best_fitness
    );
    Ok(summary)
}

/// Fly the saved champion alone for `episodes` rounds
pub fn replay<S: Surface + ?Sized>(
    settings: &Settings,
    surface: &mut S,
    quit: &QuitSignal,
    episodes: u32,
) -> Result<SessionSummary, PersistenceError> {
    let sprites = Sprites::standard();
    let saved = BestAgentStore::new(&settings.best_agent_path).load()?;
    log::info!(
        "Replaying genome {} (saved in generation {} with score {})",
        saved.genome.id,
        saved.saved_generation,
        saved.score
    );

    let seed = session_seed(settings);
    let mut genome: Genome = saved.genome;
    let mut summary = SessionSummary::default();
    for round in 0..episodes {
        genome.fitness = 0.0;
        let config = EpisodeConfig {
            generation: round,
            seed: episode_seed(seed, round),
            score_cutoff: settings.score_cutoff,
        };
        let report = Episode::new(Roster::Replay(&mut genome), &sprites, config).run(&mut *surface, quit);
        summary.record(&report);
        summary.best_fitness = summary.best_fitness.max(genome.fitness);
        log::info!("Replay {} finished: score {}", round, report.score);
        if summary.quit {
            break;
        }
    }
    Ok(summary)
}

/// Fly a bird from the keyboard; `rounds` of `None` plays until quit
pub fn play<S: Surface + ?Sized>(
    settings: &Settings,
    surface: &mut S,
    quit: &QuitSignal,
    flap: &FlapButton,
    rounds: Option<u32>,
) -> SessionSummary {
    let sprites = Sprites::standard();
    let seed = session_seed(settings);
    let mut summary = SessionSummary::default();
    let mut round = 0;
    while rounds.is_none_or(|limit| round < limit) && !quit.is_raised() {
        let mut agent = ManualAgent::new(flap.clone());
        let config = EpisodeConfig {
            generation: round,
            seed: episode_seed(seed, round),
            score_cutoff: u32::MAX,
        };
        let report = Episode::new(Roster::Replay(&mut agent), &sprites, config).run(&mut *surface, quit);
        summary.record(&report);
        summary.best_fitness = summary.best_fitness.max(agent.fitness());
        log::info!("Round {} over: score {}", round, report.score);
        round += 1;
    }
    summary
}
