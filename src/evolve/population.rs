//! Genomes and the evolving population

use std::ops::ControlFlow;

use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::network::{NUM_INPUTS, Network};
use crate::settings::EvolutionSettings;
use crate::sim::{Agent, Observation};

/// One candidate controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub id: u64,
    pub network: Network,
    pub fitness: f32,
}

impl Genome {
    pub fn new(id: u64, network: Network) -> Self {
        Self {
            id,
            network,
            fitness: 0.0,
        }
    }
}

impl Agent for Genome {
    fn decide(&mut self, observation: &Observation) -> f32 {
        self.network.activate(&observation.as_inputs())
    }

    fn fitness_mut(&mut self) -> &mut f32 {
        &mut self.fitness
    }

    fn fitness(&self) -> f32 {
        self.fitness
    }
}

/// Fitness summary of one evaluated generation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u32,
    pub best: f32,
    pub mean: f32,
    pub stdev: f32,
    pub best_id: u64,
}

impl GenerationStats {
    pub fn of(generation: u32, genomes: &[Genome]) -> Option<Self> {
        let best = genomes
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))?;
        let n = genomes.len() as f32;
        let mean = genomes.iter().map(|g| g.fitness).sum::<f32>() / n;
        let variance = genomes
            .iter()
            .map(|g| (g.fitness - mean).powi(2))
            .sum::<f32>()
            / n;
        Some(Self {
            generation,
            best: best.fitness,
            mean,
            stdev: variance.sqrt(),
            best_id: best.id,
        })
    }
}

/// A generation of genomes plus the breeding machinery
#[derive(Debug, Clone)]
pub struct Population {
    settings: EvolutionSettings,
    genomes: Vec<Genome>,
    generation: u32,
    rng: Pcg32,
    next_id: u64,
    best: Option<Genome>,
    history: Vec<GenerationStats>,
}

impl Population {
    pub fn new(size: usize, settings: EvolutionSettings, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let genomes = (0..size as u64)
            .map(|id| {
                let net = Network::random(&mut rng, NUM_INPUTS, settings.hidden, settings.init_stdev);
                Genome::new(id, net)
            })
            .collect();
        Self {
            settings,
            genomes,
            generation: 0,
            rng,
            next_id: size as u64,
            best: None,
            history: Vec::new(),
        }
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Best genome seen in any evaluated generation
    pub fn best(&self) -> Option<&Genome> {
        self.best.as_ref()
    }

    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    /// Evaluate and breed up to `generations` times
    ///
    /// `eval` receives the genomes with zeroed fitness and the generation
    /// number; it fills in fitness and may stop the run early. The run also
    /// stops once the best fitness reaches the configured threshold.
    pub fn run<F>(&mut self, generations: u32, mut eval: F) -> Option<&Genome>
    where
        F: FnMut(&mut [Genome], u32) -> ControlFlow<()>,
    {
        for _ in 0..generations {
            if self.genomes.is_empty() {
                break;
            }
            log::info!("****** Running generation {} ******", self.generation);
            for genome in &mut self.genomes {
                genome.fitness = 0.0;
            }

            if eval(&mut self.genomes, self.generation).is_break() {
                // A stopped evaluation leaves fitness partly scored
                log::info!("Evaluation stopped the run at generation {}", self.generation);
                break;
            }

            if let Some(stats) = GenerationStats::of(self.generation, &self.genomes) {
                log::info!(
                    "Population's average fitness: {:.5} stdev: {:.5}",
                    stats.mean,
                    stats.stdev
                );
                log::info!("Best fitness: {:.5} - id {}", stats.best, stats.best_id);
                self.record_best();
                self.history.push(stats);

                if stats.best >= self.settings.fitness_threshold {
                    log::info!(
                        "Best fitness {:.3} reached the threshold {:.3}",
                        stats.best,
                        self.settings.fitness_threshold
                    );
                    break;
                }
            }

            self.reproduce();
            self.generation += 1;
        }
        self.best()
    }

    fn record_best(&mut self) {
        let Some(champion) = self
            .genomes
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
        else {
            return;
        };
        let improved = self
            .best
            .as_ref()
            .is_none_or(|best| champion.fitness > best.fitness);
        if improved {
            self.best = Some(champion.clone());
        }
    }

    /// Replace the current genomes with the next generation
    pub fn reproduce(&mut self) {
        let size = self.genomes.len();
        if size == 0 {
            return;
        }
        self.genomes
            .sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        let elites = self.settings.elitism.min(size);
        let breeders = ((size as f32 * self.settings.survival_threshold).ceil() as usize)
            .max(2)
            .min(size);

        let mut next: Vec<Genome> = self.genomes[..elites].to_vec();
        let pool = &self.genomes[..breeders];
        while next.len() < size {
            let (Some(a), Some(b)) = (pool.choose(&mut self.rng), pool.choose(&mut self.rng)) else {
                break;
            };
            let mut network = a.network.crossover(&b.network, &mut self.rng);
            network.mutate(&mut self.rng, &self.settings);
            next.push(Genome::new(self.next_id, network));
            self.next_id += 1;
        }
        self.genomes = next;
    }
}
