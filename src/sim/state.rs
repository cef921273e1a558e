//! Episode state types
//!
//! Each live bird travels with its agent handle in one [`Contestant`] record,
//! so eliminating a bird drops its controller and fitness handle in the same
//! operation.

use serde::{Deserialize, Serialize};

use super::agent::Agent;
use super::bird::Bird;
use crate::consts::*;

/// Why an episode stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Every bird was eliminated
    Extinct,
    /// Score passed the cutoff while birds were still flying
    ScoreCutoff,
    /// An external quit request aborted the run
    Quit,
}

/// Episode lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Running,
    Terminated(EndReason),
}

impl Phase {
    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self, Phase::Running)
    }
}

/// A live bird and the agent flying it
pub struct Contestant<'a> {
    /// Index of the agent in the roster it came from
    pub slot: usize,
    pub bird: Bird,
    pub agent: &'a mut dyn Agent,
}

impl<'a> Contestant<'a> {
    pub fn new(slot: usize, agent: &'a mut dyn Agent) -> Self {
        Self {
            slot,
            bird: Bird::new(BIRD_START_X, BIRD_START_Y),
            agent,
        }
    }

    #[inline]
    pub fn reward(&mut self, amount: f32) {
        *self.agent.fitness_mut() += amount;
    }
}

/// Who flies in an episode
pub enum Roster<'a> {
    /// One bird per agent
    Population(Vec<&'a mut dyn Agent>),
    /// A single previously saved agent
    Replay(&'a mut dyn Agent),
}

impl<'a> Roster<'a> {
    pub fn len(&self) -> usize {
        match self {
            Roster::Population(agents) => agents.len(),
            Roster::Replay(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_contestants(self) -> Vec<Contestant<'a>> {
        match self {
            Roster::Population(agents) => agents
                .into_iter()
                .enumerate()
                .map(|(slot, agent)| Contestant::new(slot, agent))
                .collect(),
            Roster::Replay(agent) => vec![Contestant::new(0, agent)],
        }
    }
}

/// Per-episode parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeConfig {
    /// Generation number shown on the HUD
    pub generation: u32,
    /// Seed for pipe gap draws
    pub seed: u64,
    /// Episode stops once the score exceeds this
    pub score_cutoff: u32,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            generation: 0,
            seed: 0,
            score_cutoff: SCORE_CUTOFF,
        }
    }
}

/// Outcome of a finished (or aborted) episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeReport {
    pub generation: u32,
    pub reason: EndReason,
    pub score: u32,
    pub ticks: u64,
    pub survivors: usize,
    /// Roster slot of the first surviving bird when the cutoff was reached
    pub champion: Option<usize>,
}
