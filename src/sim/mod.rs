//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Fixed tick, no wall-clock time
//! - Seeded RNG only
//! - Stable iteration order (roster order)
//! - No terminal or window dependencies

pub mod agent;
pub mod bird;
pub mod floor;
pub mod mask;
pub mod pipe;
pub mod sprites;
pub mod state;
pub mod tick;

pub use agent::{Agent, Observation, ScriptedAgent};
pub use bird::{Bird, displacement};
pub use floor::Floor;
pub use mask::Mask;
pub use pipe::Pipe;
pub use sprites::{Sprite, Sprites};
pub use state::{Contestant, EndReason, EpisodeConfig, EpisodeReport, Phase, Roster};
pub use tick::Episode;
