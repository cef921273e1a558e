//! Neuroevolution engine
//!
//! A fixed-topology cousin of NEAT: every genome is a small feed-forward
//! network with the same shape, and generations improve through selection,
//! crossover and weight mutation only.

pub mod network;
pub mod population;

pub use network::{Network, gaussian};
pub use population::{GenerationStats, Genome, Population};
