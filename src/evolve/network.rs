//! Feed-forward controller network

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::settings::EvolutionSettings;

/// Inputs a bird network reads (y, distance to gap top, distance to gap bottom)
pub const NUM_INPUTS: usize = 3;

/// Standard normal sample (Box-Muller)
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    let u1: f32 = rng.random_range(f32::EPSILON..1.0);
    let u2: f32 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (std::f32::consts::TAU * u2).cos()
}

/// Single-output tanh network with an optional hidden layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    inputs: usize,
    hidden: usize,
    /// Row-major: hidden x inputs, then 1 x hidden (or 1 x inputs when hidden is 0)
    weights: Vec<f32>,
    /// One per hidden neuron, then the output bias
    biases: Vec<f32>,
}

impl Network {
    /// All-zero network of the given shape
    pub fn zeroed(inputs: usize, hidden: usize) -> Self {
        let weights = if hidden == 0 {
            inputs
        } else {
            hidden * inputs + hidden
        };
        Self {
            inputs,
            hidden,
            weights: vec![0.0; weights],
            biases: vec![0.0; hidden + 1],
        }
    }

    /// Randomly initialized network
    pub fn random<R: Rng + ?Sized>(rng: &mut R, inputs: usize, hidden: usize, stdev: f32) -> Self {
        let mut net = Self::zeroed(inputs, hidden);
        for w in net.weights.iter_mut().chain(net.biases.iter_mut()) {
            *w = gaussian(rng) * stdev;
        }
        net
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn hidden(&self) -> usize {
        self.hidden
    }

    /// Number of tunable parameters
    pub fn genes(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    pub fn weights_mut(&mut self) -> &mut [f32] {
        &mut self.weights
    }

    pub fn biases_mut(&mut self) -> &mut [f32] {
        &mut self.biases
    }

    /// Forward pass; output in (-1, 1)
    pub fn activate(&self, inputs: &[f32]) -> f32 {
        debug_assert_eq!(inputs.len(), self.inputs);
        if self.hidden == 0 {
            let z: f32 = self.biases[0] + dot(&self.weights, inputs);
            return z.tanh();
        }

        let (layer1, layer2) = self.weights.split_at(self.hidden * self.inputs);
        let mut z = self.biases[self.hidden];
        for (h, row) in layer1.chunks_exact(self.inputs).enumerate() {
            let a = (self.biases[h] + dot(row, inputs)).tanh();
            z += layer2[h] * a;
        }
        z.tanh()
    }

    /// Perturb or re-draw each gene, then clamp
    pub fn mutate<R: Rng + ?Sized>(&mut self, rng: &mut R, settings: &EvolutionSettings) {
        let limit = settings.weight_limit;
        for gene in self.weights.iter_mut().chain(self.biases.iter_mut()) {
            let roll: f32 = rng.random();
            if roll < settings.replace_rate {
                *gene = gaussian(rng) * settings.init_stdev;
            } else if roll < settings.replace_rate + settings.mutate_rate {
                *gene += gaussian(rng) * settings.mutate_power;
            }
            *gene = gene.clamp(-limit, limit);
        }
    }

    /// Uniform crossover; both parents must share a shape
    pub fn crossover<R: Rng + ?Sized>(&self, other: &Network, rng: &mut R) -> Network {
        debug_assert_eq!((self.inputs, self.hidden), (other.inputs, other.hidden));
        let mut child = self.clone();
        let genes = child.weights.iter_mut().chain(child.biases.iter_mut());
        let donor = other.weights.iter().chain(other.biases.iter());
        for (gene, theirs) in genes.zip(donor) {
            if rng.random_bool(0.5) {
                *gene = *theirs;
            }
        }
        child
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_direct_network() {
        let mut net = Network::zeroed(NUM_INPUTS, 0);
        assert_eq!(net.genes(), 4);
        net.weights_mut().copy_from_slice(&[0.0, 1.0, -1.0]);
        net.biases_mut()[0] = 0.5;
        let out = net.activate(&[100.0, 0.25, 0.5]);
        assert!((out - 0.25f32.tanh()).abs() < 1e-6);
    }

    #[test]
    fn test_hidden_network() {
        let mut net = Network::zeroed(2, 2);
        assert_eq!(net.genes(), 2 * 2 + 2 + 3);
        // h0 = tanh(x0), h1 = tanh(x1), out = tanh(h0 - h1)
        net.weights_mut().copy_from_slice(&[1.0, 0.0, 0.0, 1.0, 1.0, -1.0]);
        let out = net.activate(&[1.0, 0.0]);
        assert!((out - 1.0f32.tanh().tanh()).abs() < 1e-6);
    }

    #[test]
    fn test_mutation_respects_limit() {
        let mut rng = Pcg32::seed_from_u64(3);
        let settings = EvolutionSettings {
            mutate_rate: 1.0,
            mutate_power: 100.0,
            weight_limit: 2.0,
            ..EvolutionSettings::default()
        };
        let mut net = Network::random(&mut rng, NUM_INPUTS, 3, 1.0);
        for _ in 0..20 {
            net.mutate(&mut rng, &settings);
        }
        assert!(net.weights.iter().chain(&net.biases).all(|w| w.abs() <= 2.0));
    }

    #[test]
    fn test_crossover_mixes_parents() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut a = Network::zeroed(NUM_INPUTS, 4);
        let mut b = Network::zeroed(NUM_INPUTS, 4);
        a.weights_mut().fill(1.0);
        b.weights_mut().fill(-1.0);
        let child = a.crossover(&b, &mut rng);
        assert!(child.weights.iter().all(|w| *w == 1.0 || *w == -1.0));
        assert!(child.weights.contains(&1.0) && child.weights.contains(&-1.0));
    }

    #[test]
    fn test_gaussian_is_centered() {
        let mut rng = Pcg32::seed_from_u64(1);
        let n = 10_000;
        let mean: f32 = (0..n).map(|_| gaussian(&mut rng)).sum::<f32>() / n as f32;
        assert!(mean.abs() < 0.05);
    }
}
