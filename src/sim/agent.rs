//! Agent interface
//!
//! Whatever flies a bird (an evolved network, a keyboard, a test script)
//! implements [`Agent`]: it maps an [`Observation`] to a flap signal and exposes
//! the fitness accumulator the episode rewards and penalizes.

use serde::{Deserialize, Serialize};

/// What a bird sees each tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Bird's y (top of sprite)
    pub y: f32,
    /// Vertical distance to where the target gap opens
    pub gap_top_distance: f32,
    /// Vertical distance to the top of the target bottom pipe
    pub gap_bottom_distance: f32,
}

impl Observation {
    pub fn new(y: f32, gap_height: f32, gap_bottom: f32) -> Self {
        Self {
            y,
            gap_top_distance: (y - gap_height).abs(),
            gap_bottom_distance: (y - gap_bottom).abs(),
        }
    }

    /// Network input vector
    #[inline]
    pub fn as_inputs(&self) -> [f32; 3] {
        [self.y, self.gap_top_distance, self.gap_bottom_distance]
    }
}

/// A bird controller with a fitness accumulator
pub trait Agent {
    /// Flap signal; values above `FLAP_THRESHOLD` flap
    fn decide(&mut self, observation: &Observation) -> f32;

    /// Fitness accumulator the episode adds rewards to
    fn fitness_mut(&mut self) -> &mut f32;

    fn fitness(&self) -> f32;
}

/// Agent driven by a closure
pub struct ScriptedAgent<F> {
    policy: F,
    pub fitness: f32,
}

impl<F> ScriptedAgent<F>
where
    F: FnMut(&Observation) -> f32,
{
    pub fn new(policy: F) -> Self {
        Self {
            policy,
            fitness: 0.0,
        }
    }
}

impl<F> Agent for ScriptedAgent<F>
where
    F: FnMut(&Observation) -> f32,
{
    fn decide(&mut self, observation: &Observation) -> f32 {
        (self.policy)(observation)
    }

    fn fitness_mut(&mut self) -> &mut f32 {
        &mut self.fitness
    }

    fn fitness(&self) -> f32 {
        self.fitness
    }
}

/// Agent that never flaps
pub fn idle() -> ScriptedAgent<impl FnMut(&Observation) -> f32> {
    ScriptedAgent::new(|_: &Observation| 0.0)
}
