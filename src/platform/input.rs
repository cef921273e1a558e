//! Shared input flags
//!
//! The surface thread of control and the simulation talk through two atomic
//! flags: a quit request and a one-shot flap button.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::sim::{Agent, Observation};

/// Cooperative cancellation, checked once per tick
#[derive(Debug, Clone, Default)]
pub struct QuitSignal(Arc<AtomicBool>);

impl QuitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Latched flap request; reading it clears it
#[derive(Debug, Clone, Default)]
pub struct FlapButton(Arc<AtomicBool>);

impl FlapButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// Agent flown from the keyboard
#[derive(Debug, Clone, Default)]
pub struct ManualAgent {
    button: FlapButton,
    fitness: f32,
}

impl ManualAgent {
    pub fn new(button: FlapButton) -> Self {
        Self {
            button,
            fitness: 0.0,
        }
    }
}

impl Agent for ManualAgent {
    fn decide(&mut self, _observation: &Observation) -> f32 {
        if self.button.take() { 1.0 } else { 0.0 }
    }

    fn fitness_mut(&mut self) -> &mut f32 {
        &mut self.fitness
    }

    fn fitness(&self) -> f32 {
        self.fitness
    }
}
