//! Platform layer
//!
//! Handles everything outside the deterministic simulation:
//! - Tick pacing against the wall clock
//! - Cooperative quit signalling
//! - Keyboard input for manual play
//! - The terminal surface

pub mod clock;
pub mod input;
pub mod terminal;

pub use clock::TickClock;
pub use input::{FlapButton, ManualAgent, QuitSignal};
pub use terminal::TerminalSurface;

use crate::render::{Frame, LogSink, NullSink, RecordingSink, RenderSink};

/// A render sink that may also pump platform events once per tick
pub trait Surface: RenderSink {
    /// Drain pending window/keyboard events
    fn pump(&mut self) {}

    /// Whether ticks should be paced to the real-time tick rate
    fn paced(&self) -> bool {
        false
    }
}

impl Surface for NullSink {}
impl Surface for LogSink {}
impl Surface for RecordingSink {}

/// Wraps any sink and paces it in real time
#[derive(Debug, Clone)]
pub struct Paced<S>(pub S);

impl<S: RenderSink> RenderSink for Paced<S> {
    fn present(&mut self, frame: &Frame) {
        self.0.present(frame);
    }
}

impl<S: RenderSink> Surface for Paced<S> {
    fn paced(&self) -> bool {
        true
    }
}
