//! Frame snapshots and render sinks
//!
//! The episode publishes one [`Frame`] per tick. Sinks only read it; nothing
//! flows back into the simulation through this path.

use glam::Vec2;
use serde::Serialize;

/// Draw state of one bird
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BirdSprite {
    pub pos: Vec2,
    pub tilt: f32,
    pub frame: usize,
}

/// Draw state of one pipe pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PipeSprite {
    pub x: f32,
    pub top: f32,
    pub bottom: f32,
    /// Where the gap opens
    pub height: f32,
}

/// Everything a surface needs to draw one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub tick: u64,
    pub birds: Vec<BirdSprite>,
    pub pipes: Vec<PipeSprite>,
    /// Floor tile offsets
    pub floor: (f32, f32),
    pub floor_y: f32,
    pub score: u32,
    pub generation: u32,
    pub alive: usize,
    /// Pipe the agents are steering toward this tick
    pub target_pipe: Option<usize>,
}

/// Consumer of per-tick frames
pub trait RenderSink {
    fn present(&mut self, frame: &Frame);
}

/// Discards every frame (headless training)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn present(&mut self, _frame: &Frame) {}
}

/// Level of the headless HUD line; visible under the default `info` filter
pub const HUD_LEVEL: log::Level = log::Level::Info;

/// Logs a one-line HUD every `every` frames
#[derive(Debug, Clone)]
pub struct LogSink {
    every: u64,
    presented: u64,
}

impl LogSink {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            presented: 0,
        }
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl RenderSink for LogSink {
    fn present(&mut self, frame: &Frame) {
        self.presented += 1;
        if self.presented % self.every == 0 {
            log::log!(
                HUD_LEVEL,
                "gen {} tick {}: score {} alive {} pipes {}",
                frame.generation,
                frame.tick,
                frame.score,
                frame.alive,
                frame.pipes.len()
            );
        }
    }
}

/// Keeps every frame (tests and replays)
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub frames: Vec<Frame>,
}

impl RenderSink for RecordingSink {
    fn present(&mut self, frame: &Frame) {
        self.frames.push(frame.clone());
    }
}
