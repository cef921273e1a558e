//! Bird kinematics
//!
//! Vertical motion uses the closed-form displacement since the last flap,
//! `d = v*t + a*t^2/2`, evaluated once per tick. Displacement is clamped to a
//! terminal magnitude and upward motion gets a small extra lift, which gives the
//! sharp "flap up, fall while nosing down" arc.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// The controllable entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bird {
    /// Top-left corner of the sprite; x never changes during an episode
    pub pos: Vec2,
    /// Velocity set by the last flap
    pub vel: f32,
    /// Ticks since the last flap
    pub tick_count: u32,
    /// y at the last flap
    pub height: f32,
    /// Degrees, positive is nose up
    pub tilt: f32,
    /// Wing animation phase
    pub img_count: u32,
    /// Current wing frame
    pub frame: usize,
}

impl Bird {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            vel: 0.0,
            tick_count: 0,
            height: y,
            tilt: 0.0,
            img_count: 0,
            frame: 0,
        }
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.pos.y
    }

    /// Flap: restart the arc from the current height
    pub fn jump(&mut self) {
        self.vel = JUMP_VELOCITY;
        self.tick_count = 0;
        self.height = self.pos.y;
    }

    /// Displacement for the next tick without applying it
    pub fn next_displacement(&self) -> f32 {
        displacement(self.vel, self.tick_count + 1)
    }

    /// Integrate one tick; returns the applied displacement
    pub fn advance(&mut self) -> f32 {
        self.tick_count += 1;
        let d = displacement(self.vel, self.tick_count);
        self.pos.y += d;

        if d < 0.0 || self.pos.y < self.height + TILT_HOLD_OFFSET {
            if self.tilt < MAX_ROTATION {
                self.tilt = MAX_ROTATION;
            }
        } else {
            self.tilt = (self.tilt - ROTATION_VELOCITY).max(MIN_ROTATION);
        }
        d
    }

    /// Step the wing animation; frames run 0, 1, 2, 1, 0 with each held for
    /// `ANIMATION_TIME` ticks. A nose-diving bird stops flapping.
    pub fn animate(&mut self) -> usize {
        self.img_count += 1;

        let t = ANIMATION_TIME;
        self.frame = if self.img_count <= t {
            0
        } else if self.img_count <= t * 2 {
            1
        } else if self.img_count <= t * 3 {
            2
        } else if self.img_count <= t * 4 {
            1
        } else {
            self.img_count = 0;
            0
        };

        if self.tilt <= -80.0 {
            self.frame = 1;
            self.img_count = t * 2;
        }
        self.frame
    }
}

/// Clamped displacement `t` ticks into an arc that started with velocity `vel`
pub fn displacement(vel: f32, t: u32) -> f32 {
    let t = t as f32;
    let d = (vel * t + 0.5 * GRAVITY * t * t).clamp(-TERMINAL_DISPLACEMENT, TERMINAL_DISPLACEMENT);
    if d < 0.0 { d - UPWARD_BIAS } else { d }
}
