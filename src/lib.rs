//! Flappy Neuro - a side-scrolling flappy bird clone that learns to play itself
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, pipes, masks, episode loop)
//! - `evolve`: Population-based neuroevolution of feed-forward controllers
//! - `persistence`: Versioned save/load of the best agent
//! - `platform`: Pacing, cancellation, keyboard input and the terminal surface
//! - `render`: Frame snapshots and render sinks
//! - `logging`: Logger target selection
//! - `session`: Wires the above into train / replay / play runs

pub mod evolve;
pub mod logging;
pub mod persistence;
pub mod platform;
pub mod render;
pub mod session;
pub mod settings;
pub mod sim;

pub use settings::{EvolutionSettings, Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Simulation rate when paced against the wall clock
    pub const TICK_RATE: u32 = 100;

    /// Playfield dimensions
    pub const WIN_WIDTH: f32 = 600.0;
    pub const WIN_HEIGHT: f32 = 800.0;
    /// Ground line; birds whose lower edge reaches it are eliminated
    pub const FLOOR_Y: f32 = 730.0;
    /// Birds above this y have left the field through the top
    pub const CEILING_Y: f32 = -50.0;
    /// Transparent padding below the bird silhouette ignored by the ground check
    pub const GROUND_INSET: f32 = 10.0;

    /// Bird defaults
    pub const BIRD_START_X: f32 = 230.0;
    pub const BIRD_START_Y: f32 = 350.0;
    pub const JUMP_VELOCITY: f32 = -10.5;
    /// Downward acceleration in the closed-form displacement
    pub const GRAVITY: f32 = 3.0;
    pub const TERMINAL_DISPLACEMENT: f32 = 16.0;
    /// Extra lift applied to upward displacement to sharpen the arc
    pub const UPWARD_BIAS: f32 = 2.0;
    /// Bird keeps its nose up until it sinks this far below its jump height
    pub const TILT_HOLD_OFFSET: f32 = 50.0;
    pub const MAX_ROTATION: f32 = 25.0;
    pub const MIN_ROTATION: f32 = -90.0;
    pub const ROTATION_VELOCITY: f32 = 20.0;
    /// Ticks each wing frame is held
    pub const ANIMATION_TIME: u32 = 5;

    /// Pipe defaults
    pub const PIPE_GAP: f32 = 160.0;
    pub const PIPE_VELOCITY: f32 = 5.0;
    /// Gap height is drawn uniformly from `GAP_MIN..GAP_MAX`
    pub const GAP_MIN: i32 = 50;
    pub const GAP_MAX: i32 = 450;
    pub const FIRST_PIPE_X: f32 = 700.0;
    pub const SPAWN_PIPE_X: f32 = WIN_WIDTH;

    /// Floor scroll speed
    pub const FLOOR_VELOCITY: f32 = 5.0;

    /// Sprite dimensions (pixels)
    pub const BIRD_WIDTH: u32 = 68;
    pub const BIRD_HEIGHT: u32 = 48;
    pub const PIPE_WIDTH: u32 = 104;
    pub const PIPE_HEIGHT: u32 = 640;
    pub const FLOOR_WIDTH: u32 = 672;
    pub const FLOOR_HEIGHT: u32 = 224;

    /// Fitness shaping
    pub const SURVIVAL_REWARD: f32 = 0.1;
    pub const COLLISION_PENALTY: f32 = 1.0;
    pub const PASS_REWARD: f32 = 5.0;
    /// Agent outputs above this value flap
    pub const FLAP_THRESHOLD: f32 = 0.5;
    /// Episodes end once the score exceeds this value
    pub const SCORE_CUTOFF: u32 = 25;
}

/// Round to the nearest pixel, ties to even
#[inline]
pub fn round_to_pixel(value: f32) -> i32 {
    value.round_ties_even() as i32
}
