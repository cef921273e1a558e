//! Pipe pairs
//!
//! One pair is a top pipe hanging from above and a bottom pipe standing on the
//! floor with a fixed vertical gap between them. Pairs scroll left at a constant
//! speed while birds stay put horizontally.

use glam::IVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bird::Bird;
use super::sprites::Sprites;
use crate::consts::*;
use crate::round_to_pixel;

/// A top+bottom obstacle with a gap between them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipe {
    /// Left edge
    pub x: f32,
    /// y where the gap opens (lower end of the top pipe)
    pub height: f32,
    /// y of the top pipe sprite's upper-left corner
    pub top: f32,
    /// y of the bottom pipe sprite's upper-left corner
    pub bottom: f32,
    /// Set by the episode once a bird has cleared this pair
    pub passed: bool,
}

impl Pipe {
    /// New pair at `x` with a gap height drawn from `GAP_MIN..GAP_MAX`
    pub fn new<R: Rng + ?Sized>(x: f32, rng: &mut R, sprites: &Sprites) -> Self {
        let height = rng.random_range(GAP_MIN..GAP_MAX) as f32;
        Self::with_height(x, height, sprites)
    }

    /// New pair with an explicit gap height
    pub fn with_height(x: f32, height: f32, sprites: &Sprites) -> Self {
        Self {
            x,
            height,
            top: height - sprites.pipe_height(),
            bottom: height + PIPE_GAP,
            passed: false,
        }
    }

    /// Scroll one tick to the left
    pub fn advance(&mut self) {
        self.x -= PIPE_VELOCITY;
    }

    /// Right edge of the pair
    #[inline]
    pub fn right(&self, sprites: &Sprites) -> f32 {
        self.x + sprites.pipe_width()
    }

    /// Fully scrolled past the left edge of the field
    #[inline]
    pub fn is_off_screen(&self, sprites: &Sprites) -> bool {
        self.right(sprites) < 0.0
    }

    /// Pixel-exact test against the bird's current wing frame
    pub fn collide(&self, bird: &Bird, sprites: &Sprites) -> bool {
        let bird_mask = sprites.bird_mask(bird.frame);
        let bird_y = round_to_pixel(bird.y());
        let dx = (self.x - bird.x()) as i32;

        let top_offset = IVec2::new(dx, self.top as i32 - bird_y);
        let bottom_offset = IVec2::new(dx, self.bottom as i32 - bird_y);

        bird_mask.overlaps(sprites.pipe_bottom_mask(), bottom_offset)
            || bird_mask.overlaps(sprites.pipe_top_mask(), top_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_geometry_from_height() {
        let sprites = Sprites::standard();
        let pipe = Pipe::with_height(300.0, 200.0, &sprites);
        assert_eq!(pipe.top, 200.0 - PIPE_HEIGHT as f32);
        assert_eq!(pipe.bottom, 360.0);
        assert!(!pipe.passed);
    }

    #[test]
    fn test_removed_exactly_when_right_edge_leaves() {
        let sprites = Sprites::standard();
        let mut pipe = Pipe::with_height(SPAWN_PIPE_X, 200.0, &sprites);
        let mut ticks = 0;
        while !pipe.is_off_screen(&sprites) {
            pipe.advance();
            ticks += 1;
        }
        // ceil((600 + 104) / 5)
        assert_eq!(ticks, 141);
        assert_eq!(pipe.x, -105.0);

        let edge = Pipe::with_height(-(PIPE_WIDTH as f32), 200.0, &sprites);
        assert!(!edge.is_off_screen(&sprites));
    }

    #[test]
    fn test_bird_in_gap_is_clear() {
        let sprites = Sprites::standard();
        // Gap spans y 200..360; the 48px bird sits in the middle of it
        let pipe = Pipe::with_height(BIRD_START_X, 200.0, &sprites);
        let bird = Bird::new(BIRD_START_X, 256.0);
        assert!(!pipe.collide(&bird, &sprites));
    }

    #[test]
    fn test_bird_hits_top_and_bottom_pipe() {
        let sprites = Sprites::standard();
        let pipe = Pipe::with_height(BIRD_START_X, 200.0, &sprites);
        assert!(pipe.collide(&Bird::new(BIRD_START_X, 180.0), &sprites));
        assert!(pipe.collide(&Bird::new(BIRD_START_X, 340.0), &sprites));
    }

    #[test]
    fn test_transparent_corners_do_not_collide() {
        let sprites = Sprites::standard();
        // The bird's empty lower-right corner overlaps the pipe lip's upper-left
        // corner by a couple of pixels: boxes touch, pixels do not.
        let bird = Bird::new(100.0, 100.0);
        let pipe = Pipe::with_height(100.0 + BIRD_WIDTH as f32 - 3.0, 100.0 + BIRD_HEIGHT as f32 - 3.0 - PIPE_GAP, &sprites);
        assert_eq!(pipe.bottom, 145.0);
        assert!(!pipe.collide(&bird, &sprites));
    }

    #[test]
    fn test_far_pipe_never_collides() {
        let sprites = Sprites::standard();
        let pipe = Pipe::with_height(FIRST_PIPE_X, 50.0, &sprites);
        assert!(!pipe.collide(&Bird::new(BIRD_START_X, 0.0), &sprites));
    }

    proptest! {
        #[test]
        fn prop_gap_draws_in_range(seed in any::<u64>()) {
            let sprites = Sprites::standard();
            let mut rng = Pcg32::seed_from_u64(seed);
            let pipe = Pipe::new(SPAWN_PIPE_X, &mut rng, &sprites);
            prop_assert!(pipe.height >= GAP_MIN as f32 && pipe.height < GAP_MAX as f32);
            prop_assert_eq!(pipe.bottom - pipe.top, PIPE_GAP + PIPE_HEIGHT as f32);
        }
    }
}
