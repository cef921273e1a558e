//! Scrolling floor
//!
//! Two copies of the floor tile placed side by side; whichever scrolls fully off
//! the left edge jumps to the right of the other. Purely cosmetic apart from
//! anchoring the ground line.

use serde::{Deserialize, Serialize};

use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub y: f32,
    pub x1: f32,
    pub x2: f32,
    width: f32,
}

impl Floor {
    pub fn new(y: f32, width: f32) -> Self {
        Self {
            y,
            x1: 0.0,
            x2: width,
            width,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn advance(&mut self) {
        self.x1 -= FLOOR_VELOCITY;
        self.x2 -= FLOOR_VELOCITY;

        if self.x1 + self.width < 0.0 {
            self.x1 = self.x2 + self.width;
        }
        if self.x2 + self.width < 0.0 {
            self.x2 = self.x1 + self.width;
        }
    }
}

impl Default for Floor {
    fn default() -> Self {
        Self::new(FLOOR_Y, FLOOR_WIDTH as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiles_stay_adjacent() {
        let mut floor = Floor::default();
        for _ in 0..1000 {
            floor.advance();
            assert_eq!((floor.x1 - floor.x2).abs(), floor.width());
            // The visible area [0, WIN_WIDTH) is always covered
            let left = floor.x1.min(floor.x2);
            assert!(left <= 0.0 && left + 2.0 * floor.width() >= WIN_WIDTH);
        }
    }

    #[test]
    fn test_wraps_after_full_tile() {
        let mut floor = Floor::new(FLOOR_Y, 10.0);
        // 0 -> -5 -> -10 -> -15 (wrap to the right of x2)
        floor.advance();
        floor.advance();
        assert_eq!((floor.x1, floor.x2), (-10.0, 0.0));
        floor.advance();
        assert_eq!((floor.x1, floor.x2), (5.0, -5.0));
    }
}
