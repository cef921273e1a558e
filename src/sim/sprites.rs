//! Built-in sprite art
//!
//! The game ships its sprites as procedurally painted RGBA buffers so the
//! simulation has no asset files to load. The silhouettes carry transparent
//! padding like the classic art does, which is why collisions go through
//! [`Mask`](super::mask::Mask) instead of bounding boxes.

use crate::consts::*;

use super::mask::Mask;

/// Number of wing frames in the bird animation
pub const BIRD_FRAMES: usize = 3;

/// A straight RGBA image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Sprite {
    /// Fully transparent sprite
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 0]; (width * height) as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at (x, y); out of range reads as transparent
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0, 0];
        }
        self.pixels[(y * self.width + x) as usize]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = rgba;
        }
    }

    /// Fill an axis-aligned rectangle, clipped to the sprite
    pub fn fill_rect(&mut self, x0: u32, y0: u32, w: u32, h: u32, rgba: [u8; 4]) {
        for y in y0..(y0 + h).min(self.height) {
            for x in x0..(x0 + w).min(self.width) {
                self.set_pixel(x, y, rgba);
            }
        }
    }

    /// Fill an ellipse centered at (cx, cy) with radii (rx, ry)
    pub fn fill_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, rgba: [u8; 4]) {
        for y in 0..self.height {
            for x in 0..self.width {
                let nx = (x as f32 + 0.5 - cx) / rx;
                let ny = (y as f32 + 0.5 - cy) / ry;
                if nx * nx + ny * ny <= 1.0 {
                    self.set_pixel(x, y, rgba);
                }
            }
        }
    }

    /// Mirror top to bottom
    pub fn flipped_vertical(&self) -> Self {
        let mut out = Sprite::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.set_pixel(x, self.height - 1 - y, self.pixel(x, y));
            }
        }
        out
    }
}

const BIRD_BODY: [u8; 4] = [0xf7, 0xd3, 0x2c, 0xff];
const BIRD_WING: [u8; 4] = [0xfa, 0xf0, 0xc8, 0xff];
const BIRD_BEAK: [u8; 4] = [0xf5, 0x6b, 0x1d, 0xff];
const PIPE_BODY: [u8; 4] = [0x5a, 0xb9, 0x32, 0xff];
const PIPE_LIP: [u8; 4] = [0x4a, 0x9c, 0x28, 0xff];
const FLOOR_DIRT: [u8; 4] = [0xde, 0xd8, 0x95, 0xff];
const FLOOR_GRASS: [u8; 4] = [0x73, 0xbf, 0x2e, 0xff];

/// Height of the wide lip at the open end of a pipe
const PIPE_LIP_HEIGHT: u32 = 46;
/// Horizontal inset of the pipe shaft from the lip edges
const PIPE_SHAFT_INSET: u32 = 6;

fn paint_bird(wing_dy: f32) -> Sprite {
    let mut sprite = Sprite::new(BIRD_WIDTH, BIRD_HEIGHT);
    sprite.fill_ellipse(32.0, 25.0, 22.0, 16.0, BIRD_BODY);
    // Beak
    for row in 0..6 {
        sprite.fill_rect(52, 23 + row, 12 - row * 2, 1, BIRD_BEAK);
    }
    // The wing pokes out past the back of the body so each frame has its own mask
    sprite.fill_ellipse(20.0, 25.0 + wing_dy, 12.0, 6.0, BIRD_WING);
    sprite
}

fn paint_pipe() -> Sprite {
    let mut sprite = Sprite::new(PIPE_WIDTH, PIPE_HEIGHT);
    sprite.fill_rect(0, 0, PIPE_WIDTH, PIPE_LIP_HEIGHT, PIPE_LIP);
    sprite.fill_rect(
        PIPE_SHAFT_INSET,
        PIPE_LIP_HEIGHT,
        PIPE_WIDTH - 2 * PIPE_SHAFT_INSET,
        PIPE_HEIGHT - PIPE_LIP_HEIGHT,
        PIPE_BODY,
    );
    sprite
}

fn paint_floor() -> Sprite {
    let mut sprite = Sprite::new(FLOOR_WIDTH, FLOOR_HEIGHT);
    sprite.fill_rect(0, 0, FLOOR_WIDTH, 16, FLOOR_GRASS);
    sprite.fill_rect(0, 16, FLOOR_WIDTH, FLOOR_HEIGHT - 16, FLOOR_DIRT);
    sprite
}

/// All sprites plus their collision masks, built once per session
#[derive(Debug, Clone)]
pub struct Sprites {
    pub bird: [Sprite; BIRD_FRAMES],
    pub pipe_top: Sprite,
    pub pipe_bottom: Sprite,
    pub floor: Sprite,
    bird_masks: [Mask; BIRD_FRAMES],
    pipe_top_mask: Mask,
    pipe_bottom_mask: Mask,
}

impl Sprites {
    /// Paint the standard sprite set
    pub fn standard() -> Self {
        let bird = [paint_bird(-8.0), paint_bird(0.0), paint_bird(8.0)];
        let pipe_bottom = paint_pipe();
        let pipe_top = pipe_bottom.flipped_vertical();
        Self::from_sprites(bird, pipe_top, pipe_bottom, paint_floor())
    }

    /// Build a set from caller-supplied art
    pub fn from_sprites(
        bird: [Sprite; BIRD_FRAMES],
        pipe_top: Sprite,
        pipe_bottom: Sprite,
        floor: Sprite,
    ) -> Self {
        let bird_masks = [
            Mask::from_sprite(&bird[0]),
            Mask::from_sprite(&bird[1]),
            Mask::from_sprite(&bird[2]),
        ];
        let pipe_top_mask = Mask::from_sprite(&pipe_top);
        let pipe_bottom_mask = Mask::from_sprite(&pipe_bottom);
        Self {
            bird,
            pipe_top,
            pipe_bottom,
            floor,
            bird_masks,
            pipe_top_mask,
            pipe_bottom_mask,
        }
    }

    /// Mask of a bird wing frame (index wraps)
    pub fn bird_mask(&self, frame: usize) -> &Mask {
        &self.bird_masks[frame % BIRD_FRAMES]
    }

    pub fn pipe_top_mask(&self) -> &Mask {
        &self.pipe_top_mask
    }

    pub fn pipe_bottom_mask(&self) -> &Mask {
        &self.pipe_bottom_mask
    }

    pub fn bird_height(&self) -> f32 {
        self.bird[0].height() as f32
    }

    pub fn pipe_width(&self) -> f32 {
        self.pipe_top.width() as f32
    }

    pub fn pipe_height(&self) -> f32 {
        self.pipe_top.height() as f32
    }

    pub fn floor_width(&self) -> f32 {
        self.floor.width() as f32
    }
}

impl Default for Sprites {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_dimensions() {
        let sprites = Sprites::standard();
        for frame in &sprites.bird {
            assert_eq!((frame.width(), frame.height()), (BIRD_WIDTH, BIRD_HEIGHT));
        }
        assert_eq!(sprites.pipe_width(), PIPE_WIDTH as f32);
        assert_eq!(sprites.pipe_height(), PIPE_HEIGHT as f32);
        assert_eq!(sprites.floor_width(), FLOOR_WIDTH as f32);
    }

    #[test]
    fn test_bird_has_transparent_padding() {
        let sprites = Sprites::standard();
        let bird = &sprites.bird[1];
        // Corners are empty, the body center is opaque
        assert_eq!(bird.pixel(0, 0)[3], 0);
        assert_eq!(bird.pixel(BIRD_WIDTH - 1, BIRD_HEIGHT - 1)[3], 0);
        assert_eq!(bird.pixel(32, 25)[3], 0xff);
    }

    #[test]
    fn test_top_pipe_is_flipped_bottom_pipe() {
        let sprites = Sprites::standard();
        // Bottom pipe: lip at row 0 spans the full width
        assert_eq!(sprites.pipe_bottom.pixel(0, 0)[3], 0xff);
        assert_eq!(sprites.pipe_bottom.pixel(0, PIPE_HEIGHT - 1)[3], 0);
        // Top pipe: lip at the last row
        assert_eq!(sprites.pipe_top.pixel(0, PIPE_HEIGHT - 1)[3], 0xff);
        assert_eq!(sprites.pipe_top.pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_wing_frames_differ() {
        let sprites = Sprites::standard();
        assert_ne!(sprites.bird[0], sprites.bird[2]);
        assert_ne!(sprites.bird_mask(0), sprites.bird_mask(2));
    }
}
