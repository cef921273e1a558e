//! Pixel-exact collision masks
//!
//! A mask is the opaque footprint of a sprite, one bit per pixel. Two masks
//! collide when any set bit of one lands on a set bit of the other once the
//! second mask is shifted by an integer offset.

use glam::IVec2;

use super::sprites::Sprite;

/// Alpha values above this count as opaque
pub const ALPHA_THRESHOLD: u8 = 127;

const WORD_BITS: u32 = 64;

/// Bit-packed occupancy mask (row-major, 64 pixels per word)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl Mask {
    /// Empty mask of the given size
    pub fn new(width: u32, height: u32) -> Self {
        let words_per_row = width.div_ceil(WORD_BITS) as usize;
        Self {
            width,
            height,
            words_per_row,
            bits: vec![0; words_per_row * height as usize],
        }
    }

    /// Opaque footprint of a sprite
    pub fn from_sprite(sprite: &Sprite) -> Self {
        let mut mask = Self::new(sprite.width(), sprite.height());
        for y in 0..sprite.height() {
            for x in 0..sprite.width() {
                if sprite.pixel(x, y)[3] > ALPHA_THRESHOLD {
                    mask.set(x, y, true);
                }
            }
        }
        mask
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> (usize, u32) {
        let word = y as usize * self.words_per_row + (x / WORD_BITS) as usize;
        (word, x % WORD_BITS)
    }

    /// Bit at (x, y); out of range reads as clear
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let (word, bit) = self.index(x, y);
        self.bits[word] >> bit & 1 == 1
    }

    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let (word, bit) = self.index(x, y);
        if value {
            self.bits[word] |= 1 << bit;
        } else {
            self.bits[word] &= !(1 << bit);
        }
    }

    /// Number of set bits
    pub fn count(&self) -> u32 {
        self.bits.iter().map(|w| w.count_ones()).sum()
    }

    /// First overlapping pixel with `other` placed at `offset`
    ///
    /// The offset is `other`'s top-left corner in this mask's coordinates and
    /// the returned point is in this mask's coordinates too. Rows are scanned
    /// top to bottom, then columns left to right.
    pub fn overlap(&self, other: &Mask, offset: IVec2) -> Option<IVec2> {
        let x_start = offset.x.max(0);
        let y_start = offset.y.max(0);
        let x_end = (offset.x + other.width as i32).min(self.width as i32);
        let y_end = (offset.y + other.height as i32).min(self.height as i32);
        if x_start >= x_end || y_start >= y_end {
            return None;
        }

        for y in y_start..y_end {
            let oy = (y - offset.y) as u32;
            for x in (x_start..x_end).step_by(WORD_BITS as usize) {
                let hits = self.window(y as u32, x) & other.window(oy, x - offset.x);
                if hits != 0 {
                    return Some(IVec2::new(x + hits.trailing_zeros() as i32, y));
                }
            }
        }
        None
    }

    /// 64 pixels of row `y` starting at column `start`, bit 0 first
    ///
    /// Columns outside the mask read as clear.
    fn window(&self, y: u32, start: i32) -> u64 {
        if start >= self.width as i32 || start <= -(WORD_BITS as i32) {
            return 0;
        }
        let row = y as usize * self.words_per_row;
        if start < 0 {
            return self.bits[row] << -start as u32;
        }
        let word = start as usize / WORD_BITS as usize;
        let bit = start as u32 % WORD_BITS;
        let low = self.bits[row + word] >> bit;
        if bit == 0 || word + 1 >= self.words_per_row {
            low
        } else {
            low | self.bits[row + word + 1] << (WORD_BITS - bit)
        }
    }

    /// Whether any opaque pixels overlap at `offset`
    #[inline]
    pub fn overlaps(&self, other: &Mask, offset: IVec2) -> bool {
        self.overlap(other, offset).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ring(size: u32) -> Mask {
        // Square outline with a hollow center
        let mut mask = Mask::new(size, size);
        for i in 0..size {
            mask.set(i, 0, true);
            mask.set(i, size - 1, true);
            mask.set(0, i, true);
            mask.set(size - 1, i, true);
        }
        mask
    }

    fn block(w: u32, h: u32) -> Mask {
        let mut mask = Mask::new(w, h);
        for y in 0..h {
            for x in 0..w {
                mask.set(x, y, true);
            }
        }
        mask
    }

    #[test]
    fn test_from_sprite_uses_alpha_threshold() {
        let mut sprite = Sprite::new(4, 1);
        sprite.set_pixel(0, 0, [255, 0, 0, 255]);
        sprite.set_pixel(1, 0, [255, 0, 0, 128]);
        sprite.set_pixel(2, 0, [255, 0, 0, 127]);
        let mask = Mask::from_sprite(&sprite);
        assert!(mask.get(0, 0));
        assert!(mask.get(1, 0));
        assert!(!mask.get(2, 0));
        assert!(!mask.get(3, 0));
        assert_eq!(mask.count(), 2);
    }

    #[test]
    fn test_wide_masks_span_words() {
        let mut mask = Mask::new(130, 2);
        mask.set(63, 1, true);
        mask.set(64, 1, true);
        mask.set(129, 0, true);
        assert!(mask.get(63, 1) && mask.get(64, 1) && mask.get(129, 0));
        assert!(!mask.get(65, 1));
        assert_eq!(mask.count(), 3);
        mask.set(64, 1, false);
        assert_eq!(mask.count(), 2);
    }

    #[test]
    fn test_bounding_boxes_overlap_but_pixels_do_not() {
        // A small block sitting inside the hollow of a ring
        let outer = ring(20);
        let inner = block(4, 4);
        assert!(!outer.overlaps(&inner, IVec2::new(8, 8)));
        // Slide it onto the ring wall
        assert!(outer.overlaps(&inner, IVec2::new(17, 8)));
    }

    #[test]
    fn test_overlap_reports_first_point_in_self_coordinates() {
        let a = block(10, 10);
        let b = block(3, 3);
        assert_eq!(a.overlap(&b, IVec2::new(-1, 4)), Some(IVec2::new(0, 4)));
        assert_eq!(a.overlap(&b, IVec2::new(10, 0)), None);
        assert_eq!(a.overlap(&b, IVec2::new(0, -3)), None);
    }

    fn speckled(w: u32, h: u32, step: u32) -> Mask {
        let mut mask = Mask::new(w, h);
        for y in 0..h {
            for x in 0..w {
                mask.set(x, y, (x * 7 + y * 13) % step == 0);
            }
        }
        mask
    }

    /// Pixel-by-pixel reference scan
    fn first_overlap_by_pixel(a: &Mask, b: &Mask, offset: IVec2) -> Option<IVec2> {
        (0..a.height() as i32)
            .flat_map(|y| (0..a.width() as i32).map(move |x| IVec2::new(x, y)))
            .find(|p| {
                let o = *p - offset;
                o.x >= 0 && o.y >= 0 && a.get(p.x as u32, p.y as u32) && b.get(o.x as u32, o.y as u32)
            })
    }

    #[test]
    fn test_overlap_across_word_boundaries() {
        let mut a = Mask::new(200, 1);
        a.set(127, 0, true);
        a.set(128, 0, true);
        let mut b = Mask::new(70, 1);
        b.set(69, 0, true);
        assert_eq!(a.overlap(&b, IVec2::new(58, 0)), Some(IVec2::new(127, 0)));
        assert_eq!(a.overlap(&b, IVec2::new(59, 0)), Some(IVec2::new(128, 0)));
        assert_eq!(a.overlap(&b, IVec2::new(60, 0)), None);
        // Partly off the left edge
        assert_eq!(b.overlap(&a, IVec2::new(-58, 0)), Some(IVec2::new(69, 0)));
    }

    proptest! {
        #[test]
        fn prop_overlap_matches_pixel_scan(dx in -100i32..160, dy in -12i32..12) {
            let a = speckled(150, 9, 11);
            let b = speckled(90, 7, 17);
            let offset = IVec2::new(dx, dy);
            prop_assert_eq!(a.overlap(&b, offset), first_overlap_by_pixel(&a, &b, offset));
        }

        #[test]
        fn prop_overlap_is_symmetric(dx in -12i32..12, dy in -12i32..12) {
            let a = ring(9);
            let b = block(3, 5);
            prop_assert_eq!(
                a.overlaps(&b, IVec2::new(dx, dy)),
                b.overlaps(&a, IVec2::new(-dx, -dy))
            );
        }

        #[test]
        fn prop_empty_mask_never_overlaps(dx in -20i32..20, dy in -20i32..20) {
            let a = block(8, 8);
            let empty = Mask::new(8, 8);
            prop_assert!(!a.overlaps(&empty, IVec2::new(dx, dy)));
        }
    }
}
