//! Painter-authored color bitmaps
//!
//! A map carries exactly two bitmaps, [`BmpIndex::Main`] and
//! [`BmpIndex::Vegetation`]. Each one owns a table of per-cell random numbers
//! generated once from its seed, so tile choices are reproducible for the same
//! seed and cell.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{MapError, Rgb};

/// Which of the two map bitmaps a rule or lookup refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BmpIndex {
    Main,
    Vegetation,
}

impl BmpIndex {
    pub const ALL: [BmpIndex; 2] = [BmpIndex::Main, BmpIndex::Vegetation];

    /// Map the numeric index used in rule files (`0` or `1`)
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(BmpIndex::Main),
            1 => Some(BmpIndex::Vegetation),
            _ => None,
        }
    }

    pub fn as_usize(self) -> usize {
        match self {
            BmpIndex::Main => 0,
            BmpIndex::Vegetation => 1,
        }
    }
}

/// A `width x height` grid of colors plus its seeded random table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
    seed: u64,
    rands: Vec<u32>,
}

impl Bitmap {
    /// Create an all-black bitmap
    pub fn new(width: u32, height: u32, seed: u64) -> Self {
        let size = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; size],
            seed,
            rands: generate_rands(size, seed),
        }
    }

    /// Create a bitmap from row-major pixels
    pub fn from_pixels(
        width: u32,
        height: u32,
        pixels: Vec<Rgb>,
        seed: u64,
    ) -> Result<Self, MapError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(MapError::PixelCount {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
            seed,
            rands: generate_rands(expected, seed),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.contains(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Color at `(x, y)`. Cells outside the bitmap read as black.
    pub fn pixel(&self, x: i32, y: i32) -> Rgb {
        self.index(x, y)
            .map(|idx| self.pixels[idx])
            .unwrap_or(Rgb::BLACK)
    }

    /// Paint one cell. Returns `false` if `(x, y)` is outside the bitmap.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) -> bool {
        match self.index(x, y) {
            Some(idx) => {
                self.pixels[idx] = color;
                true
            }
            None => false,
        }
    }

    /// Paint the inclusive rectangle `(x1, y1)..=(x2, y2)`, clamped to the bitmap
    pub fn fill_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgb) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let max_x = i32::try_from(self.width).unwrap_or(i32::MAX) - 1;
        let max_y = i32::try_from(self.height).unwrap_or(i32::MAX) - 1;
        for y in y1.max(0)..=y2.min(max_y) {
            for x in x1.max(0)..=x2.min(max_x) {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// The random number assigned to `(x, y)`. Cells outside the bitmap yield 0.
    pub fn rand(&self, x: i32, y: i32) -> u32 {
        self.index(x, y).map(|idx| self.rands[idx]).unwrap_or(0)
    }

    /// Resize to `width x height`, keeping the overlapping pixels.
    ///
    /// The seed is kept and the random table regenerated for the new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        let mut pixels = vec![Rgb::BLACK; width as usize * height as usize];
        for y in 0..height.min(self.height) {
            for x in 0..width.min(self.width) {
                let (x, y) = (x as usize, y as usize);
                pixels[y * width as usize + x] = self.pixels[y * self.width as usize + x];
            }
        }
        self.width = width;
        self.height = height;
        self.pixels = pixels;
        self.rands = generate_rands(self.pixels.len(), self.seed);
    }

    /// Replace the seed and regenerate the random table
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rands = generate_rands(self.pixels.len(), seed);
    }
}

/// Fill a row-major table of random numbers from `seed`
fn generate_rands(len: usize, seed: u64) -> Vec<u32> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bitmap_is_black() {
        let bmp = Bitmap::new(4, 3, 7);
        assert_eq!(bmp.pixels().len(), 12);
        assert!(bmp.pixels().iter().all(|c| c.is_black()));
    }

    #[test]
    fn test_rand_is_reproducible_per_seed() {
        let a = Bitmap::new(8, 8, 42);
        let b = Bitmap::new(8, 8, 42);
        let c = Bitmap::new(8, 8, 43);

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(a.rand(x, y), b.rand(x, y));
            }
        }
        assert!((0..8).any(|x| a.rand(x, 0) != c.rand(x, 0)));
    }

    #[test]
    fn test_resize_keeps_pixels_and_seed() {
        let mut bmp = Bitmap::new(3, 3, 9);
        bmp.set_pixel(1, 2, Rgb::new(0, 255, 0));
        bmp.set_pixel(2, 0, Rgb::new(255, 0, 0));

        bmp.resize(5, 4);
        assert_eq!(bmp.seed(), 9);
        assert_eq!(bmp.pixels().len(), 20);
        assert_eq!(bmp.pixel(1, 2), Rgb::new(0, 255, 0));
        assert_eq!(bmp.pixel(2, 0), Rgb::new(255, 0, 0));
        assert_eq!(bmp.rand(4, 3), Bitmap::new(5, 4, 9).rand(4, 3));

        bmp.resize(2, 2);
        assert_eq!(bmp.pixel(1, 2), Rgb::BLACK);
        assert_eq!(bmp.pixels().len(), 4);
    }

    #[test]
    fn test_from_pixels_size_beyond_u32() {
        let result = Bitmap::from_pixels(65_536, 65_536, Vec::new(), 0);
        assert!(matches!(
            result,
            Err(MapError::PixelCount { expected: 4_294_967_296, actual: 0, .. })
        ));
    }

    #[test]
    fn test_reseed_regenerates_table() {
        let mut bmp = Bitmap::new(8, 8, 1);
        let fresh = Bitmap::new(8, 8, 2);
        bmp.reseed(2);
        assert_eq!(bmp.seed(), 2);
        assert_eq!(bmp.rand(3, 5), fresh.rand(3, 5));
    }

    #[test]
    fn test_out_of_bounds_reads() {
        let mut bmp = Bitmap::new(2, 2, 0);
        assert!(bmp.set_pixel(1, 1, Rgb::new(1, 2, 3)));
        assert!(!bmp.set_pixel(2, 0, Rgb::new(1, 2, 3)));
        assert_eq!(bmp.pixel(-1, 0), Rgb::BLACK);
        assert_eq!(bmp.pixel(1, 1), Rgb::new(1, 2, 3));
        assert_eq!(bmp.rand(5, 5), 0);
    }

    #[test]
    fn test_fill_rect_clamps() {
        let mut bmp = Bitmap::new(3, 3, 0);
        let green = Rgb::new(0, 255, 0);
        bmp.fill_rect(-4, 1, 10, 1, green);
        assert_eq!(bmp.pixel(0, 1), green);
        assert_eq!(bmp.pixel(2, 1), green);
        assert!(bmp.pixel(0, 0).is_black());
        assert!(bmp.pixel(0, 2).is_black());
    }

    #[test]
    fn test_from_pixels_checks_length() {
        let err = Bitmap::from_pixels(2, 2, vec![Rgb::BLACK; 3], 0).unwrap_err();
        assert_eq!(
            err,
            MapError::PixelCount {
                width: 2,
                height: 2,
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_bmp_index_from_index() {
        assert_eq!(BmpIndex::from_index(0), Some(BmpIndex::Main));
        assert_eq!(BmpIndex::from_index(1), Some(BmpIndex::Vegetation));
        assert_eq!(BmpIndex::from_index(2), None);
    }
}
