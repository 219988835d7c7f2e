//! Owned RGBA pixel image: the render target and texture type.
//!
//! Pixels live in a 64-byte aligned [`Buffer<Color>`] in row-major order.
//! The image caches its inclusive pixel bounding box so draw calls can clip
//! against it without recomputing.

use std::path::Path;

use crate::blend::BlendMode;
use crate::buffer::Buffer;
use crate::codec::{ImageCodec, PngCodec};
use crate::color::Color;
use crate::error::{Error, Result};
use crate::geometry::Aabb;
use trueno::{Backend, Vector};

/// Policy for texel coordinates outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressMode {
    /// Repeat the image (`x mod width`).
    Wrap,
    /// Repeat, flipping every other tile.
    Mirror,
    /// Saturate to the border texel.
    #[default]
    Clamp,
}

impl AddressMode {
    /// Map `coord` into `[0, size)`. `size` must be positive.
    #[inline]
    #[must_use]
    pub fn resolve(self, coord: i32, size: i32) -> i32 {
        debug_assert!(size > 0);
        match self {
            Self::Wrap => {
                if size & (size - 1) == 0 {
                    coord & (size - 1)
                } else {
                    coord.rem_euclid(size)
                }
            }
            Self::Mirror => {
                let tile = coord.div_euclid(size);
                let offset = coord.rem_euclid(size);
                if tile & 1 == 0 {
                    offset
                } else {
                    size - 1 - offset
                }
            }
            Self::Clamp => coord.clamp(0, size - 1),
        }
    }
}

/// Presentation collaborator: receives tightly described RGBA8 rows.
pub trait Surface {
    /// Copy `height` rows of `width` RGBA8 pixels, `pitch` bytes apart.
    fn present(&mut self, pixels: &[u8], pitch: usize, width: u32, height: u32);
}

/// RGBA image with a cached clip box.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Width in pixels.
    width: u32,
    /// Height in pixels.
    height: u32,
    /// Pixels in row-major order.
    pixels: Buffer<Color>,
    /// `[(0,0,0), (w-1,h-1,0)]`, invalid for an empty image.
    aabb: Aabb,
}

impl Default for Image {
    fn default() -> Self {
        Self::empty()
    }
}

impl Image {
    /// Create a 0x0 image.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            pixels: Buffer::new(),
            aabb: Aabb::EMPTY,
        }
    }

    /// Create an image cleared to transparent black.
    ///
    /// # Example
    ///
    /// ```
    /// use pixelcore::image::Image;
    ///
    /// let img = Image::new(800, 600);
    /// assert_eq!(img.width(), 800);
    /// assert_eq!(img.height(), 600);
    /// ```
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Color::TRANSPARENT)
    }

    /// Create an image with every pixel set to `color`.
    ///
    /// Allocation failure is fatal.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: Buffer::filled(pixel_count(width, height), color),
            aabb: Aabb::from_size(width, height),
        }
    }

    /// Fallible variant of [`Image::filled`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the pixel buffer cannot be
    /// allocated.
    pub fn try_new(width: u32, height: u32, color: Color) -> Result<Self> {
        Ok(Self {
            width,
            height,
            pixels: Buffer::try_filled(pixel_count(width, height), color)?,
            aabb: Aabb::from_size(width, height),
        })
    }

    /// Build an image from interleaved R, G, B, A bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLengthMismatch`] if `data` is not exactly
    /// `width * height * 4` bytes.
    pub fn from_rgba8(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        let expected = pixel_count(width, height) * 4;
        if data.len() != expected {
            return Err(Error::DataLengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        let mut image = Self::try_new(width, height, Color::TRANSPARENT)?;
        for (pixel, bytes) in image.pixels.iter_mut().zip(data.chunks_exact(4)) {
            *pixel = Color::new(bytes[0], bytes[1], bytes[2], bytes[3]);
        }
        Ok(image)
    }

    /// Decode an image file with the PNG codec.
    ///
    /// Returns an empty image (and logs a warning) if decoding fails.
    #[must_use]
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        Self::load_with(&PngCodec, path)
    }

    /// Decode an image file with a specific codec.
    ///
    /// Returns an empty image (and logs a warning) if decoding fails.
    #[must_use]
    pub fn load_with<C: ImageCodec + ?Sized, P: AsRef<Path>>(codec: &C, path: P) -> Self {
        let path = path.as_ref();
        let decoded = codec
            .decode(path)
            .and_then(|d| Self::from_rgba8(d.width, d.height, &d.pixels));
        match decoded {
            Ok(image) => {
                log::debug!(
                    "loaded {}x{} image from {}",
                    image.width,
                    image.height,
                    path.display()
                );
                image
            }
            Err(err) => {
                log::warn!("failed to load image {}: {err}", path.display());
                Self::empty()
            }
        }
    }

    /// Encode the image with the PNG codec.
    ///
    /// # Errors
    ///
    /// Returns an error if file creation or encoding fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.save_with(&PngCodec, path)
    }

    /// Encode the image with a specific codec.
    ///
    /// # Errors
    ///
    /// Returns an error if file creation or encoding fails.
    pub fn save_with<C: ImageCodec + ?Sized, P: AsRef<Path>>(
        &self,
        codec: &C,
        path: P,
    ) -> Result<()> {
        let path = path.as_ref();
        codec.encode(path, self.width, self.height, &self.to_rgba8())?;
        log::debug!("saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }

    /// Get the width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Get the height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Get the total number of pixels.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// True for a 0-area image.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Inclusive pixel bounding box.
    #[must_use]
    pub const fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Bytes per row in the RGBA8 interchange layout.
    #[must_use]
    pub const fn pitch(&self) -> usize {
        (self.width as usize) * 4
    }

    /// All pixels in row-major order.
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// All pixels in row-major order, mutable.
    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    /// Get a row of pixels.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[Color]> {
        if y >= self.height {
            return None;
        }
        let start = self.index(0, y);
        Some(&self.pixels[start..start + self.width as usize])
    }

    /// Disjoint mutable rows, for caller-side parallel rendering.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [Color]> {
        let width = (self.width as usize).max(1);
        self.pixels.chunks_exact_mut(width)
    }

    /// Linear index of `(x, y)`. No bounds check.
    #[inline]
    #[must_use]
    pub const fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Get the color at a specific pixel coordinate.
    ///
    /// Returns `None` if the coordinates are out of bounds.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    /// Mutable access to one pixel.
    pub fn get_pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        Some(&mut self.pixels[idx])
    }

    /// Set the color at a specific pixel coordinate, without blending.
    ///
    /// Does nothing if the coordinates are out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if let Some(pixel) = self.get_pixel_mut(x, y) {
            *pixel = color;
        }
    }

    /// Blend `color` into `(x, y)`, ignoring out-of-bounds coordinates.
    #[inline]
    pub fn plot(&mut self, x: i32, y: i32, color: Color, mode: &BlendMode) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        self.plot_unchecked(x, y, color, mode);
    }

    /// Blend `color` into `(x, y)`; the caller has already clipped.
    ///
    /// Out-of-range coordinates are a caller bug: they trip a debug assertion
    /// and may panic on the slice index.
    #[inline]
    pub fn plot_unchecked(&mut self, x: i32, y: i32, color: Color, mode: &BlendMode) {
        debug_assert!(
            x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height,
            "plot_unchecked({x}, {y}) outside {}x{}",
            self.width,
            self.height
        );
        if mode.discards(color) {
            return;
        }
        let idx = self.index(x as u32, y as u32);
        let pixel = &mut self.pixels[idx];
        *pixel = mode.blend(color, *pixel);
    }

    /// Fetch a texel, mapping out-of-range coordinates with `mode`.
    ///
    /// An empty image samples as transparent black.
    #[inline]
    #[must_use]
    pub fn sample(&self, x: i32, y: i32, mode: AddressMode) -> Color {
        if self.is_empty() {
            return Color::TRANSPARENT;
        }
        let x = mode.resolve(x, self.width as i32);
        let y = mode.resolve(y, self.height as i32);
        self.pixels[self.index(x as u32, y as u32)]
    }

    /// Fetch a texel at normalized coordinates (`0.0..=1.0` spans the image).
    #[inline]
    #[must_use]
    pub fn sample_uv(&self, u: f32, v: f32, mode: AddressMode) -> Color {
        if self.is_empty() {
            return Color::TRANSPARENT;
        }
        let x = (u * (self.width - 1) as f32).round() as i32;
        let y = (v * (self.height - 1) as f32).round() as i32;
        self.sample(x, y, mode)
    }

    /// Clear the image to a solid color.
    ///
    /// Order-independent bulk write over the aligned buffer.
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    /// Change the dimensions.
    ///
    /// No-op when the size is unchanged. Otherwise pixel contents are
    /// unspecified afterwards and the cached bounding box is recomputed.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        self.pixels.resize(pixel_count(width, height), Color::TRANSPARENT);
        self.width = width;
        self.height = height;
        self.aabb = Aabb::from_size(width, height);
    }

    /// Pack the pixels as interleaved R, G, B, A bytes.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixel_count() * 4);
        for pixel in self.pixels.iter() {
            out.extend_from_slice(&pixel.to_array());
        }
        out
    }

    /// Pack the pixels into `out`, starting each row `pitch` bytes apart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLengthMismatch`] if `pitch` is shorter than a row
    /// or `out` cannot hold every row.
    pub fn write_rgba8(&self, out: &mut [u8], pitch: usize) -> Result<()> {
        let row_bytes = self.pitch();
        let required = match self.height.checked_sub(1) {
            None => 0,
            Some(last) => pitch
                .checked_mul(last as usize)
                .and_then(|n| n.checked_add(row_bytes))
                .unwrap_or(usize::MAX),
        };
        if pitch < row_bytes || out.len() < required {
            return Err(Error::DataLengthMismatch {
                expected: required.max(row_bytes * self.height as usize),
                actual: out.len(),
            });
        }
        for (y, row) in self.pixels.chunks_exact(self.width.max(1) as usize).enumerate() {
            let dst = &mut out[y * pitch..y * pitch + row_bytes];
            for (bytes, pixel) in dst.chunks_exact_mut(4).zip(row) {
                bytes.copy_from_slice(&pixel.to_array());
            }
        }
        Ok(())
    }

    /// Hand the pixels to a presentation surface.
    pub fn present<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.present(&self.to_rgba8(), self.pitch(), self.width, self.height);
    }

    /// Get statistics about the image using SIMD-accelerated reduction.
    ///
    /// Returns `(min, max, mean)` luminance, or `None` for an empty image.
    #[must_use]
    pub fn luminance_stats(&self) -> Option<(f32, f32, f32)> {
        if self.is_empty() {
            return None;
        }
        let luminances: Vec<f32> = self.pixels.iter().map(|c| c.luminance()).collect();

        // Use trueno for SIMD-accelerated min/max/mean
        let vec = Vector::from_vec(luminances);

        Some((vec.min().ok()?, vec.max().ok()?, vec.mean().ok()?))
    }

    /// Get the SIMD backend trueno selected for bulk reductions.
    #[must_use]
    pub fn backend() -> Backend {
        Backend::select_best()
    }

    /// Check if the pixel buffer is properly aligned for SIMD.
    #[must_use]
    pub fn is_aligned(&self) -> bool {
        self.pixels.is_aligned()
    }
}

fn pixel_count(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_image() {
        let img = Image::new(100, 50);
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
        assert_eq!(img.pixel_count(), 5000);
        assert!(img.is_aligned());
        assert_eq!(img.get_pixel(0, 0), Some(Color::TRANSPARENT));
    }

    #[test]
    fn test_empty_image() {
        let mut img = Image::empty();
        assert!(img.is_empty());
        assert!(!img.aabb().is_valid());
        assert_eq!(img.sample(3, 3, AddressMode::Wrap), Color::TRANSPARENT);
        assert_eq!(img.sample_uv(0.5, 0.5, AddressMode::Clamp), Color::TRANSPARENT);
        img.plot(0, 0, Color::RED, &BlendMode::DISABLE);
        img.clear(Color::RED);
        assert!(img.pixels().is_empty());
    }

    #[test]
    fn test_aabb_matches_size() {
        let img = Image::new(4, 3);
        assert_eq!(img.aabb().min.x, 0.0);
        assert_eq!(img.aabb().max.x, 3.0);
        assert_eq!(img.aabb().max.y, 2.0);
    }

    #[test]
    fn test_clear() {
        let mut img = Image::new(10, 10);
        img.clear(Color::RED);

        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(img.get_pixel(x, y), Some(Color::RED));
            }
        }
    }

    #[test]
    fn test_clear_large() {
        let mut img = Image::new(1920, 1080);
        img.clear(Color::BLUE);

        assert_eq!(img.get_pixel(0, 0), Some(Color::BLUE));
        assert_eq!(img.get_pixel(959, 539), Some(Color::BLUE));
        assert_eq!(img.get_pixel(1919, 1079), Some(Color::BLUE));
    }

    #[test]
    fn test_set_get_pixel() {
        let mut img = Image::new(10, 10);

        img.set_pixel(5, 5, Color::BLUE);
        assert_eq!(img.get_pixel(5, 5), Some(Color::BLUE));
        assert_eq!(img.pixels()[img.index(5, 5)], Color::BLUE);

        // Out of bounds
        assert_eq!(img.get_pixel(100, 100), None);
        img.set_pixel(100, 100, Color::RED);
    }

    #[test]
    fn test_plot_checked_ignores_outside() {
        let mut img = Image::filled(4, 4, Color::BLACK);
        img.plot(-1, 0, Color::WHITE, &BlendMode::DISABLE);
        img.plot(0, 4, Color::WHITE, &BlendMode::DISABLE);
        assert!(img.pixels().iter().all(|&c| c == Color::BLACK));
        img.plot(3, 3, Color::WHITE, &BlendMode::DISABLE);
        assert_eq!(img.get_pixel(3, 3), Some(Color::WHITE));
    }

    #[test]
    fn test_plot_blends() {
        let mut img = Image::filled(2, 2, Color::WHITE);
        img.plot(0, 0, Color::new(255, 0, 0, 128), &BlendMode::ALPHA_BLEND);

        let result = img.get_pixel(0, 0).unwrap();
        // Should be pinkish (blend of red and white)
        assert_eq!(result.r, 255);
        assert!(result.g > 100 && result.g < 150);
        assert!(result.b > 100 && result.b < 150);
    }

    #[test]
    fn test_plot_discard_skips_write() {
        let mut img = Image::filled(2, 2, Color::WHITE);
        img.plot_unchecked(1, 1, Color::RED.with_alpha(10), &BlendMode::ALPHA_DISCARD);
        assert_eq!(img.get_pixel(1, 1), Some(Color::WHITE));
        img.plot_unchecked(1, 1, Color::RED, &BlendMode::ALPHA_DISCARD);
        assert_eq!(img.get_pixel(1, 1), Some(Color::RED));
    }

    fn gradient(width: u32, height: u32) -> Image {
        let mut img = Image::new(width, height);
        for y in 0..height {
            for x in 0..width {
                img.set_pixel(x, y, Color::rgb(x as u8, y as u8, 0));
            }
        }
        img
    }

    #[test]
    fn test_sample_wrap() {
        let img = gradient(4, 4);
        assert_eq!(img.sample(5, 0, AddressMode::Wrap), img.sample(1, 0, AddressMode::Wrap));
        assert_eq!(img.sample(5, 0, AddressMode::Wrap), Color::rgb(1, 0, 0));
        assert_eq!(img.sample(-1, 0, AddressMode::Wrap), Color::rgb(3, 0, 0));
        // Non-power-of-two width takes the modulo path.
        let img = gradient(3, 1);
        assert_eq!(img.sample(-1, 0, AddressMode::Wrap), Color::rgb(2, 0, 0));
        assert_eq!(img.sample(7, 0, AddressMode::Wrap), Color::rgb(1, 0, 0));
    }

    #[test]
    fn test_sample_mirror() {
        let img = gradient(4, 1);
        let xs: Vec<u8> = (-4..8).map(|x| img.sample(x, 0, AddressMode::Mirror).r).collect();
        assert_eq!(xs, vec![3, 2, 1, 0, 0, 1, 2, 3, 3, 2, 1, 0]);
    }

    #[test]
    fn test_sample_clamp() {
        let img = gradient(4, 4);
        assert_eq!(img.sample(-10, 2, AddressMode::Clamp), Color::rgb(0, 2, 0));
        assert_eq!(img.sample(10, 10, AddressMode::Clamp), Color::rgb(3, 3, 0));
    }

    #[test]
    fn test_sample_uv_rounds() {
        let img = gradient(5, 5);
        assert_eq!(img.sample_uv(0.0, 0.0, AddressMode::Clamp), Color::rgb(0, 0, 0));
        assert_eq!(img.sample_uv(1.0, 1.0, AddressMode::Clamp), Color::rgb(4, 4, 0));
        assert_eq!(img.sample_uv(0.5, 0.25, AddressMode::Clamp), Color::rgb(2, 1, 0));
    }

    #[test]
    fn test_resize() {
        let mut img = Image::filled(4, 4, Color::RED);
        img.resize(4, 4);
        assert_eq!(img.get_pixel(0, 0), Some(Color::RED));

        img.resize(8, 2);
        assert_eq!(img.width(), 8);
        assert_eq!(img.height(), 2);
        assert_eq!(img.pixels().len(), 16);
        assert_eq!(img.aabb().max.x, 7.0);
        assert_eq!(img.aabb().max.y, 1.0);

        img.resize(0, 0);
        assert!(img.is_empty());
        assert!(!img.aabb().is_valid());
    }

    #[test]
    fn test_rgba8_interchange_order() {
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let img = Image::from_rgba8(2, 1, &data).unwrap();
        assert_eq!(img.get_pixel(0, 0), Some(Color::new(1, 2, 3, 4)));
        assert_eq!(img.get_pixel(1, 0), Some(Color::new(5, 6, 7, 8)));
        assert_eq!(img.to_rgba8(), data.to_vec());
    }

    #[test]
    fn test_from_rgba8_length_mismatch() {
        let err = Image::from_rgba8(2, 2, &[0u8; 15]).unwrap_err();
        assert!(matches!(err, Error::DataLengthMismatch { expected: 16, actual: 15 }));
    }

    #[test]
    fn test_write_rgba8_with_pitch() {
        let img = Image::filled(2, 2, Color::new(9, 8, 7, 6));
        let mut out = vec![0u8; 12 + 8];
        img.write_rgba8(&mut out, 12).unwrap();
        assert_eq!(&out[0..8], &[9, 8, 7, 6, 9, 8, 7, 6]);
        assert_eq!(&out[8..12], &[0, 0, 0, 0]);
        assert_eq!(&out[12..20], &[9, 8, 7, 6, 9, 8, 7, 6]);

        assert!(img.write_rgba8(&mut out, 4).is_err());
        assert!(img.write_rgba8(&mut out[..10], 8).is_err());
    }

    #[test]
    fn test_write_rgba8_huge_pitch_is_error() {
        let img = Image::filled(2, 3, Color::WHITE);
        let mut out = vec![0u8; 64];
        let err = img.write_rgba8(&mut out, usize::MAX / 2).unwrap_err();
        assert!(matches!(err, Error::DataLengthMismatch { expected: usize::MAX, actual: 64 }));
    }

    #[test]
    fn test_present_passes_layout() {
        struct Capture(Vec<u8>, usize, u32, u32);
        impl Surface for Capture {
            fn present(&mut self, pixels: &[u8], pitch: usize, width: u32, height: u32) {
                self.0 = pixels.to_vec();
                self.1 = pitch;
                self.2 = width;
                self.3 = height;
            }
        }

        let img = Image::filled(3, 2, Color::RED);
        let mut surface = Capture(Vec::new(), 0, 0, 0);
        img.present(&mut surface);
        assert_eq!(surface.0.len(), 24);
        assert_eq!(surface.1, 12);
        assert_eq!((surface.2, surface.3), (3, 2));
        assert_eq!(&surface.0[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_rows_mut_are_disjoint() {
        let mut img = Image::new(3, 4);
        for (y, row) in img.rows_mut().enumerate() {
            row.fill(Color::rgb(0, y as u8, 0));
        }
        assert_eq!(img.get_pixel(2, 3), Some(Color::rgb(0, 3, 0)));
        assert_eq!(img.row(1).unwrap(), &[Color::rgb(0, 1, 0); 3]);
        assert!(img.row(4).is_none());
    }

    #[test]
    fn test_luminance_stats() {
        let img = Image::filled(10, 10, Color::rgb(128, 128, 128));

        let (min, max, mean) = img.luminance_stats().unwrap();

        // All same color, so min ≈ max ≈ mean
        assert!((min - max).abs() < 1.0);
        assert!((mean - min).abs() < 1.0);

        assert!(Image::empty().luminance_stats().is_none());
    }

    #[test]
    fn test_backend_selection() {
        let backend = Image::backend();
        // Should return a valid backend
        println!("Selected backend: {backend:?}");
    }
}
