//! Image file codecs.
//!
//! Decoding and encoding exchange plain RGBA8 bytes so the [`Image`] type
//! stays independent of any file format. [`PngCodec`] is the pure Rust
//! default built on the `png` crate.
//!
//! [`Image`]: crate::image::Image

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Interleaved R, G, B, A bytes, `width * height * 4` long.
    pub pixels: Vec<u8>,
}

/// File format collaborator used by [`Image::load_with`] and
/// [`Image::save_with`].
///
/// [`Image::load_with`]: crate::image::Image::load_with
/// [`Image::save_with`]: crate::image::Image::save_with
pub trait ImageCodec {
    /// Read `path` into RGBA8 pixels.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a supported image.
    fn decode(&self, path: &Path) -> Result<DecodedImage>;

    /// Write RGBA8 pixels to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or encoding fails.
    fn encode(&self, path: &Path, width: u32, height: u32, pixels: &[u8]) -> Result<()>;
}

/// PNG codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec;

impl PngCodec {
    /// Encode RGBA8 pixels to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if PNG encoding fails.
    pub fn to_bytes(width: u32, height: u32, pixels: &[u8]) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        write_png(&mut buffer, width, height, pixels)?;
        Ok(buffer)
    }

    /// Decode PNG bytes from any reader.
    ///
    /// Palette, grayscale and 16-bit inputs are expanded to RGBA8.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is not a decodable PNG.
    pub fn decode_reader<R: std::io::Read>(reader: R) -> Result<DecodedImage> {
        let mut decoder = png::Decoder::new(reader);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder.read_info()?;

        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        buf.truncate(info.buffer_size());

        let pixels = match info.color_type {
            png::ColorType::Rgba => buf,
            png::ColorType::Rgb => buf
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            png::ColorType::GrayscaleAlpha => buf
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0], p[1]])
                .collect(),
            png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g, 255]).collect(),
            png::ColorType::Indexed => {
                return Err(Error::UnsupportedFormat(
                    "indexed PNG was not expanded".to_string(),
                ))
            }
        };

        Ok(DecodedImage {
            width: info.width,
            height: info.height,
            pixels,
        })
    }
}

impl ImageCodec for PngCodec {
    fn decode(&self, path: &Path) -> Result<DecodedImage> {
        let file = File::open(path)?;
        Self::decode_reader(BufReader::new(file))
    }

    fn encode(&self, path: &Path, width: u32, height: u32, pixels: &[u8]) -> Result<()> {
        let file = File::create(path)?;
        write_png(BufWriter::new(file), width, height, pixels)
    }
}

fn write_png<W: Write>(out: W, width: u32, height: u32, pixels: &[u8]) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    let expected = (width as usize) * (height as usize) * 4;
    if pixels.len() != expected {
        return Err(Error::DataLengthMismatch {
            expected,
            actual: pixels.len(),
        });
    }

    let mut encoder = png::Encoder::new(out, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(pixels)?;
    writer.finish()?;
    Ok(())
}
