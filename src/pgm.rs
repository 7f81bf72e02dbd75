//! Reading and writing raw portable graymaps (`P5`).
//!
//! The header consists of the magic token `P5` followed by the width, the
//! height and the maximum sample value, each separated by whitespace. Comment
//! lines starting with `#` may appear between any two header tokens. A single
//! whitespace byte terminates the header, after which `width * height` samples
//! follow, one byte each if the maximum value is below 256 and two bytes in
//! big-endian order otherwise. Bytes after the last sample are ignored.

use crate::types::{ImageCompressionError, Result};
use log::debug;
use ndarray::{Array2, ArrayView2};
use num::ToPrimitive;
use std::convert::TryFrom;
use std::path::Path;

const MAGIC: &[u8] = b"P5";

/// An immutable grayscale image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    max_value: u16,
    pixels: Array2<u16>,
}

impl Image {
    /// Create an image from a `(height, width)` pixel matrix.
    ///
    /// Fails if a dimension is zero, if `max_value` is zero or if a pixel
    /// exceeds `max_value`. The reported offset is the row-major sample index.
    pub fn new(pixels: Array2<u16>, max_value: u16) -> Result<Self> {
        if pixels.nrows() == 0 || pixels.ncols() == 0 {
            return Err(ImageCompressionError::format(0, "image has a zero dimension"));
        }
        if max_value == 0 {
            return Err(ImageCompressionError::format(0, "maximum value must be positive"));
        }
        if let Some(index) = pixels.iter().position(|&pixel| pixel > max_value) {
            return Err(ImageCompressionError::format(
                index,
                format!("sample exceeds maximum value {}", max_value),
            ));
        }

        Ok(Image { max_value, pixels })
    }

    /// Quantize a real matrix into an image.
    ///
    /// Values are rounded to the nearest integer and clamped to `[0, max_value]`.
    /// This turns a low-rank reconstruction back into something a viewer can show.
    pub fn from_matrix(mat: ArrayView2<f64>, max_value: u16) -> Result<Self> {
        let upper = f64::from(max_value);
        let mut pixels = Array2::<u16>::zeros(mat.dim());

        for ((index, &value), pixel) in mat.iter().enumerate().zip(pixels.iter_mut()) {
            *pixel = value
                .round()
                .clamp(0.0, upper)
                .to_u16()
                .ok_or_else(|| {
                    ImageCompressionError::NumericalError(format!(
                        "cannot quantize non-finite value at sample {}",
                        index
                    ))
                })?;
        }

        Image::new(pixels, max_value)
    }

    /// Number of pixel rows.
    pub fn height(&self) -> usize {
        self.pixels.nrows()
    }

    /// Number of pixel columns.
    pub fn width(&self) -> usize {
        self.pixels.ncols()
    }

    pub fn max_value(&self) -> u16 {
        self.max_value
    }

    /// Bytes per sample in the binary encoding.
    pub fn sample_width(&self) -> usize {
        sample_width(self.max_value)
    }

    /// Largest admissible truncation rank, `min(height, width)`.
    pub fn max_rank(&self) -> usize {
        self.height().min(self.width())
    }

    pub fn pixels(&self) -> ArrayView2<u16> {
        self.pixels.view()
    }

    /// The pixel matrix as real values.
    pub fn to_matrix(&self) -> Array2<f64> {
        self.pixels.mapv(f64::from)
    }
}

fn sample_width(max_value: u16) -> usize {
    if max_value < 256 {
        1
    } else {
        2
    }
}

/// Parse a raw PGM byte buffer.
pub fn decode(bytes: &[u8]) -> Result<Image> {
    let mut cursor = HeaderCursor { bytes, pos: 0 };

    if !bytes.starts_with(MAGIC) {
        return Err(ImageCompressionError::format(0, "missing `P5` magic token"));
    }
    cursor.pos = MAGIC.len();

    let width = cursor.next_token("width")?;
    let height = cursor.next_token("height")?;
    let max_value = cursor.next_token("maximum value")?;
    cursor.end_of_header()?;

    let header_len = cursor.pos;

    if width == 0 || height == 0 {
        return Err(ImageCompressionError::format(header_len, "image has a zero dimension"));
    }
    let max_value = match u16::try_from(max_value) {
        Ok(value) if value > 0 => value,
        _ => {
            return Err(ImageCompressionError::format(
                header_len,
                format!("maximum value {} outside of 1..=65535", max_value),
            ))
        }
    };

    let bytes_per_sample = sample_width(max_value);

    debug!(
        "PGM header: {}x{} pixels, max value {}, {} byte(s) per sample, data at byte {}",
        width, height, max_value, bytes_per_sample, header_len
    );

    let nsamples = width
        .checked_mul(height)
        .ok_or_else(|| ImageCompressionError::format(header_len, "image dimensions overflow"))?;
    let required = nsamples
        .checked_mul(bytes_per_sample)
        .ok_or_else(|| ImageCompressionError::format(header_len, "image dimensions overflow"))?;

    let data = &bytes[header_len..];
    if data.len() < required {
        return Err(ImageCompressionError::format(
            header_len,
            format!(
                "expected {} bytes of pixel data, found {}",
                required,
                data.len()
            ),
        ));
    }

    let samples: Vec<u16> = data[..required]
        .chunks_exact(bytes_per_sample)
        .map(|chunk| match chunk {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [value] => u16::from(*value),
            _ => unreachable!(),
        })
        .collect();

    if let Some(index) = samples.iter().position(|&sample| sample > max_value) {
        return Err(ImageCompressionError::format(
            header_len + index * bytes_per_sample,
            format!("sample exceeds maximum value {}", max_value),
        ));
    }

    let pixels = Array2::from_shape_vec((height, width), samples)
        .map_err(|err| ImageCompressionError::format(header_len, err.to_string()))?;

    Ok(Image { max_value, pixels })
}

/// Read a PGM file from disk and decode it.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<Image> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Encode an image as raw PGM bytes.
pub fn encode(image: &Image) -> Vec<u8> {
    let header = format!(
        "P5\n{} {}\n{}\n",
        image.width(),
        image.height(),
        image.max_value()
    );

    let mut bytes =
        Vec::with_capacity(header.len() + image.pixels.len() * image.sample_width());
    bytes.extend_from_slice(header.as_bytes());

    if image.sample_width() == 1 {
        bytes.extend(image.pixels.iter().map(|&pixel| pixel as u8));
    } else {
        for &pixel in image.pixels.iter() {
            bytes.extend_from_slice(&pixel.to_be_bytes());
        }
    }

    bytes
}

struct HeaderCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> HeaderCursor<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Consume the mandatory whitespace before a token, together with any
    /// further whitespace and comment lines.
    fn skip_separator(&mut self, token: &str) -> Result<()> {
        match self.peek() {
            Some(byte) if byte.is_ascii_whitespace() => self.pos += 1,
            Some(_) => {
                return Err(ImageCompressionError::format(
                    self.pos,
                    format!("expected whitespace before {}", token),
                ))
            }
            None => {
                return Err(ImageCompressionError::format(
                    self.pos,
                    format!("unexpected end of header before {}", token),
                ))
            }
        }

        while let Some(byte) = self.peek() {
            if byte.is_ascii_whitespace() {
                self.pos += 1;
            } else if byte == b'#' {
                while let Some(byte) = self.peek() {
                    self.pos += 1;
                    if byte == b'\n' || byte == b'\r' {
                        break;
                    }
                }
            } else {
                break;
            }
        }

        Ok(())
    }

    fn next_token(&mut self, token: &str) -> Result<usize> {
        self.skip_separator(token)?;

        let start = self.pos;
        let mut value: usize = 0;
        while let Some(byte) = self.peek().filter(u8::is_ascii_digit) {
            value = value
                .checked_mul(10)
                .and_then(|value| value.checked_add(usize::from(byte - b'0')))
                .ok_or_else(|| {
                    ImageCompressionError::format(start, format!("{} is too large", token))
                })?;
            self.pos += 1;
        }

        if self.pos == start {
            return Err(ImageCompressionError::format(
                start,
                format!("expected {}", token),
            ));
        }

        Ok(value)
    }

    fn end_of_header(&mut self) -> Result<()> {
        match self.peek() {
            Some(byte) if byte.is_ascii_whitespace() => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(ImageCompressionError::format(
                self.pos,
                "expected a single whitespace after the maximum value",
            )),
            None => Err(ImageCompressionError::format(
                self.pos,
                "unexpected end of header after the maximum value",
            )),
        }
    }
}
