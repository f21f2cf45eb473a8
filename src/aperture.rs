//! Aperture mask loading from PNM pixel-maps.
//!
//! Both the ASCII ("P3") and binary ("P6") flavors are read, with 8 or 16 bit
//! channel depth picked by the declared maximum value. Each pixel reduces to a
//! luminance proxy `sqrt((R+G+B)/3)`; a threshold of 1 keeps the continuous
//! value, anything lower turns the mask into a hard open/closed decision.

use std::{
    fs,
    path::{Path, PathBuf},
    str,
};

use num_complex::Complex32;

use crate::fourier::{radix, ComplexGrid, Dims};

#[derive(Debug, thiserror::Error)]
pub enum ApertureError {
    #[error("failed to read the pixel-map {1:?}")]
    Io(#[source] std::io::Error, PathBuf),
    #[error("unsupported pixel-map header {0:?}")]
    UnsupportedFormat(String),
    #[error("the {0} of {1} pixels is not a power of two")]
    NotPowerOfTwo(&'static str, usize),
    #[error("invalid {0} field {1:?}")]
    InvalidField(&'static str, String),
    #[error("the maximum channel value {0} is out of range")]
    MaxValue(usize),
    #[error("unexpected end of pixel data")]
    UnexpectedEof,
}

/// Aperture transmission mask; real part in [0,1], imaginary part 0.
#[derive(Debug, Clone)]
pub struct ApertureMask {
    data: Vec<Complex32>,
    dims: Dims,
}
impl ApertureMask {
    pub fn dims(&self) -> Dims {
        self.dims
    }
    pub fn samples(&self) -> &[Complex32] {
        &self.data
    }
    /// Hands the mask over to the transform stage.
    pub fn into_grid(self) -> ComplexGrid {
        ComplexGrid::new(self.data, self.dims)
    }
}

/// Pixel-map reader, built up from a path and an aperture threshold.
pub struct PixmapLoader {
    path: PathBuf,
    threshold: f32,
}
impl PixmapLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            threshold: 1f32,
        }
    }
    /// Aperture threshold in [0,1]; 1 keeps the continuous luminance.
    pub fn threshold(self, threshold: f32) -> Self {
        Self { threshold, ..self }
    }
    pub fn load(self) -> Result<ApertureMask, ApertureError> {
        let bytes = fs::read(&self.path).map_err(|e| ApertureError::Io(e, self.path.clone()))?;
        self.parse(&bytes)
    }
    fn parse(&self, bytes: &[u8]) -> Result<ApertureMask, ApertureError> {
        let mut fields = Fields::new(bytes);
        let header = fields.next("header")?;
        let binary = match header {
            "P3" => false,
            "P6" => true,
            other => return Err(ApertureError::UnsupportedFormat(other.to_string())),
        };
        let x = fields.number("width")?;
        let y = fields.number("height")?;
        let dims = Dims::new(x, y).ok_or_else(|| {
            if radix(x).is_none() {
                ApertureError::NotPowerOfTwo("width", x)
            } else {
                ApertureError::NotPowerOfTwo("height", y)
            }
        })?;
        let max = fields.number("maximum value")?;
        if max == 0 || max > u16::MAX as usize {
            return Err(ApertureError::MaxValue(max));
        }
        log::debug!("{:?}: {header}, {x}x{y}, {max}", self.path);

        let scale = 1f32 / max as f32;
        let mut data = Vec::with_capacity(dims.len());
        if binary {
            let wide = max > u8::MAX as usize;
            let stride = if wide { 6 } else { 3 };
            let payload = fields.payload()?;
            if payload.len() < dims.len() * stride {
                return Err(ApertureError::UnexpectedEof);
            }
            for pixel in payload.chunks_exact(stride).take(dims.len()) {
                let (r, g, b) = if wide {
                    (
                        u16::from_be_bytes([pixel[0], pixel[1]]) as f32,
                        u16::from_be_bytes([pixel[2], pixel[3]]) as f32,
                        u16::from_be_bytes([pixel[4], pixel[5]]) as f32,
                    )
                } else {
                    (pixel[0] as f32, pixel[1] as f32, pixel[2] as f32)
                };
                data.push(self.mask_value(r * scale, g * scale, b * scale));
            }
        } else {
            for _ in 0..dims.len() {
                let r = fields.number("red channel")? as f32;
                let g = fields.number("green channel")? as f32;
                let b = fields.number("blue channel")? as f32;
                data.push(self.mask_value(r * scale, g * scale, b * scale));
            }
        }
        Ok(ApertureMask { data, dims })
    }
    fn mask_value(&self, r: f32, g: f32, b: f32) -> Complex32 {
        let luminance = ((r + g + b) / 3f32).sqrt().min(1f32);
        let value = if self.threshold == 1f32 {
            luminance
        } else if luminance > self.threshold {
            1f32
        } else {
            0f32
        };
        Complex32::new(value, 0f32)
    }
}

/// Whitespace-separated header fields with `#` comments, followed for binary
/// maps by a raw payload one byte after the last field.
struct Fields<'a> {
    bytes: &'a [u8],
    pos: usize,
}
impl<'a> Fields<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }
    fn next(&mut self, name: &'static str) -> Result<&'a str, ApertureError> {
        loop {
            while self
                .bytes
                .get(self.pos)
                .map_or(false, |b| b.is_ascii_whitespace())
            {
                self.pos += 1;
            }
            if self.bytes.get(self.pos) == Some(&b'#') {
                while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
        let start = self.pos;
        while self
            .bytes
            .get(self.pos)
            .map_or(false, |b| !b.is_ascii_whitespace())
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(ApertureError::UnexpectedEof);
        }
        str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| ApertureError::InvalidField(name, format!("{:?}", &self.bytes[start..self.pos])))
    }
    fn number(&mut self, name: &'static str) -> Result<usize, ApertureError> {
        let field = self.next(name)?;
        field
            .parse()
            .map_err(|_| ApertureError::InvalidField(name, field.to_string()))
    }
    /// The binary pixel payload, one whitespace byte past the last field.
    fn payload(&mut self) -> Result<&'a [u8], ApertureError> {
        self.pos += 1;
        self.bytes
            .get(self.pos..)
            .ok_or(ApertureError::UnexpectedEof)
    }
}
