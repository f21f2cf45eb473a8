//! Radiance HDR output: shared-exponent pixel encoding and the picture writer.

use std::io::{self, Write};

use crate::{color::ColorSystem, fourier::Dims};

const SOFTWARE: &str = "fraunhofer";

/// Resolved radiance, three linear channels per pixel.
#[derive(Debug, Clone)]
pub struct RadianceImage {
    pixels: Vec<[f32; 3]>,
    dims: Dims,
}
impl RadianceImage {
    pub(crate) fn new(pixels: Vec<[f32; 3]>, dims: Dims) -> Self {
        Self { pixels, dims }
    }
    pub fn dims(&self) -> Dims {
        self.dims
    }
    pub fn pixels(&self) -> &[[f32; 3]] {
        &self.pixels
    }
}

/// Shared-exponent encoding of one pixel: three mantissa bytes and one
/// exponent byte biased by 128. A non-positive maximum short-circuits to the
/// all-zero record, keeping the logarithm away from zero.
pub fn encode([r, g, b]: [f32; 3]) -> [u8; 4] {
    let max = r.max(g).max(b);
    if max <= 0f32 {
        return [0; 4];
    }
    let exponent = (max.log2().ceil() + 128f32).clamp(0f32, 255f32) as i32;
    let scale = ((exponent - 128) as f32).exp2();
    let mantissa = |c: f32| (256f32 * c / scale).floor().clamp(0f32, 255f32) as u8;
    [mantissa(r), mantissa(g), mantissa(b), exponent as u8]
}

/// Radiance picture writer; without a color system the XYZ channels go out
/// untransformed under the `xyze` format tag.
#[derive(Debug, Default)]
pub struct RadianceWriter {
    color_system: Option<ColorSystem>,
}
impl RadianceWriter {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn color_system(self, system: ColorSystem) -> Self {
        Self {
            color_system: Some(system),
        }
    }
    pub fn write<W: Write>(&self, out: &mut W, image: &RadianceImage) -> io::Result<()> {
        let Dims { x, y, .. } = image.dims();
        writeln!(out, "#?RADIANCE")?;
        writeln!(out, "SOFTWARE={SOFTWARE}")?;
        let format = match self.color_system {
            Some(_) => "rgbe",
            None => "xyze",
        };
        writeln!(out, "FORMAT=32-bit_rle_{format}")?;
        writeln!(out)?;
        writeln!(out, "-Y {y} +X {x}")?;

        for &pixel in image.pixels() {
            let toned = pixel.map(f32::sqrt);
            let channels = match &self.color_system {
                Some(system) => system.xyz_to_rgb(toned),
                None => toned,
            };
            out.write_all(&encode(channels))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color;

    #[test]
    fn zero_pixel_encodes_to_the_zero_record() {
        assert_eq!(encode([0f32; 3]), [0, 0, 0, 0]);
        assert_eq!(encode([-1f32, 0f32, 0f32]), [0, 0, 0, 0]);
    }

    #[test]
    fn unit_pixel_saturates_the_leading_mantissa() {
        // ceil(log2(1)) + 128 = 128, so the unit channel would quantize to
        // 256; the byte clamp pins it at 255
        assert_eq!(encode([1.0, 0.5, 0.25]), [255, 128, 64, 128]);
    }

    #[test]
    fn exponent_follows_the_maximum_channel() {
        let [_, _, _, e] = encode([4.0, 0.0, 0.0]);
        assert_eq!(e, 130);
        let [m, _, _, e] = encode([0.4, 0.1, 0.2]);
        assert_eq!(e, 127);
        assert_eq!(m, 204); // floor(256 * 0.4 / 0.5)
    }

    #[test]
    fn header_and_record_layout() {
        let dims = Dims::new(2, 1).unwrap();
        let image = RadianceImage::new(vec![[1f32; 3], [0f32; 3]], dims);
        let mut bytes = Vec::new();
        RadianceWriter::new().write(&mut bytes, &image).unwrap();
        let header = b"#?RADIANCE\nSOFTWARE=fraunhofer\nFORMAT=32-bit_rle_xyze\n\n-Y 1 +X 2\n";
        assert_eq!(&bytes[..header.len()], header.as_slice());
        assert_eq!(bytes.len(), header.len() + 2 * 4);
        assert_eq!(&bytes[header.len() + 4..], &[0, 0, 0, 0]);
    }

    #[test]
    fn rgbe_format_tag_comes_with_a_color_system() {
        let dims = Dims::new(1, 1).unwrap();
        let image = RadianceImage::new(vec![[0.5; 3]], dims);
        let mut bytes = Vec::new();
        RadianceWriter::new()
            .color_system(color::CIE)
            .write(&mut bytes, &image)
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes[..64]).contains("32-bit_rle_rgbe"));
    }
}
