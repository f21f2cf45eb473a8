//! Spectral integration of the diffraction field into a radiance image.
//!
//! Every wavelength sample looks up its tristimulus response, weights it with
//! the diffraction intensity reaching each output pixel (longer wavelengths
//! spread proportionally further) and adds both the weighted color and the
//! weight itself into a 4-channel accumulator. Pixels are independent, so the
//! image is rendered row-parallel; the per-pixel sample loop runs in index
//! order, which makes a re-run bit-identical.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::{
    diffraction::DiffractionField,
    fourier::Dims,
    radiance::RadianceImage,
    spectrum::SpectralCurve,
};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("the wavelength sample count must be at least 1")]
    NoSamples,
}

/// Wavelength sampling strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    /// One sample at the middle of the visible range.
    SingleExposure,
    /// `samples` wavelengths spread evenly across the visible range, sample
    /// `t` at fraction `t/samples`.
    Stratified { samples: usize },
}
impl Sampling {
    pub fn from_samples(samples: usize) -> Result<Self, RenderError> {
        match samples {
            0 => Err(RenderError::NoSamples),
            1 => Ok(Self::SingleExposure),
            samples => Ok(Self::Stratified { samples }),
        }
    }
    pub fn samples(&self) -> usize {
        match self {
            Self::SingleExposure => 1,
            Self::Stratified { samples } => *samples,
        }
    }
    /// The deterministic wavelength schedule, exhaustive over [0,1).
    pub fn wavelengths(&self) -> Vec<WavelengthSample> {
        match self {
            Self::SingleExposure => vec![WavelengthSample {
                index: 0,
                fraction: 0.5,
                seed: 0,
            }],
            Self::Stratified { samples } => (0..*samples)
                .map(|t| WavelengthSample {
                    index: t,
                    fraction: t as f32 / *samples as f32,
                    seed: t as u64,
                })
                .collect(),
        }
    }
}

/// One wavelength draw.
///
/// `seed` equals the sample index and is not consumed by the deterministic
/// schedule.
// TODO: jitter `fraction` within its stratum from `seed`
#[derive(Debug, Clone, Copy)]
pub struct WavelengthSample {
    pub index: usize,
    pub fraction: f32,
    pub seed: u64,
}

/// 4-channel accumulation buffer: XYZ color plus the accumulated weight.
#[derive(Debug, Clone)]
pub struct Accumulator {
    data: Vec<[f32; 4]>,
    dims: Dims,
}
impl Accumulator {
    fn zeroed(dims: Dims) -> Self {
        Self {
            data: vec![[0f32; 4]; dims.len()],
            dims,
        }
    }
    pub fn dims(&self) -> Dims {
        self.dims
    }
    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.data
    }
    /// Color divided by weight per pixel; a zero weight resolves to black
    /// rather than a division fault.
    pub fn resolve(self) -> RadianceImage {
        let pixels = self
            .data
            .iter()
            .map(|&[x, y, z, weight]| {
                if weight != 0f32 {
                    [x / weight, y / weight, z / weight]
                } else {
                    [0f32; 3]
                }
            })
            .collect();
        RadianceImage::new(pixels, self.dims)
    }
}

/// Monte Carlo spectral renderer over a diffraction field.
pub struct Renderer<'a> {
    field: &'a DiffractionField,
    curve: &'a SpectralCurve,
    sampling: Sampling,
}
impl<'a> Renderer<'a> {
    pub fn new(field: &'a DiffractionField, curve: &'a SpectralCurve) -> Self {
        Self {
            field,
            curve,
            sampling: Sampling::SingleExposure,
        }
    }
    pub fn sampling(self, sampling: Sampling) -> Self {
        Self { sampling, ..self }
    }
    pub fn render(&self) -> Accumulator {
        let dims = self.field.dims();
        let Dims { x: w, y: h, .. } = dims;
        let (cx, cy) = ((w / 2) as f32, (h / 2) as f32);

        // Per-sample data is fixed across pixels; look it up once.
        let reference = SpectralCurve::wavelength_nm(0.5);
        let samples: Vec<([f32; 3], f32)> = self
            .sampling
            .wavelengths()
            .into_iter()
            .map(|sample| {
                let spread = SpectralCurve::wavelength_nm(sample.fraction) / reference;
                (self.curve.response(sample.fraction), spread)
            })
            .collect();

        let progress = ProgressBar::new(h as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        progress.set_message("Rendering");

        let mut accumulator = Accumulator::zeroed(dims);
        accumulator
            .data
            .par_chunks_mut(w)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.iter_mut().enumerate() {
                    for &(xyz, spread) in &samples {
                        let sx = cx + (x as f32 - cx) / spread;
                        let sy = cy + (y as f32 - cy) / spread;
                        let weight = self.field.sample(sx, sy);
                        pixel[0] += xyz[0] * weight;
                        pixel[1] += xyz[1] * weight;
                        pixel[2] += xyz[2] * weight;
                        pixel[3] += weight;
                    }
                }
                progress.inc(1);
            });
        progress.finish_with_message("Rendering complete");
        accumulator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourier::{ComplexGrid, Fft2};
    use num_complex::Complex32;

    fn uniform_field(w: usize, h: usize, value: f32) -> DiffractionField {
        let dims = Dims::new(w, h).unwrap();
        let data = vec![Complex32::new(value, 0f32); dims.len()];
        let mut grid = ComplexGrid::new(data, dims);
        Fft2::new(dims).forward(&mut grid);
        DiffractionField::new(&grid, 1f32)
    }

    #[test]
    fn four_samples_visit_the_quarter_fractions() {
        let sampling = Sampling::from_samples(4).unwrap();
        let fractions: Vec<f32> = sampling.wavelengths().iter().map(|s| s.fraction).collect();
        assert_eq!(fractions, vec![0.0, 0.25, 0.5, 0.75]);
        let indices: Vec<usize> = sampling.wavelengths().iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn one_sample_covers_the_range_symmetrically() {
        let sampling = Sampling::from_samples(1).unwrap();
        assert_eq!(sampling, Sampling::SingleExposure);
        let schedule = sampling.wavelengths();
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule[0].fraction, 0.5);
    }

    #[test]
    fn zero_samples_are_rejected() {
        assert!(matches!(
            Sampling::from_samples(0),
            Err(RenderError::NoSamples)
        ));
    }

    #[test]
    fn rendering_twice_is_bit_identical() {
        let field = uniform_field(8, 8, 0.75);
        let curve = SpectralCurve::cie_1931();
        let renderer = Renderer::new(&field, curve).sampling(Sampling::from_samples(5).unwrap());
        let first = renderer.render();
        let second = renderer.render();
        for (a, b) in first.pixels().iter().zip(second.pixels()) {
            for (a, b) in a.iter().zip(b) {
                assert_eq!(a.to_bits(), b.to_bits());
            }
        }
    }

    #[test]
    fn zero_field_accumulates_nothing() {
        let field = uniform_field(8, 8, 0f32);
        let curve = SpectralCurve::cie_1931();
        let accumulator = Renderer::new(&field, curve)
            .sampling(Sampling::from_samples(4).unwrap())
            .render();
        assert!(accumulator
            .pixels()
            .iter()
            .all(|pixel| pixel.iter().all(|&c| c == 0f32)));
        let image = accumulator.resolve();
        assert!(image.pixels().iter().all(|&p| p == [0f32; 3]));
    }

    #[test]
    fn resolution_divides_color_by_weight() {
        let field = uniform_field(4, 4, 1f32);
        let curve = SpectralCurve::cie_1931();
        let accumulator = Renderer::new(&field, curve).render();
        let dims = accumulator.dims();
        let center = accumulator.pixels()[(dims.y / 2) * dims.x + dims.x / 2];
        assert!(center[3] > 0f32);
        let image = accumulator.resolve();
        let resolved = image.pixels()[(dims.y / 2) * dims.x + dims.x / 2];
        let mid = curve.response(0.5);
        for (r, m) in resolved.iter().zip(&mid) {
            assert!((r - m).abs() < 1e-5);
        }
    }
}
