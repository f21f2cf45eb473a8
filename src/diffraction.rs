//! Diffraction intensity field derived from the transformed aperture.
//!
//! The frequency plane collapses to the squared magnitude of each sample, with
//! the zero-frequency term moved to the grid center and the spatial-frequency
//! coordinate divided by the lens distance, so a larger distance spreads the
//! pattern further across the image plane.

use rayon::prelude::*;

use crate::fourier::{ComplexGrid, Dims};

/// Real-valued diffraction intensity, read-only once built.
#[derive(Debug, Clone)]
pub struct DiffractionField {
    data: Vec<f32>,
    dims: Dims,
}
impl DiffractionField {
    /// Collapses a frequency-domain grid into the centered, distance-scaled
    /// intensity field. The lens distance is validated as positive at
    /// configuration time, before any transform runs.
    pub fn new(spectrum: &ComplexGrid, lens_distance: f32) -> Self {
        let dims = spectrum.dims();
        let Dims { x: w, y: h, .. } = dims;
        let intensity: Vec<f32> = spectrum.samples().iter().map(|z| z.norm_sqr()).collect();

        let (cx, cy) = (w as isize / 2, h as isize / 2);
        let mut data = vec![0f32; w * h];
        data.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
            let fy = (y as isize - cy) as f32 / lens_distance;
            for (x, value) in row.iter_mut().enumerate() {
                let fx = (x as isize - cx) as f32 / lens_distance;
                *value = periodic_bilinear(&intensity, w, h, fx, fy);
            }
        });
        Self { data, dims }
    }
    pub fn dims(&self) -> Dims {
        self.dims
    }
    pub fn values(&self) -> &[f32] {
        &self.data
    }
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.dims.x + x]
    }
    /// Bilinear lookup at fractional pixel coordinates; zero outside the grid.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let Dims { x: w, y: h, .. } = self.dims;
        if x < 0f32 || y < 0f32 || x > (w - 1) as f32 || y > (h - 1) as f32 {
            return 0f32;
        }
        let (x0, y0) = (x.floor() as usize, y.floor() as usize);
        let (tx, ty) = (x - x0 as f32, y - y0 as f32);
        let at = |x: usize, y: usize| {
            if x < w && y < h {
                self.get(x, y)
            } else {
                0f32
            }
        };
        let top = at(x0, y0) * (1f32 - tx) + at(x0 + 1, y0) * tx;
        let bottom = at(x0, y0 + 1) * (1f32 - tx) + at(x0 + 1, y0 + 1) * tx;
        top * (1f32 - ty) + bottom * ty
    }
}

/// Bilinear lookup at a signed frequency coordinate, wrapping around the
/// periodic frequency plane.
fn periodic_bilinear(intensity: &[f32], w: usize, h: usize, fx: f32, fy: f32) -> f32 {
    let (x0, y0) = (fx.floor(), fy.floor());
    let (tx, ty) = (fx - x0, fy - y0);
    let at = |x: isize, y: isize| {
        let x = x.rem_euclid(w as isize) as usize;
        let y = y.rem_euclid(h as isize) as usize;
        intensity[y * w + x]
    };
    let (x0, y0) = (x0 as isize, y0 as isize);
    let top = at(x0, y0) * (1f32 - tx) + at(x0 + 1, y0) * tx;
    let bottom = at(x0, y0 + 1) * (1f32 - tx) + at(x0 + 1, y0 + 1) * tx;
    top * (1f32 - ty) + bottom * ty
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fourier::Fft2;
    use num_complex::Complex32;

    fn transformed(values: &[f32], w: usize, h: usize) -> ComplexGrid {
        let dims = Dims::new(w, h).unwrap();
        let data = values.iter().map(|&v| Complex32::new(v, 0f32)).collect();
        let mut grid = ComplexGrid::new(data, dims);
        Fft2::new(dims).forward(&mut grid);
        grid
    }

    #[test]
    fn uniform_aperture_concentrates_at_the_center() {
        let grid = transformed(&[1f32; 16], 4, 4);
        let field = DiffractionField::new(&grid, 1f32);
        // DC term lands on the center pixel with the full (4x4)^2 energy
        assert_eq!(field.get(2, 2), 256f32);
        let total: f32 = field.values().iter().sum();
        assert_eq!(total, 256f32);
    }

    #[test]
    fn zero_aperture_yields_zero_field() {
        let grid = transformed(&[0f32; 64], 8, 8);
        let field = DiffractionField::new(&grid, 2.5);
        assert!(field.values().iter().all(|&v| v == 0f32));
    }

    #[test]
    fn sampling_is_zero_outside_the_grid() {
        let grid = transformed(&[1f32; 16], 4, 4);
        let field = DiffractionField::new(&grid, 1f32);
        assert_eq!(field.sample(-0.5, 1.0), 0f32);
        assert_eq!(field.sample(1.0, 3.5), 0f32);
        assert_eq!(field.sample(2.0, 2.0), 256f32);
    }

    #[test]
    fn sampling_interpolates_between_pixels() {
        let grid = transformed(&[1f32; 16], 4, 4);
        let field = DiffractionField::new(&grid, 1f32);
        let half = field.sample(2.0, 1.5);
        assert!((half - 128f32).abs() < 1e-3);
    }
}
