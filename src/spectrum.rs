//! Tristimulus response of the visible spectrum.
//!
//! The renderer weights every wavelength sample with the CIE 1931 standard
//! observer, tabulated once at a fixed resolution over 380-780 nm from the
//! published piecewise-Gaussian fit of the color-matching functions. The table
//! is a deployment constant, built lazily and shared read-only.

use once_cell::sync::Lazy;

/// Number of entries in the tabulated curve.
pub const RESOLUTION: usize = 512;
pub const LAMBDA_MIN_NM: f32 = 380.0;
pub const LAMBDA_MAX_NM: f32 = 780.0;

static CIE_1931: Lazy<SpectralCurve> = Lazy::new(SpectralCurve::tabulate);

/// Fixed-resolution map from a normalized wavelength index to an XYZ response.
#[derive(Debug)]
pub struct SpectralCurve {
    table: Vec<[f32; 3]>,
}
impl SpectralCurve {
    /// The CIE 1931 2-degree standard observer.
    pub fn cie_1931() -> &'static Self {
        &CIE_1931
    }
    fn tabulate() -> Self {
        let table = (0..RESOLUTION)
            .map(|i| {
                let lambda = Self::wavelength_nm(i as f32 / (RESOLUTION - 1) as f32);
                [
                    x_bar(lambda).max(0f32),
                    y_bar(lambda).max(0f32),
                    z_bar(lambda).max(0f32),
                ]
            })
            .collect();
        Self { table }
    }
    pub fn resolution(&self) -> usize {
        self.table.len()
    }
    /// XYZ response at a normalized wavelength fraction in [0,1].
    pub fn response(&self, fraction: f32) -> [f32; 3] {
        let i = (fraction.clamp(0f32, 1f32) * (self.table.len() - 1) as f32).round() as usize;
        self.table[i]
    }
    /// Physical wavelength for a normalized fraction of the visible range.
    pub fn wavelength_nm(fraction: f32) -> f32 {
        LAMBDA_MIN_NM + fraction * (LAMBDA_MAX_NM - LAMBDA_MIN_NM)
    }
}

/// One asymmetric Gaussian lobe of the observer fit.
fn lobe(lambda: f32, alpha: f32, mu: f32, sigma_l: f32, sigma_r: f32) -> f32 {
    let sigma = if lambda < mu { sigma_l } else { sigma_r };
    let t = (lambda - mu) / sigma;
    alpha * (-0.5 * t * t).exp()
}

fn x_bar(lambda: f32) -> f32 {
    lobe(lambda, 1.056, 599.8, 37.9, 31.0) + lobe(lambda, 0.362, 442.0, 16.0, 26.7)
        - lobe(lambda, 0.065, 501.1, 20.4, 26.2)
}

fn y_bar(lambda: f32) -> f32 {
    lobe(lambda, 0.821, 568.8, 46.9, 40.5) + lobe(lambda, 0.286, 530.9, 16.3, 31.1)
}

fn z_bar(lambda: f32) -> f32 {
    lobe(lambda, 1.217, 437.0, 11.8, 36.0) + lobe(lambda, 0.681, 459.0, 26.0, 13.8)
}
