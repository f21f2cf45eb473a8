//! In-place 2-D radix-2 FFT over power-of-two grids.
//!
//! The two dimensions of a grid may differ, so each gets its own bit-reversal
//! table and the transform runs as two separable passes: every row first, then
//! every column. Rows (and columns) carry no data dependency between each
//! other and are transformed in parallel; the pass boundary is a barrier.

use num_complex::Complex32;
use rayon::prelude::*;
use std::f32::consts::PI;

/// Grid geometry: both extents with their log2 values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    pub x: usize,
    pub y: usize,
    pub radix_x: u32,
    pub radix_y: u32,
}
impl Dims {
    /// Returns `None` unless both extents are powers of two.
    pub fn new(x: usize, y: usize) -> Option<Self> {
        Some(Self {
            x,
            y,
            radix_x: radix(x)?,
            radix_y: radix(y)?,
        })
    }
    pub fn len(&self) -> usize {
        self.x * self.y
    }
}

/// log2 of a power of two, `None` otherwise.
pub fn radix(n: usize) -> Option<u32> {
    n.is_power_of_two().then(|| n.trailing_zeros())
}

/// Reversal of the `radix` low bits of `x`.
pub fn bit_reverse(x: u32, radix: u32) -> u32 {
    if radix == 0 {
        return 0;
    }
    let x = ((x & 0xaaaa_aaaa) >> 1) | ((x & 0x5555_5555) << 1);
    let x = ((x & 0xcccc_cccc) >> 2) | ((x & 0x3333_3333) << 2);
    let x = ((x & 0xf0f0_f0f0) >> 4) | ((x & 0x0f0f_0f0f) << 4);
    let x = ((x & 0xff00_ff00) >> 8) | ((x & 0x00ff_00ff) << 8);
    x.rotate_left(16) >> (32 - radix)
}

/// Permutation table for one transform dimension: `table[i] = bit_reverse(i)`.
pub fn reversal_table(n: usize, radix: u32) -> Vec<u32> {
    (0..n as u32).map(|i| bit_reverse(i, radix)).collect()
}

/// Row-major grid of complex samples, mutated in place by [`Fft2`].
#[derive(Debug, Clone)]
pub struct ComplexGrid {
    pub(crate) data: Vec<Complex32>,
    pub(crate) dims: Dims,
}
impl ComplexGrid {
    pub fn new(data: Vec<Complex32>, dims: Dims) -> Self {
        assert_eq!(data.len(), dims.len());
        Self { data, dims }
    }
    pub fn dims(&self) -> Dims {
        self.dims
    }
    pub fn samples(&self) -> &[Complex32] {
        &self.data
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Inverse,
}

/// Two-dimensional FFT with per-dimension reversal tables built once.
#[derive(Debug)]
pub struct Fft2 {
    dims: Dims,
    row_table: Vec<u32>,
    col_table: Vec<u32>,
}
impl Fft2 {
    pub fn new(dims: Dims) -> Self {
        Self {
            dims,
            row_table: reversal_table(dims.x, dims.radix_x),
            col_table: reversal_table(dims.y, dims.radix_y),
        }
    }
    pub fn forward(&self, grid: &mut ComplexGrid) {
        self.transform(grid, Direction::Forward)
    }
    /// Conjugated twiddles and 1/n scaling per pass, so that
    /// `inverse(forward(g))` reproduces `g`.
    pub fn inverse(&self, grid: &mut ComplexGrid) {
        self.transform(grid, Direction::Inverse)
    }
    fn transform(&self, grid: &mut ComplexGrid, direction: Direction) {
        assert_eq!(grid.dims, self.dims);
        let Dims { x: w, y: h, .. } = self.dims;

        grid.data
            .par_chunks_mut(w)
            .for_each(|row| transform_line(row, &self.row_table, direction));

        // The column pass reads every row's result, so it runs only after the
        // row pass above has fully completed. Columns are gathered into a
        // transposed scratch buffer so the same contiguous 1-D kernel drives
        // both passes.
        let mut scratch = vec![Complex32::default(); w * h];
        transpose(&grid.data, &mut scratch, w, h);
        scratch
            .par_chunks_mut(h)
            .for_each(|col| transform_line(col, &self.col_table, direction));
        transpose(&scratch, &mut grid.data, h, w);
    }
}

fn transpose(src: &[Complex32], dst: &mut [Complex32], width: usize, height: usize) {
    for y in 0..height {
        for x in 0..width {
            dst[x * height + y] = src[y * width + x];
        }
    }
}

/// 1-D radix-2 Cooley-Tukey: reversal-table reorder, then log2(n) butterfly
/// stages with twiddles `exp(-2πi·k/len)` (conjugated for the inverse).
fn transform_line(line: &mut [Complex32], table: &[u32], direction: Direction) {
    let n = line.len();
    for (i, &r) in table.iter().enumerate() {
        let r = r as usize;
        if i < r {
            line.swap(i, r);
        }
    }

    let sign = match direction {
        Direction::Forward => -1f32,
        Direction::Inverse => 1f32,
    };
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let step = sign * PI / half as f32;
        for start in (0..n).step_by(len) {
            for k in 0..half {
                let (s, c) = (step * k as f32).sin_cos();
                let w = Complex32::new(c, s);
                let u = line[start + k];
                let v = line[start + k + half] * w;
                line[start + k] = u + v;
                line[start + k + half] = u - v;
            }
        }
        len <<= 1;
    }

    if direction == Direction::Inverse {
        let scale = 1f32 / n as f32;
        line.iter_mut().for_each(|z| *z *= scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversal_table_is_a_permutation() {
        for radix in 0..8u32 {
            let n = 1usize << radix;
            let mut table = reversal_table(n, radix);
            table.sort_unstable();
            assert_eq!(table, (0..n as u32).collect::<Vec<_>>());
        }
    }

    #[test]
    fn bit_reverse_known_values() {
        assert_eq!(bit_reverse(0, 4), 0);
        assert_eq!(bit_reverse(1, 4), 8);
        assert_eq!(bit_reverse(3, 4), 12);
        assert_eq!(bit_reverse(0b0110, 4), 0b0110);
        assert_eq!(bit_reverse(1, 10), 512);
    }

    #[test]
    fn radix_rejects_non_powers_of_two() {
        assert_eq!(radix(16), Some(4));
        assert_eq!(radix(1), Some(0));
        assert_eq!(radix(0), None);
        assert_eq!(radix(12), None);
        assert!(Dims::new(12, 8).is_none());
    }

    #[test]
    fn impulse_transforms_to_constant() {
        let dims = Dims::new(8, 1).unwrap();
        let mut data = vec![Complex32::default(); 8];
        data[0] = Complex32::new(1.0, 0.0);
        let mut grid = ComplexGrid::new(data, dims);
        Fft2::new(dims).forward(&mut grid);
        for z in grid.samples() {
            assert!((z.re - 1.0).abs() < 1e-5);
            assert!(z.im.abs() < 1e-5);
        }
    }

    #[test]
    fn dc_sample_is_the_grid_sum() {
        let dims = Dims::new(4, 4).unwrap();
        let data: Vec<_> = (0..16)
            .map(|i| Complex32::new(1.0 + i as f32, 0.0))
            .collect();
        let sum: f32 = data.iter().map(|z| z.re).sum();
        let mut grid = ComplexGrid::new(data, dims);
        Fft2::new(dims).forward(&mut grid);
        assert!((grid.samples()[0].re - sum).abs() < 1e-3);
        assert!(grid.samples()[0].im.abs() < 1e-3);
    }

    #[test]
    fn forward_inverse_round_trip() {
        let dims = Dims::new(16, 8).unwrap();
        let data: Vec<_> = (0..dims.len())
            .map(|i| Complex32::new(((i * 7 + 3) % 31) as f32 * 0.1, ((i * 5) % 17) as f32 * 0.2))
            .collect();
        let mut grid = ComplexGrid::new(data.clone(), dims);
        let fft = Fft2::new(dims);
        fft.forward(&mut grid);
        fft.inverse(&mut grid);
        for (z, z0) in grid.samples().iter().zip(&data) {
            assert!((z.re - z0.re).abs() < 1e-3, "{z} vs {z0}");
            assert!((z.im - z0.im).abs() < 1e-3, "{z} vs {z0}");
        }
    }
}
