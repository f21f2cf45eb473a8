/*!
# Fraunhofer

This library simulates far-field diffraction of light through a lens aperture
and renders the resulting point-spread function as a spectral, tone-mapped
Radiance picture.

## Pipeline

- [`PixmapLoader`] reads a PNM pixel-map into an [`ApertureMask`]
- [`Fft2`] runs a 2-D radix-2 FFT over the mask, row pass then column pass
- [`DiffractionField`] collapses the frequency plane into a centered,
  lens-distance-scaled intensity field
- [`Renderer`] integrates wavelength samples against the CIE 1931 observer
  ([`SpectralCurve`]), weighted by the field, into an [`Accumulator`]
- [`RadianceWriter`] tone-maps the resolved image and writes the RGBE/XYZE
  records

## Usage

```rust,no_run
use fraunhofer::{
    Config, DiffractionField, Fft2, PixmapLoader, RadianceWriter, Renderer, Sampling,
    SpectralCurve,
};

let config = Config::from_path("fraunhofer.toml")?;
let mask = PixmapLoader::new("aperture.ppm")
    .threshold(config.lens.threshold)
    .load()?;

let fft = Fft2::new(mask.dims());
let mut grid = mask.into_grid();
fft.forward(&mut grid);

let field = DiffractionField::new(&grid, config.lens.distance);
let image = Renderer::new(&field, SpectralCurve::cie_1931())
    .sampling(Sampling::from_samples(16)?)
    .render()
    .resolve();

let mut out = std::io::BufWriter::new(std::fs::File::create("image.hdr")?);
RadianceWriter::new().write(&mut out, &image)?;
# Ok::<(), anyhow::Error>(())
```
*/

pub mod aperture;
pub mod color;
pub mod config;
pub mod diffraction;
mod error;
pub mod fourier;
pub mod radiance;
pub mod render;
pub mod spectrum;

pub use aperture::{ApertureMask, PixmapLoader};
pub use config::Config;
pub use diffraction::DiffractionField;
pub use error::Error;
pub use fourier::{Dims, Fft2};
pub use radiance::{RadianceImage, RadianceWriter};
pub use render::{Accumulator, Renderer, Sampling};
pub use spectrum::SpectralCurve;
