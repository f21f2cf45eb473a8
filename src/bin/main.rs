use std::{fs::File, io::BufWriter, path::PathBuf, time::Instant};

use anyhow::Context;
use structopt::StructOpt;

use fraunhofer::{
    Config, DiffractionField, Fft2, PixmapLoader, RadianceWriter, Renderer, Sampling,
    SpectralCurve,
};

#[derive(Debug, StructOpt)]
#[structopt(name = "fraunhofer", about = "Rendering lens aperture diffraction")]
struct Opt {
    /// Path to the aperture pixel-map ("P3" or "P6")
    aperture: PathBuf,
    /// Path to the Radiance picture written out
    image: PathBuf,
    /// Number of wavelength samples
    samples: usize,
    /// Path to the settings file
    #[structopt(short, long, default_value = "fraunhofer.toml")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let opt = Opt::from_args();
    let config = Config::from_path(&opt.config)
        .with_context(|| format!("failed to load the settings from {:?}", opt.config))?;
    let sampling = Sampling::from_samples(opt.samples)?;
    let pool = config.compute.thread_pool()?;

    let mask = PixmapLoader::new(&opt.aperture)
        .threshold(config.lens.threshold)
        .load()
        .with_context(|| format!("failed to load the aperture from {:?}", opt.aperture))?;
    let dims = mask.dims();
    log::info!(
        "aperture: {}x{} pixels, threshold: {}",
        dims.x,
        dims.y,
        config.lens.threshold
    );

    let image = pool.install(|| {
        let now = Instant::now();
        let fft = Fft2::new(dims);
        let mut grid = mask.into_grid();
        fft.forward(&mut grid);
        log::info!("aperture transformed in {:.3}s", now.elapsed().as_secs_f64());

        let field = DiffractionField::new(&grid, config.lens.distance);

        let now = Instant::now();
        let accumulator = Renderer::new(&field, SpectralCurve::cie_1931())
            .sampling(sampling)
            .render();
        log::info!(
            "{} wavelength samples rendered in {:.3}s",
            sampling.samples(),
            now.elapsed().as_secs_f64()
        );
        accumulator.resolve()
    });

    let mut writer = RadianceWriter::new();
    if let Some(color_space) = config.output.color_space {
        writer = writer.color_system(color_space.system());
    }
    let mut out = BufWriter::new(
        File::create(&opt.image)
            .with_context(|| format!("failed to create the picture file {:?}", opt.image))?,
    );
    writer.write(&mut out, &image)?;
    log::info!("picture written to {:?}", opt.image);
    Ok(())
}
