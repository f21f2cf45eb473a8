//! Run settings: compute pool, lens geometry and output color space.
//!
//! Settings load from a TOML file and are validated before any compute stage
//! allocates, so a bad lens distance or thread count stops the run up front.

use std::{fs, path::{Path, PathBuf}};

use serde::Deserialize;

use crate::color::ColorSpace;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read the settings file {1:?}")]
    Io(#[source] std::io::Error, PathBuf),
    #[error("failed to parse the settings")]
    Parse(#[from] toml::de::Error),
    #[error("the lens distance must be positive, not {0}")]
    LensDistance(f32),
    #[error("the aperture threshold must lie in [0,1], not {0}")]
    Threshold(f32),
    #[error("the compute pool needs at least one thread")]
    NoThreads,
    #[error("failed to build the compute pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub compute: Compute,
    pub lens: Lens,
    #[serde(default)]
    pub output: Output,
}

/// Compute pool selection; without a thread count the pool sizes itself to
/// the host.
#[derive(Debug, Default, Deserialize)]
pub struct Compute {
    pub threads: Option<usize>,
}
impl Compute {
    pub fn thread_pool(&self) -> Result<rayon::ThreadPool, ConfigError> {
        Ok(rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads.unwrap_or(0))
            .build()?)
    }
}

#[derive(Debug, Deserialize)]
pub struct Lens {
    /// Distance to the image plane; scales the diffraction spread.
    pub distance: f32,
    /// Aperture threshold, 1 keeps the continuous mask.
    #[serde(default = "default_threshold")]
    pub threshold: f32,
}

fn default_threshold() -> f32 {
    1f32
}

#[derive(Debug, Default, Deserialize)]
pub struct Output {
    /// Display color system; absent means untransformed XYZ output.
    pub color_space: Option<ColorSpace>,
}

impl Config {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(e, path.to_path_buf()))?;
        Self::parse(&text)
    }
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()
    }
    fn validate(self) -> Result<Self, ConfigError> {
        if !(self.lens.distance > 0f32) {
            return Err(ConfigError::LensDistance(self.lens.distance));
        }
        if !(0f32..=1f32).contains(&self.lens.threshold) {
            return Err(ConfigError::Threshold(self.lens.threshold));
        }
        if self.compute.threads == Some(0) {
            return Err(ConfigError::NoThreads);
        }
        Ok(self)
    }
}
