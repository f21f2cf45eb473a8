use crate::{aperture::ApertureError, config::ConfigError, render::RenderError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `config` module")]
    Config(#[from] ConfigError),
    #[error("Error in the `aperture` module")]
    Aperture(#[from] ApertureError),
    #[error("Error in the `render` module")]
    Render(#[from] RenderError),
    #[error("Failed to write the radiance picture")]
    Io(#[from] std::io::Error),
}
