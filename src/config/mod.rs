// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use std::path::{Path, PathBuf};

/// Load configuration from an optional file (YAML or JSON) overlaid with
/// the process environment. A missing file is not an error; a missing
/// `WORDPRESS_API_BASE_URL` is.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();

    let builder = config::Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(environment());

    from_builder(builder)
        .with_context(|| format!("Failed to load configuration (file: {})", path.display()))
}

/// Variables already present in the process take precedence over `.env`.
/// Returns the path of the file that was read, if any.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Environment layer. Values stay strings until a typed field asks for
/// more, so opaque values such as `SECRET_KEY` are passed through as given.
pub fn environment() -> Environment {
    Environment::default()
}

/// Resolve a prepared source stack into a validated [`Config`].
pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Config> {
    let raw: RawConfig = builder
        .build()
        .context("Failed to read configuration sources")?
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Config::try_from(raw)
}
