//! Configuration for flourish.
//!
//! Settings live in `config.toml` inside the platform config directory
//! (for example `~/.config/flourish/config.toml` on Linux). A missing file
//! means defaults; every key is optional.

mod error;
mod layer;

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

pub use error::ConfigError;
pub use layer::{FieldOverrides, LayerConfig, LayerKind};

/// Highest accepted frame rate.
pub const MAX_FRAME_RATE: u32 = 240;

/// Smallest accepted cell size in surface units, per axis.
pub const MIN_CELL_SCALE: f32 = 1.0;

/// Top level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frames per second.
    pub frame_rate: u32,
    /// Default `tracing` filter, overridden by `RUST_LOG`.
    pub log_level: String,
    /// Surface units per terminal column and row.
    pub cell_scale: [f32; 2],
    pub ambient: LayerConfig,
    pub shapes: LayerConfig,
    pub particles: LayerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            log_level: "info".to_string(),
            cell_scale: [8.0, 16.0],
            ambient: LayerConfig::default(),
            shapes: LayerConfig::default(),
            particles: LayerConfig::default(),
        }
    }
}

impl Config {
    /// Platform specific project directories, if a home directory exists.
    pub fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "flourish")
    }

    /// Default location of the config file.
    pub fn default_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when there
    /// is no home directory or no file.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source: Box::new(source),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_FRAME_RATE).contains(&self.frame_rate) {
            return Err(ConfigError::Invalid(format!(
                "frame_rate must be between 1 and {MAX_FRAME_RATE}, got {}",
                self.frame_rate
            )));
        }
        if self
            .cell_scale
            .iter()
            .any(|s| !s.is_finite() || *s < MIN_CELL_SCALE)
        {
            return Err(ConfigError::Invalid(format!(
                "cell_scale must be finite and at least {MIN_CELL_SCALE}, got {:?}",
                self.cell_scale
            )));
        }
        for (kind, layer) in self.layers() {
            if !(0.0..=1.0).contains(&layer.layer_opacity) {
                return Err(ConfigError::Invalid(format!(
                    "{}.layer_opacity must be between 0 and 1, got {}",
                    kind.name(),
                    layer.layer_opacity
                )));
            }
            let invalid = layer.params(kind).invalid_settings();
            if !invalid.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{} has invalid settings: {}",
                    kind.name(),
                    invalid.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Layers from bottom to top.
    pub fn layers(&self) -> [(LayerKind, &LayerConfig); 3] {
        [
            (LayerKind::Ambient, &self.ambient),
            (LayerKind::Shapes, &self.shapes),
            (LayerKind::Particles, &self.particles),
        ]
    }

    pub fn layer(&self, kind: LayerKind) -> &LayerConfig {
        match kind {
            LayerKind::Ambient => &self.ambient,
            LayerKind::Shapes => &self.shapes,
            LayerKind::Particles => &self.particles,
        }
    }
}
