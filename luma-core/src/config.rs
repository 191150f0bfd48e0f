//! World configuration loaded from a JSON5 file.

use std::{fs, path::Path};

use serde::Deserialize;

use crate::{chunk::chunk_map::Dimension, error::ConfigError};

const DEFAULT_CONFIG: &str = include_str!("../../package-content/luma_config.json5");

/// Vertical layout and engine tuning of a light world.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LightConfig {
    /// Lowest section height, inclusive.
    pub min_section: i32,
    /// Highest section height, inclusive.
    pub max_section: i32,
    /// Whether open sky produces sky light.
    pub sky_light: bool,
    /// Initial slots of each propagation queue.
    pub queue_capacity: usize,
}

impl LightConfig {
    /// Reads the config at `path`, writing the bundled default there first if it is missing.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            let config_str = fs::read_to_string(path)?;
            serde_json5::from_str::<LightConfig>(&config_str)?
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, DEFAULT_CONFIG)?;
            log::info!("Wrote default config to {}", path.display());
            serde_json5::from_str::<LightConfig>(DEFAULT_CONFIG)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses a config from a JSON5 string.
    pub fn from_json5(source: &str) -> Result<Self, ConfigError> {
        let config: LightConfig = serde_json5::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_section > self.max_section {
            return Err(ConfigError::Invalid(
                "min_section must not be greater than max_section",
            ));
        }
        if i64::from(self.max_section) - i64::from(self.min_section) >= 64 {
            return Err(ConfigError::Invalid("A world may have at most 64 sections"));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid("queue_capacity must be positive"));
        }
        Ok(())
    }

    /// The vertical layout described by this config.
    #[must_use]
    pub const fn dimension(&self) -> Dimension {
        Dimension {
            min_section: self.min_section,
            max_section: self.max_section,
            has_sky_light: self.sky_light,
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        let dimension = Dimension::default();
        Self {
            min_section: dimension.min_section,
            max_section: dimension.max_section,
            sky_light: dimension.has_sky_light,
            queue_capacity: 4096,
        }
    }
}
