use serde::Deserialize;
use std::{env, fs, io, path::Path};

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

/// Ambient settings only. The agents take no input for their core
/// behavior, so every field is optional and a missing file selects the
/// defaults; payload constants and cadences are never configurable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path =
            env::var("SIMULATOR_CONFIG").unwrap_or_else(|_| "simulator-config.toml".to_string());
        Self::load_from_path(Path::new(&path))
    }

    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            // Only an absent file selects the defaults; a present but
            // unreadable one must surface.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        let cfg: AppConfig = toml::from_str(&contents)?;
        Ok(cfg)
    }
}
