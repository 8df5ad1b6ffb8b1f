//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    color::{Argb, DEFAULT_FALLBACK_SEED, quantizer::QuantizerOptions},
    theme::{ThemeSettings, validate_seed},
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "ALBUM_THEME_CONFIG_PATH";
const DEFAULT_PLAYER_PATH: &str = "/player";
const DEFAULT_SSE_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Seed used when artwork yields no vibrant swatch.
    pub fallback_seed: Argb,
    /// Quantizer tuning.
    pub quantizer: QuantizerOptions,
    /// Directory relative artwork paths are resolved against.
    pub artwork_root: PathBuf,
    /// Navigation path on which the title bar uses the container accent.
    pub player_path: String,
    /// Dark-mode flag before the first preference update.
    pub dark_mode: bool,
    /// Capacity of the SSE broadcast channel.
    pub sse_capacity: usize,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(app_config) => {
                    info!(
                        path = %path.display(),
                        fallback_seed = %app_config.fallback_seed,
                        artwork_root = %app_config.artwork_root.display(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document; absent keys take their defaults.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }

    /// Settings handed to the theme controller.
    pub fn theme_settings(&self) -> ThemeSettings {
        ThemeSettings {
            quantizer: self.quantizer,
            fallback_seed: self.fallback_seed,
            initial_dark: self.dark_mode,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    fallback_seed: Option<Argb>,
    quantizer: QuantizerOptions,
    artwork_root: Option<PathBuf>,
    title_bar: RawTitleBar,
    dark_mode: bool,
    sse_capacity: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawTitleBar {
    player_path: Option<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let fallback_seed = match value.fallback_seed.map(validate_seed) {
            Some(Ok(seed)) => seed,
            Some(Err(err)) => {
                warn!(error = %err, "ignoring configured fallback seed");
                DEFAULT_FALLBACK_SEED
            }
            None => DEFAULT_FALLBACK_SEED,
        };

        Self {
            fallback_seed,
            quantizer: value.quantizer,
            artwork_root: value.artwork_root.unwrap_or_else(|| PathBuf::from(".")),
            player_path: value
                .title_bar
                .player_path
                .unwrap_or_else(|| DEFAULT_PLAYER_PATH.to_string()),
            dark_mode: value.dark_mode,
            sse_capacity: value.sse_capacity.unwrap_or(DEFAULT_SSE_CAPACITY).max(1),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
