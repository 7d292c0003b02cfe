use crate::{Error, Result};
use chrono::Duration;
use rumtrace_engine::{DEFAULT_SESSION_TIMEOUT_SECS, EngineConfig, RateSampler};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Resolve the configuration file path based on priority:
/// 1. Explicit path (with tilde expansion)
/// 2. RUMTRACE_CONFIG environment variable (with tilde expansion)
/// 3. XDG config directory
/// 4. ~/.rumtrace/config.toml (fallback for systems without XDG)
pub fn resolve_config_path(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var("RUMTRACE_CONFIG") {
        return Ok(expand_tilde(&env_path));
    }

    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join("rumtrace").join("config.toml"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".rumtrace").join("config.toml"));
    }

    Err(Error::Config(
        "Could not determine config path: no HOME directory or XDG config directory found"
            .to_string(),
    ))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

/// On-disk configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inactivity gap that closes a session
    pub session_timeout_secs: u64,
    pub track_background_events: bool,
    pub track_background_long_tasks: bool,
    /// Percentage of sessions recorded, 0 to 100
    pub session_sample_rate: f64,
    /// Period of the timeout ticker; 0 disables it
    pub timeout_tick_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_timeout_secs: DEFAULT_SESSION_TIMEOUT_SECS as u64,
            track_background_events: false,
            track_background_long_tasks: false,
            session_sample_rate: 100.0,
            timeout_tick_interval_ms: 60_000,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::default_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> Result<PathBuf> {
        resolve_config_path(None)
    }

    pub fn validate(&self) -> Result<()> {
        if self.session_timeout_secs == 0 {
            return Err(Error::Config(
                "session_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.session_timeout().is_none() {
            return Err(Error::Config(format!(
                "session_timeout_secs is out of range: {}",
                self.session_timeout_secs
            )));
        }
        if !(0.0..=100.0).contains(&self.session_sample_rate) {
            return Err(Error::Config(format!(
                "session_sample_rate must be between 0 and 100, got {}",
                self.session_sample_rate
            )));
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        let timeout = self
            .session_timeout()
            .unwrap_or_else(|| Duration::seconds(DEFAULT_SESSION_TIMEOUT_SECS));

        EngineConfig::default()
            .with_session_timeout(timeout)
            .with_background_events(self.track_background_events)
            .with_background_long_tasks(self.track_background_long_tasks)
    }

    fn session_timeout(&self) -> Option<Duration> {
        i64::try_from(self.session_timeout_secs)
            .ok()
            .and_then(Duration::try_seconds)
    }

    pub fn sampler(&self) -> RateSampler {
        RateSampler::new(self.session_sample_rate)
    }

    /// `None` when the ticker is disabled.
    pub fn tick_interval(&self) -> Option<std::time::Duration> {
        (self.timeout_tick_interval_ms > 0)
            .then(|| std::time::Duration::from_millis(self.timeout_tick_interval_ms))
    }
}
