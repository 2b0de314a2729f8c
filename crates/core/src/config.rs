//! Application configuration.
//!
//! Values are layered: built-in defaults, then `config.toml` in the user's
//! config directory, then `PAIRMATCH_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    catalog::LessonCatalog,
    timer::{DEFAULT_REVEAL_DELAY, DEFAULT_TICK_INTERVAL},
};

/// Directory under the platform config dir holding `config.toml`.
pub const CONFIG_DIR_NAME: &str = "pairmatch";

const DEFAULT_CONFIG: &str = r#"# pairmatch configuration

# Milliseconds a judged pair stays on screen before the board accepts input.
reveal_delay_ms = 1000

# Milliseconds between clock ticks.
tick_interval_ms = 1000

# Optional JSON lesson catalog replacing the built-in lessons.
# lessons_path = "/path/to/lessons.json"

# Directory for pairmatch.log.
log_dir = "logs"

# Cards per row.
columns = 4
"#;

/// Runtime settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Reveal window after a two-card attempt, in milliseconds.
    pub reveal_delay_ms: u64,
    /// Clock period in milliseconds.
    pub tick_interval_ms: u64,
    /// Lesson catalog file; the built-in lessons are used when unset.
    #[serde(default)]
    pub lessons_path: Option<PathBuf>,
    /// Where the log file goes.
    pub log_dir: PathBuf,
    /// Number of card columns in the board.
    pub columns: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reveal_delay_ms: DEFAULT_REVEAL_DELAY.as_millis() as u64,
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            lessons_path: None,
            log_dir: PathBuf::from("logs"),
            columns: 4,
        }
    }
}

impl AppConfig {
    /// Load from the default config file location and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(config_path())
    }

    /// Load using `path` as the config file. A missing file is not an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("reveal_delay_ms", defaults.reveal_delay_ms as i64)?
            .set_default("tick_interval_ms", defaults.tick_interval_ms as i64)?
            .set_default("log_dir", defaults.log_dir.to_string_lossy().to_string())?
            .set_default("columns", defaults.columns as i64)?
            .add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix("PAIRMATCH"))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        let config: Self = settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        config.validate()?;
        info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.columns == 0 {
            bail!("columns must be at least 1");
        }
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be greater than 0");
        }
        Ok(())
    }

    /// Reveal window as a duration.
    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    /// Clock period as a duration.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// The configured lesson catalog, falling back to the built-in one.
    pub fn catalog(&self) -> Result<LessonCatalog> {
        match &self.lessons_path {
            Some(path) => LessonCatalog::load(path),
            None => Ok(LessonCatalog::builtin()),
        }
    }
}

/// Path of the user config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
        .join("config.toml")
}

/// Write a commented default config file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(config_path())
}

/// Write the default config to `path` unless the file already exists.
pub fn ensure_default_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::tempdir;

    // Loading reads process-wide env vars.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_guard() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let _env = env_guard();
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.reveal_delay(), Duration::from_secs(1));
        Ok(())
    }

    #[test]
    fn default_file_round_trips_to_defaults() -> Result<()> {
        let _env = env_guard();
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("config.toml");
        ensure_default_config_at(&path)?;
        assert!(path.exists());

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config, AppConfig::default());
        Ok(())
    }

    #[test]
    fn existing_file_is_left_alone() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "columns = 3\n")?;
        ensure_default_config_at(&path)?;
        assert_eq!(fs::read_to_string(&path)?, "columns = 3\n");
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let _env = env_guard();
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "reveal_delay_ms = 250\ncolumns = 3\nlessons_path = \"lessons.json\"\n",
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.reveal_delay(), Duration::from_millis(250));
        assert_eq!(config.columns, 3);
        assert_eq!(config.lessons_path, Some(PathBuf::from("lessons.json")));
        assert_eq!(config.tick_interval_ms, 1000);
        Ok(())
    }

    #[test]
    fn zero_columns_are_rejected() -> Result<()> {
        let _env = env_guard();
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "columns = 0\n")?;
        assert!(AppConfig::load_from(&path).is_err());
        Ok(())
    }

    #[test]
    fn environment_overrides_file() -> Result<()> {
        let _env = env_guard();
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "columns = 3\nreveal_delay_ms = 250\n")?;

        std::env::set_var("PAIRMATCH_COLUMNS", "6");
        let loaded = AppConfig::load_from(&path);
        std::env::remove_var("PAIRMATCH_COLUMNS");

        let config = loaded?;
        assert_eq!(config.columns, 6);
        assert_eq!(config.reveal_delay_ms, 250);
        Ok(())
    }

    #[test]
    fn catalog_defaults_to_builtin() -> Result<()> {
        let catalog = AppConfig::default().catalog()?;
        assert_eq!(catalog, LessonCatalog::builtin());
        Ok(())
    }
}
