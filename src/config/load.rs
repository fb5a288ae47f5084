use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then environment variables
/// (prefix `VINYL__`) on top, and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("VINYL")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err("audio.volume must be within 0.0..=1.0".to_string());
        }
        if !(self.audio.volume_step > 0.0) {
            return Err("audio.volume_step must be > 0".to_string());
        }
        let fft = self.visualizer.fft_size;
        if !fft.is_power_of_two() || !(32..=32768).contains(&fft) {
            return Err("visualizer.fft_size must be a power of two in 32..=32768".to_string());
        }
        if !(0.0..=1.0).contains(&self.visualizer.smoothing) {
            return Err("visualizer.smoothing must be within 0.0..=1.0".to_string());
        }
        if !(self.visualizer.min_db < self.visualizer.max_db) {
            return Err("visualizer.min_db must be below visualizer.max_db".to_string());
        }
        Ok(())
    }

    /// Render the settings as TOML (used by `--print-config`).
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Resolve the config path from `VINYL_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("VINYL_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/vinyl/config.toml`
/// or `~/.config/vinyl/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("vinyl").join("config.toml"))
}

/// Compute the default log path under `$XDG_STATE_HOME/vinyl/vinyl.log`
/// or `~/.local/state/vinyl/vinyl.log`.
pub fn default_log_path() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("vinyl").join("vinyl.log"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
