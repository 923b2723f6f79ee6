//! Simulation configuration.
//!
//! Settings loaded from an INI file. Defaults are safe to start with; values
//! missing from the file keep their current value.
//!
//! # Configuration File Format
//!
//! ```ini
//! [simulation]
//! step = 0.008333333333333333
//! time_stretch = 1
//! collision_radius = 256
//!
//! [forces]
//! gravity_x = 0
//! gravity_y = -900
//! wind_x = 0
//! wind_y = 0
//!
//! [run]
//! seconds = 5
//! fps = 60
//! seed = 1
//! ```

use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

use crate::error::{EngineError, EngineResult};
use crate::resources::worldtime::DEFAULT_STEP;

/// Default safe values for startup
const DEFAULT_TIME_STRETCH: f64 = 1.0;
const DEFAULT_GRAVITY_Y: f64 = -900.0;
const DEFAULT_RUN_SECONDS: f64 = 5.0;
const DEFAULT_RUN_FPS: f64 = 60.0;
const DEFAULT_SEED: u64 = 1;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Fixed simulation step in seconds.
    pub step: f64,
    /// Multiplier applied to real time before accumulation.
    pub time_stretch: f64,
    /// Maximum centre distance at which pairs are tested. `None` is unlimited.
    pub collision_radius: Option<f64>,
    pub gravity_x: f64,
    pub gravity_y: f64,
    pub wind_x: f64,
    pub wind_y: f64,
    /// Demo run length in seconds of real time.
    pub seconds: f64,
    /// Demo render rate; also the real delta per frame.
    pub fps: f64,
    /// Demo random seed.
    pub seed: u64,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            step: DEFAULT_STEP,
            time_stretch: DEFAULT_TIME_STRETCH,
            collision_radius: None,
            gravity_x: 0.0,
            gravity_y: DEFAULT_GRAVITY_Y,
            wind_x: 0.0,
            wind_y: 0.0,
            seconds: DEFAULT_RUN_SECONDS,
            fps: DEFAULT_RUN_FPS,
            seed: DEFAULT_SEED,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values. On error `self`
    /// is left untouched.
    pub fn load_from_file(&mut self) -> EngineResult<()> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| EngineError::Config(format!("Failed to load config file: {}", e)))?;

        let float = |section: &str, key: &str| -> EngineResult<Option<f64>> {
            config
                .getfloat(section, key)
                .map_err(|e| EngineError::Config(format!("[{section}] {key}: {e}")))
        };
        let mut next = self.clone();

        // [simulation] section
        if let Some(step) = float("simulation", "step")? {
            if step <= 0.0 {
                return Err(EngineError::Config(format!(
                    "[simulation] step must be positive, got {step}"
                )));
            }
            next.step = step;
        }
        if let Some(stretch) = float("simulation", "time_stretch")? {
            next.time_stretch = stretch;
        }
        if let Some(radius) = float("simulation", "collision_radius")? {
            next.collision_radius = Some(radius);
        }

        // [forces] section
        if let Some(v) = float("forces", "gravity_x")? {
            next.gravity_x = v;
        }
        if let Some(v) = float("forces", "gravity_y")? {
            next.gravity_y = v;
        }
        if let Some(v) = float("forces", "wind_x")? {
            next.wind_x = v;
        }
        if let Some(v) = float("forces", "wind_y")? {
            next.wind_y = v;
        }

        // [run] section
        if let Some(v) = float("run", "seconds")? {
            next.seconds = v;
        }
        if let Some(v) = float("run", "fps")? {
            next.fps = v;
        }
        if let Some(seed) = config
            .getuint("run", "seed")
            .map_err(|e| EngineError::Config(format!("[run] seed: {e}")))?
        {
            next.seed = seed;
        }

        *self = next;
        info!(
            "Loaded config: step={}, time_stretch={}, gravity=({}, {}), wind=({}, {})",
            self.step,
            self.time_stretch,
            self.gravity_x,
            self.gravity_y,
            self.wind_x,
            self.wind_y
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> EngineResult<()> {
        let mut config = Ini::new();

        // [simulation] section
        config.set("simulation", "step", Some(self.step.to_string()));
        config.set("simulation", "time_stretch", Some(self.time_stretch.to_string()));
        if let Some(radius) = self.collision_radius {
            config.set("simulation", "collision_radius", Some(radius.to_string()));
        }

        // [forces] section
        config.set("forces", "gravity_x", Some(self.gravity_x.to_string()));
        config.set("forces", "gravity_y", Some(self.gravity_y.to_string()));
        config.set("forces", "wind_x", Some(self.wind_x.to_string()));
        config.set("forces", "wind_y", Some(self.wind_y.to_string()));

        // [run] section
        config.set("run", "seconds", Some(self.seconds.to_string()));
        config.set("run", "fps", Some(self.fps.to_string()));
        config.set("run", "seed", Some(self.seed.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| EngineError::Config(format!("Failed to save config file: {}", e)))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_keys_keep_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[forces]\ngravity_y = -10\n").expect("write");
        let mut config = GameConfig::with_path(file.path());
        config.load_from_file().expect("load");
        assert_eq!(config.gravity_y, -10.0);
        assert_eq!(config.step, DEFAULT_STEP);
        assert_eq!(config.collision_radius, None);
    }

    #[test]
    fn save_then_load_restores_values() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.ini");
        let saved = GameConfig {
            step: 0.01,
            collision_radius: Some(128.0),
            wind_x: 3.5,
            seed: 42,
            ..GameConfig::with_path(&path)
        };
        saved.save_to_file().expect("save");

        let mut loaded = GameConfig::with_path(&path);
        loaded.load_from_file().expect("load");
        assert_eq!(loaded, saved);
    }

    #[test]
    fn unreadable_file_is_a_config_error() {
        let mut config = GameConfig::with_path("/nonexistent/scrollkit.ini");
        assert!(matches!(config.load_from_file(), Err(EngineError::Config(_))));
    }

    #[test]
    fn non_positive_step_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[simulation]\nstep = 0\n").expect("write");
        let mut config = GameConfig::with_path(file.path());
        assert!(config.load_from_file().is_err());
    }

    #[test]
    fn malformed_seed_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[run]\nseed = lucky\n").expect("write");
        let mut config = GameConfig::with_path(file.path());
        assert!(matches!(config.load_from_file(), Err(EngineError::Config(_))));
        assert_eq!(config.seed, DEFAULT_SEED);
    }

    #[test]
    fn failed_load_leaves_earlier_sections_unapplied() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[simulation]\nstep = 0.02\n\n[forces]\ngravity_y = down\n").expect("write");
        let mut config = GameConfig::with_path(file.path());
        assert!(config.load_from_file().is_err());
        assert_eq!(config, GameConfig::with_path(file.path()));
    }
}
