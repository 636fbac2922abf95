//! Configuration for the Area window shell
//!
//! Loads configuration from TOML file at `~/.config/area/window.toml`
//! Auto-generates default config file on first run if missing.
//! Values are read at startup and on explicit reload only.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub summon: SummonConfig,
    pub decorations: DecorationConfig,
    pub accessibility: AccessibilityConfig,
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!("Config file not found at {:?}, using defaults", config_path);
            // Auto-generate default config file
            if let Err(e) = Self::save_default(&config_path) {
                warn!("Failed to create default config file: {}", e);
            }
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Parse a specific configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;

        info!("Configuration loaded from {:?}", path);
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Re-read the configuration file, keeping the current values on failure
    ///
    /// Returns whether anything changed.
    pub fn reload(&mut self) -> Result<bool> {
        let fresh = Self::load()?;
        let changed = fresh != *self;
        if changed {
            info!("Configuration changed on reload");
        }
        *self = fresh;
        Ok(changed)
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("area");

        Ok(config_dir.join("window.toml"))
    }

    /// Save default configuration to file
    pub fn save_default(path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;

        fs::write(path, toml_string)
            .context("Failed to write default config file")?;

        info!("Created default config file at {:?}", path);
        Ok(())
    }
}

/// How the window first appears
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchMode {
    #[default]
    Default,
    Maximized,
    Fullscreen,
    /// Borderless
    Focus,
    MaximizedFocus,
}

/// Monitor a summoned window moves to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorBehavior {
    /// Monitor of the window that had focus before the summon
    #[default]
    ToCurrent,
    /// Monitor under the mouse cursor
    ToMouse,
    /// Stay wherever the window is
    Any,
}

/// Requested color theme for frame and content
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

/// Window placement and behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub launch_mode: LaunchMode,
    pub always_on_top: bool,
    /// Hide or minimize the window when it loses focus
    pub auto_hide_window: bool,
    /// Hide instead of minimizing
    pub minimize_to_notification_area: bool,
    pub quake_mode: bool,
    pub center_on_launch: bool,
    /// Initial outer position in pixels; the OS chooses when unset
    pub initial_position: Option<[i32; 2]>,
    /// Initial client size in logical units
    pub initial_size: [f32; 2],
    pub theme: Theme,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Area".to_string(),
            launch_mode: LaunchMode::Default,
            always_on_top: false,
            auto_hide_window: false,
            minimize_to_notification_area: false,
            quake_mode: false,
            center_on_launch: false,
            initial_position: None,
            initial_size: [800.0, 600.0],
            theme: Theme::System,
        }
    }
}

/// Summon/dismiss behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummonConfig {
    /// Slide duration in milliseconds, 0 disables the animation
    pub dropdown_duration_ms: u32,
    /// Dismiss the window when summoned while already focused
    pub toggle_visibility: bool,
    pub monitor: MonitorBehavior,
}

impl Default for SummonConfig {
    fn default() -> Self {
        Self {
            dropdown_duration_ms: 200,
            toggle_visibility: true,
            monitor: MonitorBehavior::ToCurrent,
        }
    }
}

/// Window frame geometry at 96 DPI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecorationConfig {
    /// Titlebar height in pixels
    pub titlebar_height: u16,
    /// Visible border width in pixels
    pub border_width: u16,
    /// Invisible resize grab area in pixels
    pub resize_border: u16,
}

impl Default for DecorationConfig {
    fn default() -> Self {
        Self {
            titlebar_height: 32,
            border_width: 1,
            resize_border: 8,
        }
    }
}

/// Accessibility preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessibilityConfig {
    /// Skip slide animations
    pub reduce_motion: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("area").join("window.toml");
        Config::save_default(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("window.toml");
        fs::write(
            &path,
            r#"
[window]
launch_mode = "maximized_focus"
quake_mode = true
initial_position = [40, 60]

[summon]
monitor = "to_mouse"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.window.launch_mode, LaunchMode::MaximizedFocus);
        assert!(config.window.quake_mode);
        assert_eq!(config.window.initial_position, Some([40, 60]));
        assert_eq!(config.window.initial_size, [800.0, 600.0]);
        assert_eq!(config.summon.monitor, MonitorBehavior::ToMouse);
        assert_eq!(config.summon.dropdown_duration_ms, 200);
        assert_eq!(config.decorations, DecorationConfig::default());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("window.toml");
        fs::write(&path, "[window]\nlaunch_mode = \"sideways\"\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }
}
