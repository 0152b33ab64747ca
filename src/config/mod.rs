//! Configuration file management
//!
//! Loads TOML configuration files and provides runtime tunables.
//! Default config path: ~/.config/padmap/config.toml
//!
//! The mapping table is fixed in code; only device paths, timing,
//! and helper commands are configurable.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Device settings
    pub device: DeviceConfig,
    /// Mouse emulation settings
    pub mouse: MouseConfig,
    /// Output framing settings
    pub emitter: EmitterConfig,
    /// External helper commands
    pub helpers: HelperConfig,
    /// Menu selector settings
    pub menu: MenuConfig,
}

/// Device settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Controller event node, e.g. "/dev/input/event5" (overridden by --input)
    pub path: Option<PathBuf>,
    /// Name the virtual device registers under
    pub name: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            path: None,
            name: "padmap virtual device".to_string(),
        }
    }
}

/// Mouse emulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MouseConfig {
    /// Distance of the first motion step
    pub base_step: i32,
    /// Added to the step on every tick while a direction stays held
    pub step_increment: i32,
    /// Motion tick interval in milliseconds
    pub tick_ms: u64,
    /// Poll timeout while mouse emulation is idle
    pub idle_timeout_ms: u64,
}

impl Default for MouseConfig {
    fn default() -> Self {
        Self {
            base_step: 2,
            step_increment: 1,
            tick_ms: 10,
            idle_timeout_ms: 10_000,
        }
    }
}

impl MouseConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

/// Output framing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// Pause after pressing meta, in milliseconds
    pub meta_delay_ms: u64,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self { meta_delay_ms: 100 }
    }
}

impl EmitterConfig {
    pub fn meta_delay(&self) -> Duration {
        Duration::from_millis(self.meta_delay_ms)
    }
}

/// External helper commands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelperConfig {
    /// Shell used for every helper and menu command
    pub shell: String,
    /// Command that briefly outlines the focused window
    pub outline: String,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            shell: "/bin/sh".to_string(),
            outline: "outline-current-window -t 200 -w 2".to_string(),
        }
    }
}

/// Menu selector settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    /// Selector command; `{window}` is replaced by the focused window id
    pub selector: String,
    /// Extra arguments for menus rendered as a vertical list
    pub vertical_args: String,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            selector: "dmenu -w {window}".to_string(),
            vertical_args: "-l 20".to_string(),
        }
    }
}

impl Config {
    /// System-wide config path
    const SYSTEM_CONFIG_PATH: &'static str = "/etc/padmap/config.toml";

    /// Get the path that would be used for loading config
    /// Returns None if using built-in defaults
    pub fn config_path() -> Option<PathBuf> {
        // 1. PADMAP_CONFIG environment variable
        if let Ok(path) = std::env::var("PADMAP_CONFIG") {
            let p = Path::new(&path);
            if p.exists() {
                return Some(p.to_path_buf());
            }
            warn!("PADMAP_CONFIG points to a missing file: {}", path);
        }

        // 2. User config: ~/.config/padmap/config.toml
        if let Some(config_path) = default_config_path() {
            if config_path.exists() {
                return Some(config_path);
            }
        }

        // 3. System config: /etc/padmap/config.toml
        let system_config = Path::new(Self::SYSTEM_CONFIG_PATH);
        if system_config.exists() {
            return Some(system_config.to_path_buf());
        }

        None
    }

    /// Load configuration with priority:
    /// 1. PADMAP_CONFIG environment variable
    /// 2. ~/.config/padmap/config.toml (user config)
    /// 3. /etc/padmap/config.toml (system config)
    /// 4. Built-in defaults
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            match Self::load_from_file(&path) {
                Ok(config) => {
                    info!("Loaded config: {}", path.display());
                    return config;
                }
                Err(e) => {
                    warn!("Failed to load config {}: {:#}", path.display(), e);
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load settings from specified path
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Render the defaults as a commented TOML template
    pub fn default_template() -> Result<String> {
        let body = toml::to_string_pretty(&Self::default())
            .context("Failed to serialize default config")?;
        Ok(format!(
            "# padmap configuration\n\
             #\n\
             # [device] path: controller event node (or pass --input PATH)\n\
             # [menu] selector: {{window}} is replaced by the focused window id\n\n{}",
            body
        ))
    }

    /// Write the default config to `path`
    ///
    /// Refuses to overwrite an existing file unless `force` is set.
    pub fn write_default(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            anyhow::bail!(
                "Config file already exists: {} (use --force to overwrite)",
                path.display()
            );
        }
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        std::fs::write(path, Self::default_template()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Get default config file path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("padmap").join("config.toml"))
}
