use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub map: MapConfig,
    #[serde(default)]
    pub lighting: LightingConfig,
    #[serde(default)]
    pub visual: VisualConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Tile types to register, in id order after "Nothing"
    #[serde(default)]
    pub tiles: Vec<TileTypeConfig>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MapConfig {
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    /// Seed for the world RNG (random placement)
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Optional text layout to load at startup
    #[serde(default)]
    pub layout_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LightingConfig {
    /// Radius given to lamps placed from layouts or by hand
    #[serde(default = "default_lamp_radius")]
    pub lamp_radius: i32,
    #[serde(default = "default_player_radius")]
    pub player_radius: i32,
    /// How far the player can see lit tiles
    #[serde(default = "default_sight_radius")]
    pub sight_radius: i32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VisualConfig {
    #[serde(default = "default_window_title")]
    pub window_title: String,
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    #[serde(default = "default_background")]
    pub background: [u8; 3],
    /// Brightness used for tiles that were seen before but are dark now
    #[serde(default = "default_remembered_level")]
    pub remembered_level: u8,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TileTypeConfig {
    pub name: String,
    #[serde(default)]
    pub passable: bool,
    #[serde(default)]
    pub transparent: bool,
    #[serde(default)]
    pub glyph: u32,
    /// Packed ARGB
    #[serde(default = "default_tile_colour")]
    pub colour: u32,
}

// Default values
fn default_width() -> i32 { 40 }
fn default_height() -> i32 { 30 }
fn default_seed() -> u64 { 7 }
fn default_lamp_radius() -> i32 { 8 }
fn default_player_radius() -> i32 { 5 }
fn default_sight_radius() -> i32 { 20 }
fn default_window_title() -> String { "tilelight".to_string() }
fn default_cell_size() -> f32 { 20.0 }
fn default_background() -> [u8; 3] { [20, 20, 24] }
fn default_remembered_level() -> u8 { 40 }
fn default_log_filter() -> String { "info".to_string() }
fn default_tile_colour() -> u32 { 0xFFFF_FFFF }

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            seed: default_seed(),
            layout_path: None,
        }
    }
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            lamp_radius: default_lamp_radius(),
            player_radius: default_player_radius(),
            sight_radius: default_sight_radius(),
        }
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            cell_size: default_cell_size(),
            background: default_background(),
            remembered_level: default_remembered_level(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            lighting: LightingConfig::default(),
            visual: VisualConfig::default(),
            logging: LoggingConfig::default(),
            tiles: Vec::new(),
        }
    }
}

impl Config {
    /// Load `config.toml` from the working directory, or use defaults if it
    /// is missing or broken
    pub fn load() -> Self {
        let path = Path::new("config.toml");
        if !path.exists() {
            tracing::info!("no config.toml found, using default configuration");
            return Config::default();
        }

        match Self::from_path(path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded configuration");
                config
            }
            Err(e) => {
                tracing::warn!("{}, using default configuration", e);
                Config::default()
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
