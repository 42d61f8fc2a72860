use std::path::PathBuf;

use crate::entity::EntityId;

/// Building a grid
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    #[error("grid of {width}x{height} tiles is too large")]
    TooLarge { width: i32, height: i32 },
}

/// World operations that can be refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("position ({x}, {y}) is outside the map")]
    OutOfBounds { x: i32, y: i32 },

    #[error("position ({x}, {y}) is not empty")]
    NotEmpty { x: i32, y: i32 },

    #[error("entity {0:?} does not exist")]
    NoSuchEntity(EntityId),

    #[error("layout is {layout_width}x{layout_height} but the map is {width}x{height}")]
    LayoutTooLarge {
        layout_width: i32,
        layout_height: i32,
        width: i32,
        height: i32,
    },
}

/// Parsing a text layout
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("layout has no rows")]
    Empty,

    #[error("row {row} is {found} cells wide, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },

    #[error("unknown layout glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },

    #[error("tile type {0:?} is not registered")]
    MissingTileType(&'static str),

    #[error("light at ({x}, {y}) would stand on an impassable tile")]
    BlockedLight { x: i32, y: i32 },
}

/// Loading `config.toml`
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
