pub mod config;
pub mod entity;
pub mod error;
pub mod grid;
pub mod layout;
pub mod light;
pub mod shadowcast;
pub mod tiletype;
pub mod world;

pub use config::Config;
pub use entity::{Emitters, Entity, EntityArena, EntityId};
pub use error::{ConfigError, GridError, LayoutError, WorldError};
pub use grid::{Grid, Tile};
pub use layout::{Layout, LayoutCell};
pub use light::{darken, falloff, lighten, TileLight, MAX_BRIGHT};
pub use shadowcast::{field_of_view, shadow_cast, FovMap, LightMap};
pub use tiletype::{TileTypeRegistry, Visuals, TILE_NOTHING};
pub use world::World;
