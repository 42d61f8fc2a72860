use crate::config::TileTypeConfig;

/// Id of the placeholder tile type every registry starts with
pub const TILE_NOTHING: usize = 0;

/// Glyph and foreground colour used to draw a tile type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Visuals {
    pub glyph: u32,
    /// Packed ARGB
    pub fore_colour: u32,
}

#[derive(Debug, Clone)]
pub struct TileTypeData {
    pub name: String,
    pub passable: bool,
    pub transparent: bool,
    pub visuals: Visuals,
}

/// Append-only table of tile types, indexed by tile type id.
///
/// Populated once before any grid is built and shared read-only afterwards.
/// Lookups with an id that was never registered fall back to an impassable,
/// opaque, blank tile instead of failing.
#[derive(Debug, Clone)]
pub struct TileTypeRegistry {
    types: Vec<TileTypeData>,
}

impl TileTypeRegistry {
    /// Create a registry holding only the "Nothing" placeholder at id 0
    pub fn new() -> Self {
        TileTypeRegistry {
            types: vec![TileTypeData {
                name: "Nothing".to_string(),
                passable: false,
                transparent: true,
                visuals: Visuals::default(),
            }],
        }
    }

    /// Registry with the tile set the viewer and layouts use out of the box
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.load_tile_type("Floor", true, true, Visuals { glyph: '.' as u32, fore_colour: 0xFF88_8888 });
        registry.load_tile_type("Wall", false, false, Visuals { glyph: '#' as u32, fore_colour: 0xFFCC_CCCC });
        registry.load_tile_type("Window", false, true, Visuals { glyph: '"' as u32, fore_colour: 0xFF00_FFFF });
        registry.load_tile_type("Door", true, false, Visuals { glyph: '+' as u32, fore_colour: 0xFF80_8000 });
        registry
    }

    /// Build a registry from `[[tiles]]` config entries, falling back to the
    /// built-in set when none are given
    pub fn from_config(tiles: &[TileTypeConfig]) -> Self {
        if tiles.is_empty() {
            return Self::with_builtin();
        }

        let mut registry = Self::new();
        for tile in tiles {
            registry.load_tile_type(
                &tile.name,
                tile.passable,
                tile.transparent,
                Visuals { glyph: tile.glyph, fore_colour: tile.colour },
            );
        }
        registry
    }

    /// Append a tile type and return its id
    pub fn load_tile_type(&mut self, name: &str, passable: bool, transparent: bool, visuals: Visuals) -> usize {
        self.types.push(TileTypeData {
            name: name.to_string(),
            passable,
            transparent,
            visuals,
        });
        self.types.len() - 1
    }

    pub fn is_passable(&self, id: usize) -> bool {
        self.types.get(id).map_or(false, |t| t.passable)
    }

    pub fn is_transparent(&self, id: usize) -> bool {
        self.types.get(id).map_or(false, |t| t.transparent)
    }

    pub fn visuals(&self, id: usize) -> Visuals {
        self.types.get(id).map_or(Visuals::default(), |t| t.visuals)
    }

    pub fn name(&self, id: usize) -> &str {
        self.types.get(id).map_or("Unknown", |t| t.name.as_str())
    }

    /// Look up a tile type id by name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.types.iter().position(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Never true in practice, id 0 is always registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TileTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
