use std::sync::Arc;

use crate::entity::{EntityId, Emitters};
use crate::error::GridError;
use crate::light::{darken, lighten, TileLight};
use crate::shadowcast::{shadow_cast, FovMap, LightMap};
use crate::tiletype::{TileTypeRegistry, Visuals};

/// Basic unit of the map: a tile type, at most one occupant, the tick it was
/// last seen on and the light currently falling on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tile {
    pub tile_type: usize,
    /// Secondary look of the tile type, not used for light or sight
    pub variant: usize,
    entity: Option<EntityId>,
    pub last_visible: u64,
    pub light: TileLight,
}

impl Tile {
    pub fn new(tile_type: usize) -> Self {
        Tile { tile_type, ..Tile::default() }
    }

    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    pub fn passable(&self, registry: &TileTypeRegistry) -> bool {
        registry.is_passable(self.tile_type) && self.entity.is_none()
    }

    /// Only the tile type decides this, occupants never block light
    pub fn transparent(&self, registry: &TileTypeRegistry) -> bool {
        registry.is_transparent(self.tile_type)
    }

    pub fn empty(&self, registry: &TileTypeRegistry) -> bool {
        self.entity.is_none() && registry.is_passable(self.tile_type)
    }

    pub fn visuals(&self, registry: &TileTypeRegistry) -> Visuals {
        registry.visuals(self.tile_type)
    }
}

/// Fixed-size tile map. Every coordinate access is bounds-checked: reads off
/// the map give a zero tile and writes off the map are dropped.
#[derive(Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    registry: Arc<TileTypeRegistry>,
}

impl Grid {
    /// Create a grid of zero tiles (tile type 0)
    pub fn new(width: i32, height: i32, registry: Arc<TileTypeRegistry>) -> Result<Self, GridError> {
        if width <= 0 || height <= 0 {
            return Err(GridError::InvalidDimensions { width, height });
        }
        // Tile indices are computed in i32, so the whole grid has to fit in one
        let len = width.checked_mul(height).ok_or(GridError::TooLarge { width, height })?;

        Ok(Grid {
            width,
            height,
            tiles: vec![Tile::default(); len as usize],
            registry,
        })
    }

    /// Create a grid filled with one tile type
    pub fn filled(width: i32, height: i32, tile_type: usize, registry: Arc<TileTypeRegistry>) -> Result<Self, GridError> {
        let mut grid = Self::new(width, height, registry)?;
        for tile in &mut grid.tiles {
            tile.tile_type = tile_type;
        }
        Ok(grid)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn registry(&self) -> &TileTypeRegistry {
        &self.registry
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some((x + y * self.width) as usize)
        } else {
            None
        }
    }

    pub fn tile(&self, x: i32, y: i32) -> Tile {
        self.index(x, y).map_or(Tile::default(), |i| self.tiles[i])
    }

    pub fn set_tile(&mut self, x: i32, y: i32, tile: Tile) {
        if let Some(i) = self.index(x, y) {
            self.tiles[i] = tile;
        }
    }

    pub fn tile_type(&self, x: i32, y: i32) -> usize {
        self.tile(x, y).tile_type
    }

    pub fn change_tile_type(&mut self, x: i32, y: i32, tile_type: usize) {
        if let Some(i) = self.index(x, y) {
            self.tiles[i].tile_type = tile_type;
        }
    }

    /// Set the colour of the light on a tile
    pub fn change_tile_colour(&mut self, x: i32, y: i32, colour: u32) {
        if let Some(i) = self.index(x, y) {
            self.tiles[i].light.colour = colour;
        }
    }

    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map_or(false, |i| self.tiles[i].passable(&self.registry))
    }

    pub fn is_empty(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map_or(false, |i| self.tiles[i].empty(&self.registry))
    }

    pub fn entity(&self, x: i32, y: i32) -> Option<EntityId> {
        self.index(x, y).and_then(|i| self.tiles[i].entity)
    }

    pub fn light(&self, x: i32, y: i32) -> TileLight {
        self.tile(x, y).light
    }

    pub fn last_visible(&self, x: i32, y: i32) -> u64 {
        self.tile(x, y).last_visible
    }

    /// Record the tick on which (x, y) was last seen
    pub fn set_visible(&mut self, x: i32, y: i32, tick: u64) {
        if let Some(i) = self.index(x, y) {
            self.tiles[i].last_visible = tick;
        }
    }

    /// Reset every tile's brightness to 0, leaving colours alone.
    ///
    /// Lighten and darken only stay balanced while every add has a matching
    /// remove, so callers re-light from scratch once per frame.
    pub fn clear_lights(&mut self) {
        for tile in &mut self.tiles {
            tile.light.bright = 0;
        }
    }

    /// Put `id` on (x, y) and light the area around it with the entity's
    /// radius. Refused off the map or on an occupied tile.
    pub fn add_entity<E: Emitters + ?Sized>(&mut self, x: i32, y: i32, id: EntityId, emitters: &E) -> bool {
        let Some(i) = self.index(x, y) else {
            return false;
        };
        if self.tiles[i].entity.is_some() {
            tracing::warn!(?id, x, y, "tile already occupied, entity not placed");
            return false;
        }

        self.tiles[i].entity = Some(id);
        let radius = emitters.light_radius(id);
        tracing::trace!(?id, x, y, radius, "lighten");
        shadow_cast(self, x, y, radius, lighten::<Grid>);
        true
    }

    /// Take the occupant off (x, y), darkening its light first. This is the
    /// only way an occupant handle is cleared.
    pub fn remove_entity<E: Emitters + ?Sized>(&mut self, x: i32, y: i32, emitters: &E) -> Option<EntityId> {
        let i = self.index(x, y)?;
        let id = self.tiles[i].entity?;

        // The radius has to be read while the occupant is still attached
        let radius = emitters.light_radius(id);
        tracing::trace!(?id, x, y, radius, "darken");
        shadow_cast(self, x, y, radius, darken::<Grid>);
        self.tiles[i].entity = None;
        Some(id)
    }

    /// Move the occupant of (x, y) by (dx, dy): a full remove followed by an
    /// add at the new position. Refused when there is nothing to move or the
    /// destination is off the map or occupied, leaving the map untouched.
    pub fn move_entity<E: Emitters + ?Sized>(&mut self, x: i32, y: i32, dx: i32, dy: i32, emitters: &E) -> bool {
        let (to_x, to_y) = (x + dx, y + dy);
        if self.entity(x, y).is_none() || !self.in_bounds(to_x, to_y) {
            return false;
        }
        if (dx, dy) != (0, 0) && self.entity(to_x, to_y).is_some() {
            return false;
        }

        match self.remove_entity(x, y, emitters) {
            Some(id) => self.add_entity(to_x, to_y, id, emitters),
            None => false,
        }
    }
}

impl FovMap for Grid {
    fn dims(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn is_transparent(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map_or(false, |i| self.tiles[i].transparent(&self.registry))
    }
}

impl LightMap for Grid {
    fn apply_light(&mut self, x: i32, y: i32, delta: i32) {
        if let Some(i) = self.index(x, y) {
            let light = &mut self.tiles[i].light;
            light.bright = (light.bright + delta).max(0);
        }
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("tile_types", &self.registry.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, EntityArena};

    fn registry() -> Arc<TileTypeRegistry> {
        Arc::new(TileTypeRegistry::with_builtin())
    }

    fn floor_grid(width: i32, height: i32) -> Grid {
        let registry = registry();
        let floor = registry.find("Floor").unwrap();
        Grid::filled(width, height, floor, registry).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        assert_eq!(
            Grid::new(0, 5, registry()).unwrap_err(),
            GridError::InvalidDimensions { width: 0, height: 5 }
        );
        assert!(Grid::new(4, -1, registry()).is_err());
    }

    #[test]
    fn test_rejects_oversized_dimensions() {
        assert_eq!(
            Grid::new(65_536, 65_536, registry()).unwrap_err(),
            GridError::TooLarge { width: 65_536, height: 65_536 }
        );
        assert!(Grid::filled(i32::MAX, 2, 1, registry()).is_err());
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut grid = floor_grid(4, 3);
        assert_eq!(grid.tile(-1, 0), Tile::default());
        assert_eq!(grid.tile(4, 0), Tile::default());
        assert_eq!(grid.tile(0, 3), Tile::default());

        grid.set_tile(10, 10, Tile::new(2));
        grid.change_tile_type(-5, 1, 2);
        grid.set_visible(4, 3, 99);
        grid.apply_light(7, 0, 100);
        assert!(grid.tiles().iter().all(|t| t.tile_type == 1 && t.last_visible == 0 && t.light.bright == 0));

        assert!(!grid.is_transparent(-1, -1));
        assert!(!grid.is_passable(4, 0));
        assert!(!grid.is_empty(0, 3));
        assert_eq!(grid.entity(99, 99), None);
    }

    #[test]
    fn test_tile_type_changes() {
        let mut grid = floor_grid(3, 3);
        let wall = grid.registry().find("Wall").unwrap();
        grid.change_tile_type(1, 1, wall);
        assert_eq!(grid.tile_type(1, 1), wall);
        assert!(!grid.is_transparent(1, 1));
        assert!(!grid.is_passable(1, 1));
        assert!(grid.is_transparent(0, 0));
    }

    #[test]
    fn test_occupant_blocks_movement_not_light() {
        let mut grid = floor_grid(3, 3);
        let mut arena = EntityArena::new();
        let id = arena.insert(Entity::new("statue", 'S', 0));
        assert!(grid.add_entity(1, 1, id, &arena));

        assert!(!grid.is_passable(1, 1));
        assert!(!grid.is_empty(1, 1));
        assert!(grid.is_transparent(1, 1));
        assert_eq!(grid.entity(1, 1), Some(id));
    }

    #[test]
    fn test_add_entity_lights_area() {
        let mut grid = floor_grid(7, 7);
        let mut arena = EntityArena::new();
        let lamp = arena.insert(Entity::new("lamp", '*', 3));
        assert!(grid.add_entity(3, 3, lamp, &arena));

        assert_eq!(grid.light(3, 3).bright, 255);
        // d = 1, r² = 9: 255 - trunc(28.33)
        assert_eq!(grid.light(4, 3).bright, 227);
        // d = 8: 255 - trunc(226.67)
        assert_eq!(grid.light(5, 5).bright, 29);
        assert_eq!(grid.light(6, 3).bright, 0);
    }

    #[test]
    fn test_add_to_occupied_tile_is_refused() {
        let mut grid = floor_grid(5, 5);
        let mut arena = EntityArena::new();
        let a = arena.insert(Entity::new("a", 'a', 2));
        let b = arena.insert(Entity::new("b", 'b', 2));
        assert!(grid.add_entity(2, 2, a, &arena));
        let before = grid.clone();
        assert!(!grid.add_entity(2, 2, b, &arena));
        assert_eq!(grid.entity(2, 2), Some(a));
        assert_eq!(grid.tiles(), before.tiles());
        assert!(!grid.add_entity(-1, 2, b, &arena));
    }

    #[test]
    fn test_remove_entity_restores_darkness() {
        let mut grid = floor_grid(9, 9);
        let mut arena = EntityArena::new();
        let lamp = arena.insert(Entity::new("lamp", '*', 4));
        grid.add_entity(4, 4, lamp, &arena);
        assert_eq!(grid.remove_entity(4, 4, &arena), Some(lamp));

        assert!(grid.tiles().iter().all(|t| t.light.bright == 0));
        assert_eq!(grid.entity(4, 4), None);
        assert_eq!(grid.remove_entity(4, 4, &arena), None);
    }

    #[test]
    fn test_move_entity_matches_remove_then_add() {
        let mut arena = EntityArena::new();
        let lamp = arena.insert(Entity::new("lamp", '*', 5));
        let torch = arena.insert(Entity::new("torch", '!', 3));

        let mut moved = floor_grid(12, 12);
        let wall = moved.registry().find("Wall").unwrap();
        moved.change_tile_type(7, 3, wall);
        moved.add_entity(8, 8, torch, &arena);
        moved.add_entity(5, 5, lamp, &arena);
        let mut manual = moved.clone();

        assert!(moved.move_entity(5, 5, 1, -1, &arena));
        let id = manual.remove_entity(5, 5, &arena).unwrap();
        assert!(manual.add_entity(6, 4, id, &arena));

        assert_eq!(moved.tiles(), manual.tiles());
        assert_eq!(moved.entity(6, 4), Some(lamp));
        assert_eq!(moved.entity(5, 5), None);
    }

    #[test]
    fn test_refused_moves_leave_map_untouched() {
        let mut grid = floor_grid(5, 5);
        let mut arena = EntityArena::new();
        let a = arena.insert(Entity::new("a", 'a', 2));
        let b = arena.insert(Entity::new("b", 'b', 2));
        grid.add_entity(0, 0, a, &arena);
        grid.add_entity(1, 0, b, &arena);
        let before = grid.clone();

        assert!(!grid.move_entity(0, 0, -1, 0, &arena));
        assert!(!grid.move_entity(0, 0, 1, 0, &arena));
        assert!(!grid.move_entity(3, 3, 1, 0, &arena));
        assert_eq!(grid.tiles(), before.tiles());
    }

    #[test]
    fn test_clear_lights_keeps_colour() {
        let mut grid = floor_grid(5, 5);
        grid.change_tile_colour(2, 2, 0xFFFF_0000);
        grid.apply_light(2, 2, 400);
        grid.clear_lights();
        assert_eq!(grid.light(2, 2), TileLight { colour: 0xFFFF_0000, bright: 0 });
    }
}
