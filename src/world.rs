use std::collections::BTreeMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::Config;
use crate::entity::{Entity, EntityArena, EntityId};
use crate::error::WorldError;
use crate::grid::Grid;
use crate::layout::Layout;
use crate::light::{collect_empty_spaces, lighten, stamp_visible};
use crate::shadowcast::{shadow_cast, FovMap};
use crate::tiletype::{TileTypeRegistry, TILE_NOTHING};

/// Everything one simulation needs: the tile registry, the map, the
/// entities standing on it and the RNG used for placement. Nothing here is
/// global, so independent worlds can live side by side.
#[derive(Debug)]
pub struct World {
    registry: Arc<TileTypeRegistry>,
    grid: Grid,
    entities: EntityArena,
    /// Where each placed entity stands
    positions: BTreeMap<EntityId, (i32, i32)>,
    rng: ChaCha8Rng,
    tick: u64,
}

impl World {
    /// A world of `width` x `height` tiles of type 0
    pub fn new(width: i32, height: i32, registry: Arc<TileTypeRegistry>, seed: u64) -> Result<Self, WorldError> {
        let grid = Grid::new(width, height, Arc::clone(&registry))?;
        Ok(World {
            registry,
            grid,
            entities: EntityArena::new(),
            positions: BTreeMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: 0,
        })
    }

    /// A world sized and seeded from config, floored with "Floor" when the
    /// configured tile set has one
    pub fn from_config(config: &Config) -> Result<Self, WorldError> {
        let registry = Arc::new(TileTypeRegistry::from_config(&config.tiles));
        let floor = registry.find("Floor").unwrap_or(TILE_NOTHING);
        let mut world = Self::new(config.map.width, config.map.height, registry, config.map.seed)?;
        world.fill(floor);
        Ok(world)
    }

    /// Set every tile to `tile_type`
    pub fn fill(&mut self, tile_type: usize) {
        for y in 0..self.grid.height() {
            for x in 0..self.grid.width() {
                self.grid.change_tile_type(x, y, tile_type);
            }
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Change the terrain under (x, y). Light is not recomputed until the
    /// next `relight`.
    pub fn change_tile_type(&mut self, x: i32, y: i32, tile_type: usize) {
        self.grid.change_tile_type(x, y, tile_type);
    }

    pub fn registry(&self) -> &TileTypeRegistry {
        &self.registry
    }

    pub fn entities(&self) -> &EntityArena {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn position(&self, id: EntityId) -> Option<(i32, i32)> {
        self.positions.get(&id).copied()
    }

    /// Placed entities and where they stand, in id order
    pub fn placed(&self) -> impl Iterator<Item = (EntityId, (i32, i32))> + '_ {
        self.positions.iter().map(|(id, pos)| (*id, *pos))
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Add `entity` to the world on (x, y), lighting its surroundings
    pub fn spawn(&mut self, entity: Entity, x: i32, y: i32) -> Result<EntityId, WorldError> {
        if !self.grid.in_bounds(x, y) {
            return Err(WorldError::OutOfBounds { x, y });
        }
        if !self.grid.is_empty(x, y) {
            return Err(WorldError::NotEmpty { x, y });
        }

        let name = entity.name.clone();
        let id = self.entities.insert(entity);
        self.grid.add_entity(x, y, id, &self.entities);
        self.positions.insert(id, (x, y));
        tracing::debug!(?id, %name, x, y, "spawned");
        Ok(id)
    }

    /// Take an entity off the map (darkening its light) and out of the world
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        if let Some((x, y)) = self.positions.remove(&id) {
            self.grid.remove_entity(x, y, &self.entities);
        }
        let entity = self.entities.remove(id);
        if entity.is_some() {
            tracing::debug!(?id, "despawned");
        }
        entity
    }

    /// Move an entity by (dx, dy) if the destination is passable
    pub fn step(&mut self, id: EntityId, dx: i32, dy: i32) -> bool {
        let Some((x, y)) = self.position(id) else {
            return false;
        };
        let (to_x, to_y) = (x + dx, y + dy);
        if !self.grid.is_passable(to_x, to_y) {
            return false;
        }

        let moved = self.grid.move_entity(x, y, dx, dy, &self.entities);
        if moved {
            self.positions.insert(id, (to_x, to_y));
        }
        moved
    }

    /// Change how far an entity's light reaches, re-lighting the map around it
    pub fn set_light_radius(&mut self, id: EntityId, radius: i32) -> Result<(), WorldError> {
        if !self.entities.contains(id) {
            return Err(WorldError::NoSuchEntity(id));
        }

        let position = self.position(id);
        if let Some((x, y)) = position {
            self.grid.remove_entity(x, y, &self.entities);
        }
        if let Some(entity) = self.entities.get_mut(id) {
            entity.light_radius = radius;
        }
        if let Some((x, y)) = position {
            self.grid.add_entity(x, y, id, &self.entities);
        }
        Ok(())
    }

    /// Throw away the accumulated light field and light it again from every
    /// placed entity. Run once per frame to keep the field from drifting.
    pub fn relight(&mut self) {
        self.grid.clear_lights();
        for (&id, &(x, y)) in &self.positions {
            let radius = self.entities.get(id).map_or(0, |e| e.light_radius);
            shadow_cast(&mut self.grid, x, y, radius, lighten::<Grid>);
        }
        tracing::debug!(sources = self.positions.len(), "relit");
    }

    /// Pick a random empty tile in sight of (x, y) within `radius`
    pub fn random_empty_space(&mut self, x: i32, y: i32, radius: i32) -> Option<(i32, i32)> {
        let mut spaces = Vec::new();
        shadow_cast(&mut self.grid, x, y, radius, collect_empty_spaces(&mut spaces));
        spaces.choose(&mut self.rng).copied()
    }

    /// Advance the tick and mark the lit tiles `id` can see within `radius`
    /// as seen on the new tick
    pub fn observe(&mut self, id: EntityId, radius: i32) -> u64 {
        self.tick += 1;
        if let Some((x, y)) = self.position(id) {
            shadow_cast(&mut self.grid, x, y, radius, stamp_visible(self.tick));
        }
        self.tick
    }

    /// Remove every entity, paint `layout` onto the map and put a lamp of
    /// `lamp_radius` on each of its `@` cells. A layout that cannot be loaded
    /// is rejected before anything is removed.
    pub fn load_layout(&mut self, layout: &Layout, lamp_radius: i32) -> Result<Vec<EntityId>, WorldError> {
        if layout.width > self.grid.width() || layout.height > self.grid.height() {
            return Err(WorldError::LayoutTooLarge {
                layout_width: layout.width,
                layout_height: layout.height,
                width: self.grid.width(),
                height: self.grid.height(),
            });
        }
        layout.check(&self.registry)?;

        let ids: Vec<EntityId> = self.positions.keys().copied().collect();
        for id in ids {
            self.despawn(id);
        }
        self.grid.clear_lights();
        layout.paint(&mut self.grid)?;

        let mut lamps = Vec::with_capacity(layout.lights.len());
        for &(x, y) in &layout.lights {
            lamps.push(self.spawn(Entity::new("lamp", '*', lamp_radius), x, y)?);
        }
        tracing::debug!(width = layout.width, height = layout.height, lamps = lamps.len(), "layout loaded");
        Ok(lamps)
    }

    /// The current map as a text layout, marking light-carrying entities `@`
    pub fn to_layout(&self) -> Layout {
        Layout::capture(&self.grid, |x, y| {
            self.grid
                .entity(x, y)
                .and_then(|id| self.entities.get(id))
                .map_or(false, |e| e.light_radius > 0)
        })
    }
}
