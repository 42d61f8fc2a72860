/// Handle to an entity owned by an `EntityArena`. Tiles store these instead
/// of references, so a destroyed entity can never dangle from the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub usize);

/// Something that can stand on a tile and emit light
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub name: String,
    pub glyph: char,
    /// Radius of the light this entity carries, 0 for none
    pub light_radius: i32,
}

impl Entity {
    pub fn new(name: &str, glyph: char, light_radius: i32) -> Self {
        Entity {
            name: name.to_string(),
            glyph,
            light_radius,
        }
    }
}

/// Anything that can tell the grid how far an entity's light reaches
pub trait Emitters {
    fn light_radius(&self, id: EntityId) -> i32;
}

/// Owns every entity. Ids are slot indices and are never reused, so a stale
/// id simply resolves to nothing.
#[derive(Debug, Clone, Default)]
pub struct EntityArena {
    slots: Vec<Option<Entity>>,
}

impl EntityArena {
    pub fn new() -> Self {
        EntityArena { slots: Vec::new() }
    }

    pub fn insert(&mut self, entity: Entity) -> EntityId {
        self.slots.push(Some(entity));
        EntityId(self.slots.len() - 1)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.slots.get_mut(id.0).and_then(Option::take)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Live entities in id order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|e| (EntityId(i), e)))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Emitters for EntityArena {
    fn light_radius(&self, id: EntityId) -> i32 {
        self.get(id).map_or(0, |e| e.light_radius)
    }
}
