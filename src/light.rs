use crate::grid::Grid;
use crate::shadowcast::LightMap;

/// Brightness of a source at its own tile
pub const MAX_BRIGHT: i32 = 255;

/// Light carried by a single tile
///
/// `bright` is a running sum of every source currently lighting the tile. It
/// never drops below 0, but overlapping sources can push it past 255 until
/// the next `clear_lights`, so readers should go through `level()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileLight {
    /// Packed ARGB
    pub colour: u32,
    pub bright: i32,
}

impl TileLight {
    /// Brightness saturated to the displayable range
    pub fn level(&self) -> u8 {
        self.bright.clamp(0, MAX_BRIGHT) as u8
    }

    pub fn is_lit(&self) -> bool {
        self.bright > 0
    }
}

/// Contribution of a source of radius `radius` to a cell at squared
/// distance `dist_sq`. Linear in squared distance: 255 at the source, falling
/// towards 0 at the radius.
pub fn falloff(dist_sq: i32, radius: i32) -> i32 {
    let r_sq = radius as i64 * radius as i64;
    if radius <= 0 {
        return 0;
    }
    MAX_BRIGHT - (MAX_BRIGHT as f32 * dist_sq as f32 / r_sq as f32) as i32
}

/// Cast that adds a source's falloff to the visited tile
pub fn lighten<M: LightMap>(map: &mut M, x: i32, y: i32, dist_sq: i32, radius: i32) {
    map.apply_light(x, y, falloff(dist_sq, radius));
}

/// Cast that takes a source's falloff back out of the visited tile
pub fn darken<M: LightMap>(map: &mut M, x: i32, y: i32, dist_sq: i32, radius: i32) {
    map.apply_light(x, y, -falloff(dist_sq, radius));
}

/// Cast that records every visited tile which is empty (passable, no
/// occupant). Used for random placement rather than lighting.
pub fn collect_empty_spaces(spaces: &mut Vec<(i32, i32)>) -> impl FnMut(&mut Grid, i32, i32, i32, i32) + '_ {
    move |grid: &mut Grid, x: i32, y: i32, _: i32, _: i32| {
        if grid.is_empty(x, y) {
            spaces.push((x, y));
        }
    }
}

/// Cast that stamps `tick` as the last-seen time of every visited tile that
/// currently has light on it
pub fn stamp_visible(tick: u64) -> impl FnMut(&mut Grid, i32, i32, i32, i32) {
    move |grid: &mut Grid, x: i32, y: i32, _: i32, _: i32| {
        if grid.light(x, y).is_lit() {
            grid.set_visible(x, y, tick);
        }
    }
}

/// Pack r, g, b, a into an ARGB colour
pub fn make_colour(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

pub fn make_opaque_colour(r: u8, g: u8, b: u8) -> u32 {
    make_colour(r, g, b, 255)
}

/// Split an ARGB colour into (r, g, b, a)
pub fn rgba(colour: u32) -> (u8, u8, u8, u8) {
    (
        (colour >> 16 & 0xFF) as u8,
        (colour >> 8 & 0xFF) as u8,
        (colour & 0xFF) as u8,
        (colour >> 24) as u8,
    )
}

/// Multiply blend a colour with a grey of the given level. Alpha is kept.
pub fn shade(colour: u32, level: u8) -> u32 {
    let (r, g, b, a) = rgba(colour);
    let scale = |c: u8| (c as u32 * level as u32 / 255) as u8;
    make_colour(scale(r), scale(g), scale(b), a)
}
