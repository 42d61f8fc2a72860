use std::collections::HashSet;

/// A map the shadowcaster can see through
pub trait FovMap {
    /// (width, height)
    fn dims(&self) -> (i32, i32);

    fn in_bounds(&self, x: i32, y: i32) -> bool {
        let (width, height) = self.dims();
        x >= 0 && x < width && y >= 0 && y < height
    }

    /// Whether light and sight pass through (x, y). Out of bounds is opaque.
    fn is_transparent(&self, x: i32, y: i32) -> bool;
}

/// A map that also stores accumulated light
pub trait LightMap: FovMap {
    /// Add `delta` to the brightness at (x, y), flooring the result at 0.
    /// Out of bounds is ignored.
    fn apply_light(&mut self, x: i32, y: i32, delta: i32);
}

/// Rotation/reflection coefficients mapping the canonical octant scan onto
/// each of the 8 octants. Order and the alternating cull below go together:
/// each octant boundary line is shared by one culled and one unculled pass.
const OCTANTS: [[i32; 4]; 8] = [
    [1, 0, 0, 1],
    [-1, 0, 0, 1],
    [0, -1, 1, 0],
    [0, -1, -1, 0],
    [-1, 0, 0, -1],
    [1, 0, 0, -1],
    [0, 1, -1, 0],
    [0, 1, 1, 0],
];

/// Recursive shadowcasting field of view.
///
/// Calls `cast(map, x, y, dist_sq, radius)` once for the origin (with
/// distance 0) and once for every cell that is within `radius` (strictly,
/// `dist_sq < radius²`) and in line of sight through transparent cells.
/// Opaque cells that stop sight are visited themselves, so walls get lit.
/// Cells off the map are skipped. `radius <= 0` visits nothing, not even the
/// origin.
pub fn shadow_cast<M, F>(map: &mut M, x: i32, y: i32, radius: i32, mut cast: F)
where
    M: FovMap,
    F: FnMut(&mut M, i32, i32, i32, i32),
{
    if radius <= 0 {
        return;
    }

    cast(map, x, y, 0, radius);

    // Past this many rows every cell of every octant is off the map
    let (width, height) = map.dims();
    let reach = x.max((width - 1).saturating_sub(x)).max(y).max((height - 1).saturating_sub(y)).max(0);
    let radius_sq = radius as i64 * radius as i64;

    for (i, octant) in OCTANTS.iter().enumerate() {
        let scan = OctantScan {
            origin_x: x,
            origin_y: y,
            radius,
            radius_sq,
            last_row: radius.min(reach),
            matrix: *octant,
            cull: i % 2 == 1,
        };
        scan.scan(map, 1, 1.0, 0.0, &mut cast);
    }
}

/// Set of cells visited by a cast from (x, y)
pub fn field_of_view<M: FovMap>(map: &mut M, x: i32, y: i32, radius: i32) -> HashSet<(i32, i32)> {
    let mut visible = HashSet::new();
    shadow_cast(map, x, y, radius, |_, cx, cy, _, _| {
        visible.insert((cx, cy));
    });
    visible
}

struct OctantScan {
    origin_x: i32,
    origin_y: i32,
    radius: i32,
    radius_sq: i64,
    last_row: i32,
    matrix: [i32; 4],
    /// Skip cells on the octant's edge lines, the neighbouring octant visits them
    cull: bool,
}

impl OctantScan {
    fn scan<M, F>(&self, map: &mut M, row: i32, mut start_slope: f32, end_slope: f32, cast: &mut F)
    where
        M: FovMap,
        F: FnMut(&mut M, i32, i32, i32, i32),
    {
        if start_slope < end_slope {
            return;
        }

        let r = self.matrix;
        let mut blocked = false;
        let mut j = row;

        while j <= self.last_row && !blocked {
            let dy = -j;
            let mut new_start = start_slope;

            for dx in -j..=0 {
                let mx = self.origin_x + dx * r[0] + dy * r[1];
                let my = self.origin_y + dx * r[2] + dy * r[3];
                if !map.in_bounds(mx, my) {
                    continue;
                }

                let l_slope = (dx as f32 - 0.5) / (dy as f32 + 0.5);
                let r_slope = (dx as f32 + 0.5) / (dy as f32 - 0.5);

                if new_start < r_slope {
                    continue;
                } else if end_slope > l_slope {
                    break;
                }

                let dist_sq = dx as i64 * dx as i64 + dy as i64 * dy as i64;
                if dist_sq < self.radius_sq && !(self.cull && (dx == 0 || dy == 0 || dx == dy)) {
                    let dist_sq = i32::try_from(dist_sq).unwrap_or(i32::MAX);
                    cast(map, mx, my, dist_sq, self.radius);
                }

                let transparent = map.is_transparent(mx, my);
                if blocked {
                    if transparent {
                        blocked = false;
                        start_slope = new_start;
                    } else {
                        new_start = r_slope;
                    }
                } else if !transparent && j < self.radius {
                    blocked = true;
                    self.scan(map, j + 1, new_start, l_slope, cast);
                    new_start = r_slope;
                }
            }

            j += 1;
        }
    }
}
