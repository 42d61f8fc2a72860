use std::fmt;

use crate::error::LayoutError;
use crate::grid::Grid;
use crate::tiletype::{TileTypeRegistry, TILE_NOTHING};

/// One cell of a text layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutCell {
    Nothing,
    Floor,
    Wall,
    Window,
    Door,
}

impl LayoutCell {
    fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            ' ' => Some(LayoutCell::Nothing),
            '.' | '@' => Some(LayoutCell::Floor),
            '#' => Some(LayoutCell::Wall),
            '"' => Some(LayoutCell::Window),
            '+' => Some(LayoutCell::Door),
            _ => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            LayoutCell::Nothing => ' ',
            LayoutCell::Floor => '.',
            LayoutCell::Wall => '#',
            LayoutCell::Window => '"',
            LayoutCell::Door => '+',
        }
    }

    /// Name of the registry tile type this cell maps to
    pub fn tile_name(self) -> &'static str {
        match self {
            LayoutCell::Nothing => "Nothing",
            LayoutCell::Floor => "Floor",
            LayoutCell::Wall => "Wall",
            LayoutCell::Window => "Window",
            LayoutCell::Door => "Door",
        }
    }

    const ALL: [LayoutCell; 5] = [
        LayoutCell::Nothing,
        LayoutCell::Floor,
        LayoutCell::Wall,
        LayoutCell::Window,
        LayoutCell::Door,
    ];
}

/// Map layout in the plain text format used by fixtures, the clipboard and
/// the dump tool.
///
/// Format:
/// - `#`: wall
/// - `.`: floor
/// - `"`: window (see-through, blocks movement)
/// - `+`: door (walkable, blocks sight)
/// - `@`: floor with a light source on it
/// - space: nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub width: i32,
    pub height: i32,
    /// Row-major, `width * height` cells
    pub cells: Vec<LayoutCell>,
    /// Positions marked `@`, in reading order
    pub lights: Vec<(i32, i32)>,
}

impl Layout {
    /// Parse a layout. Blank lines before and after the map are ignored; all
    /// rows must be the same width.
    pub fn parse(text: &str) -> Result<Self, LayoutError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .skip_while(|line| line.trim().is_empty())
            .collect();
        let end = rows.iter().rposition(|line| !line.trim().is_empty()).ok_or(LayoutError::Empty)?;
        let rows = &rows[..=end];

        let width = rows[0].chars().count();
        let mut cells = Vec::with_capacity(width * rows.len());
        let mut lights = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(LayoutError::Ragged { row: y, expected: width, found });
            }
            for (x, glyph) in row.chars().enumerate() {
                let cell = LayoutCell::from_glyph(glyph).ok_or(LayoutError::UnknownGlyph { glyph, x, y })?;
                if glyph == '@' {
                    lights.push((x as i32, y as i32));
                }
                cells.push(cell);
            }
        }

        Ok(Layout {
            width: width as i32,
            height: rows.len() as i32,
            cells,
            lights,
        })
    }

    pub fn cell(&self, x: i32, y: i32) -> LayoutCell {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return LayoutCell::Nothing;
        }
        self.cells[(x + y * self.width) as usize]
    }

    /// Registry ids for every layout cell kind, failing if one is missing
    fn tile_ids(registry: &TileTypeRegistry) -> Result<[usize; 5], LayoutError> {
        let mut ids = [TILE_NOTHING; 5];
        for (slot, cell) in ids.iter_mut().zip(LayoutCell::ALL) {
            *slot = registry.find(cell.tile_name()).ok_or(LayoutError::MissingTileType(cell.tile_name()))?;
        }
        Ok(ids)
    }

    /// Check that `registry` can hold this layout: every cell kind is
    /// registered and the floor under each `@` can take a light source
    pub fn check(&self, registry: &TileTypeRegistry) -> Result<(), LayoutError> {
        Self::tile_ids(registry)?;
        let floor = registry.find(LayoutCell::Floor.tile_name()).unwrap_or(TILE_NOTHING);
        match self.lights.first() {
            Some(&(x, y)) if !registry.is_passable(floor) => Err(LayoutError::BlockedLight { x, y }),
            _ => Ok(()),
        }
    }

    /// Write the layout's tile types into the top-left of `grid`. Cells that
    /// fall off the grid are dropped.
    pub fn paint(&self, grid: &mut Grid) -> Result<(), LayoutError> {
        let ids = Self::tile_ids(grid.registry())?;
        for y in 0..self.height {
            for x in 0..self.width {
                let cell = self.cell(x, y);
                let slot = LayoutCell::ALL.iter().position(|c| *c == cell).unwrap_or(0);
                grid.change_tile_type(x, y, ids[slot]);
            }
        }
        Ok(())
    }

    /// Read a layout back out of a grid. Tiles holding a light source become
    /// `@`; tile types outside the layout vocabulary read as nothing.
    pub fn capture(grid: &Grid, is_light: impl Fn(i32, i32) -> bool) -> Self {
        let registry = grid.registry();
        let mut cells = Vec::with_capacity((grid.width() * grid.height()) as usize);
        let mut lights = Vec::new();

        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let name = registry.name(grid.tile_type(x, y));
                let cell = LayoutCell::ALL
                    .into_iter()
                    .find(|c| c.tile_name() == name)
                    .unwrap_or(LayoutCell::Nothing);
                if is_light(x, y) {
                    lights.push((x, y));
                }
                cells.push(cell);
            }
        }

        Layout {
            width: grid.width(),
            height: grid.height(),
            cells,
            lights,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let glyph = if self.lights.contains(&(x, y)) { '@' } else { self.cell(x, y).glyph() };
                write!(f, "{}", glyph)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
