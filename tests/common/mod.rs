#![allow(dead_code)]

use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tilelight::{Grid, TileTypeRegistry};

/// Visibility fixture read from `test_data/standard`
#[derive(Debug, Clone)]
pub struct FovCase {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub radius: i32,
    pub origin: (i32, i32),
    pub walls: Vec<(i32, i32)>,
    /// Every cell the cast should visit, origin included
    pub expected: HashSet<(i32, i32)>,
}

/// Light field fixture read from `test_data/*.json`
#[derive(Debug, Clone, Deserialize)]
pub struct LightCase {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub walls: Vec<(i32, i32)>,
    pub lamps: Vec<LampData>,
    #[serde(rename = "expectedBright")]
    pub expected_bright: Vec<Vec<i32>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LampData {
    pub x: i32,
    pub y: i32,
    pub radius: i32,
}

/// The four mirror images every fixture is checked in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flip {
    Original,
    Horizontal,
    Vertical,
    Both,
}

impl Flip {
    pub const ALL: [Flip; 4] = [Flip::Original, Flip::Horizontal, Flip::Vertical, Flip::Both];

    pub fn apply(self, width: i32, height: i32, (x, y): (i32, i32)) -> (i32, i32) {
        match self {
            Flip::Original => (x, y),
            Flip::Horizontal => (width - 1 - x, y),
            Flip::Vertical => (x, height - 1 - y),
            Flip::Both => (width - 1 - x, height - 1 - y),
        }
    }
}

/// Files in `dir` with extension `ext`, sorted by name
pub fn fixture_paths(dir: &str, ext: &str) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", dir, e))
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some(ext))
        .collect();
    paths.sort();
    paths
}

/// Builtin registry grid: floor everywhere except `walls`
pub fn build_grid(width: i32, height: i32, walls: &[(i32, i32)]) -> Grid {
    let registry = Arc::new(TileTypeRegistry::with_builtin());
    let floor = registry.find("Floor").unwrap();
    let wall = registry.find("Wall").unwrap();
    let mut grid = Grid::filled(width, height, floor, registry).unwrap();
    for &(x, y) in walls {
        grid.change_tile_type(x, y, wall);
    }
    grid
}

/// Parse a standard format visibility fixture
/// Format:
/// - first line: `radius: N`
/// - s: origin
/// - ■: wall the cast does not reach
/// - ▣: wall the cast visits
/// - □: floor the cast does not reach
/// - o: floor the cast visits
pub fn parse_standard_test(path: &Path) -> Result<FovCase, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    let mut lines = contents.lines().filter(|line| !line.trim().is_empty());

    let header = lines.next().ok_or("empty fixture")?;
    let radius: i32 = header
        .strip_prefix("radius:")
        .ok_or("first line must be `radius: N`")?
        .trim()
        .parse()?;

    let rows: Vec<&str> = lines.collect();
    if rows.is_empty() {
        return Err("no grid rows".into());
    }
    let width = rows[0].chars().count() as i32;

    let mut origin = None;
    let mut walls = Vec::new();
    let mut expected = HashSet::new();

    for (y, row) in rows.iter().enumerate() {
        if row.chars().count() as i32 != width {
            return Err(format!("row {} has the wrong width", y).into());
        }
        for (x, ch) in row.chars().enumerate() {
            let pos = (x as i32, y as i32);
            match ch {
                's' => {
                    origin = Some(pos);
                    expected.insert(pos);
                }
                '■' => walls.push(pos),
                '▣' => {
                    walls.push(pos);
                    expected.insert(pos);
                }
                'o' => {
                    expected.insert(pos);
                }
                '□' => {}
                other => return Err(format!("unknown fixture glyph {:?}", other).into()),
            }
        }
    }

    let name = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    Ok(FovCase {
        name,
        width,
        height: rows.len() as i32,
        radius,
        origin: origin.ok_or("no origin 's' in fixture")?,
        walls,
        expected,
    })
}

pub fn flip_fov_case(case: &FovCase, flip: Flip) -> FovCase {
    let map = |pos| flip.apply(case.width, case.height, pos);
    FovCase {
        name: format!("{}_{:?}", case.name, flip),
        width: case.width,
        height: case.height,
        radius: case.radius,
        origin: map(case.origin),
        walls: case.walls.iter().map(|&p| map(p)).collect(),
        expected: case.expected.iter().map(|&p| map(p)).collect(),
    }
}

pub fn load_light_case(path: &Path) -> Result<LightCase, Box<dyn std::error::Error>> {
    let contents = fs::read_to_string(path)?;
    let case: LightCase = serde_json::from_str(&contents)?;
    Ok(case)
}

pub fn flip_light_case(case: &LightCase, flip: Flip) -> LightCase {
    let map = |pos| flip.apply(case.width, case.height, pos);

    let mut expected_bright = vec![vec![0; case.width as usize]; case.height as usize];
    for (y, row) in case.expected_bright.iter().enumerate() {
        for (x, &bright) in row.iter().enumerate() {
            let (fx, fy) = map((x as i32, y as i32));
            expected_bright[fy as usize][fx as usize] = bright;
        }
    }

    LightCase {
        name: format!("{}_{:?}", case.name, flip),
        width: case.width,
        height: case.height,
        walls: case.walls.iter().map(|&p| map(p)).collect(),
        lamps: case
            .lamps
            .iter()
            .map(|lamp| {
                let (x, y) = map((lamp.x, lamp.y));
                LampData { x, y, radius: lamp.radius }
            })
            .collect(),
        expected_bright,
    }
}

/// Render a cell set over a grid, for failure messages
pub fn draw_cells(width: i32, height: i32, cells: &HashSet<(i32, i32)>) -> String {
    let mut out = String::new();
    for y in 0..height {
        for x in 0..width {
            out.push(if cells.contains(&(x, y)) { 'o' } else { '□' });
        }
        out.push('\n');
    }
    out
}
