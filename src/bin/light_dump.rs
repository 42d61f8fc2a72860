use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tilelight::{Config, FovMap, Layout, TileTypeRegistry, World};

/// Brightness ramp for ASCII output, darkest first
const RAMP: &[u8] = b" .:-=+*#%@";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Ascii,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "light_dump")]
#[command(about = "Light a text layout and print the brightness of every tile")]
struct Args {
    /// Layout file (`#` wall, `.` floor, `"` window, `+` door, `@` lamp)
    layout: PathBuf,

    /// Radius for every lamp; defaults to the configured lamp radius
    #[arg(long)]
    radius: Option<i32>,

    #[arg(long, value_enum, default_value_t = Format::Ascii)]
    format: Format,

    /// Config file to read instead of ./config.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct LightDump {
    width: i32,
    height: i32,
    lamps: Vec<(i32, i32)>,
    /// Row-major accumulated brightness, unclamped
    brightness: Vec<Vec<i32>>,
}

fn ramp_glyph(level: u8) -> char {
    let index = level as usize * (RAMP.len() - 1) / 255;
    RAMP[index] as char
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::from_path(path)?,
        None => Config::load(),
    };

    let text = fs::read_to_string(&args.layout)
        .with_context(|| format!("failed to read layout {}", args.layout.display()))?;
    let layout = Layout::parse(&text).with_context(|| format!("failed to parse layout {}", args.layout.display()))?;
    let radius = args.radius.unwrap_or(config.lighting.lamp_radius);
    if radius < 0 {
        bail!("radius must not be negative, got {}", radius);
    }

    let registry = Arc::new(TileTypeRegistry::from_config(&config.tiles));
    let mut world = World::new(layout.width, layout.height, registry, config.map.seed)?;
    world.load_layout(&layout, radius)?;

    let grid = world.grid();
    match args.format {
        Format::Ascii => {
            for y in 0..grid.height() {
                let row: String = (0..grid.width())
                    .map(|x| {
                        if grid.entity(x, y).is_some() {
                            '@'
                        } else if !grid.is_transparent(x, y) {
                            '#'
                        } else {
                            ramp_glyph(grid.light(x, y).level())
                        }
                    })
                    .collect();
                println!("{}", row);
            }
        }
        Format::Json => {
            let dump = LightDump {
                width: grid.width(),
                height: grid.height(),
                lamps: world.placed().map(|(_, pos)| pos).collect(),
                brightness: (0..grid.height())
                    .map(|y| (0..grid.width()).map(|x| grid.light(x, y).bright).collect())
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }

    Ok(())
}
