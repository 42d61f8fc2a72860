use anyhow::{Context, Result};
use arboard::Clipboard;
use macroquad::prelude::*;
use std::fs;

use tilelight::light::{rgba, shade};
use tilelight::{Config, Entity, EntityId, Layout, World};

/// Install the global subscriber. `RUST_LOG` wins over the configured filter.
fn init_tracing(filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn to_color(colour: u32) -> Color {
    let (r, g, b, a) = rgba(colour);
    Color::from_rgba(r, g, b, a)
}

/// Viewer state
struct Viewer {
    world: World,
    player: Option<EntityId>,
    config: Config,
}

impl Viewer {
    fn new(config: Config) -> Result<Self> {
        let mut world = World::from_config(&config).context("failed to build world")?;

        if let Some(path) = &config.map.layout_path {
            let text = fs::read_to_string(path).with_context(|| format!("failed to read layout {}", path))?;
            let layout = Layout::parse(&text).with_context(|| format!("failed to parse layout {}", path))?;
            world
                .load_layout(&layout, config.lighting.lamp_radius)
                .with_context(|| format!("failed to load layout {}", path))?;
        }

        let mut viewer = Viewer { world, player: None, config };
        viewer.place_player();
        Ok(viewer)
    }

    /// Put the player on the first empty tile, reading order
    fn place_player(&mut self) {
        let (width, height) = (self.world.grid().width(), self.world.grid().height());
        let spot = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .find(|&(x, y)| self.world.grid().is_empty(x, y));

        self.player = spot.and_then(|(x, y)| {
            let player = Entity::new("player", '@', self.config.lighting.player_radius);
            self.world.spawn(player, x, y).ok()
        });
        if self.player.is_none() {
            tracing::warn!("no empty tile for the player");
        }
    }

    fn mouse_tile(&self) -> Option<(i32, i32)> {
        let (mouse_x, mouse_y) = mouse_position();
        let x = (mouse_x / self.config.visual.cell_size) as i32;
        let y = (mouse_y / self.config.visual.cell_size) as i32;
        let grid = self.world.grid();
        (x >= 0 && x < grid.width() && y >= 0 && y < grid.height()).then_some((x, y))
    }

    fn handle_input(&mut self) {
        if let Some((x, y)) = self.mouse_tile() {
            // Left click: toggle wall/floor under anything but an occupant
            if is_mouse_button_pressed(MouseButton::Left) && self.world.grid().entity(x, y).is_none() {
                self.toggle_wall(x, y);
            }
            // Right click: place or remove a lamp
            else if is_mouse_button_pressed(MouseButton::Right) {
                self.toggle_lamp(x, y);
            }
        }

        if let Some(player) = self.player {
            let step = [
                (KeyCode::Up, (0, -1)),
                (KeyCode::Down, (0, 1)),
                (KeyCode::Left, (-1, 0)),
                (KeyCode::Right, (1, 0)),
            ];
            for (key, (dx, dy)) in step {
                if is_key_pressed(key) {
                    self.world.step(player, dx, dy);
                }
            }
        }

        if is_key_pressed(KeyCode::C) {
            self.copy_to_clipboard();
        }
        if is_key_pressed(KeyCode::V) {
            self.paste_from_clipboard();
        }
    }

    fn toggle_wall(&mut self, x: i32, y: i32) {
        let registry = self.world.registry();
        let (Some(wall), Some(floor)) = (registry.find("Wall"), registry.find("Floor")) else {
            return;
        };
        let next = if self.world.grid().tile_type(x, y) == wall { floor } else { wall };
        self.world.change_tile_type(x, y, next);
    }

    fn toggle_lamp(&mut self, x: i32, y: i32) {
        match self.world.grid().entity(x, y) {
            Some(id) if Some(id) != self.player => {
                self.world.despawn(id);
            }
            Some(_) => {}
            None => {
                let lamp = Entity::new("lamp", '*', self.config.lighting.lamp_radius);
                if let Err(e) = self.world.spawn(lamp, x, y) {
                    tracing::info!("{}", e);
                }
            }
        }
    }

    fn copy_to_clipboard(&self) {
        let text = self.world.to_layout().to_string();
        match Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(text) {
                    tracing::warn!("failed to copy to clipboard: {}", e);
                } else {
                    tracing::info!("layout copied to clipboard");
                    // Keep clipboard alive for a moment so clipboard managers can capture it
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
            Err(e) => tracing::warn!("failed to access clipboard: {}", e),
        }
    }

    fn paste_from_clipboard(&mut self) {
        let text = match Clipboard::new().and_then(|mut clipboard| clipboard.get_text()) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("failed to read clipboard: {}", e);
                return;
            }
        };

        let lamp_radius = self.config.lighting.lamp_radius;
        let loaded = Layout::parse(&text)
            .map_err(anyhow::Error::from)
            .and_then(|layout| Ok(self.world.load_layout(&layout, lamp_radius)?));
        match loaded {
            Ok(lamps) => {
                tracing::info!(lamps = lamps.len(), "layout pasted");
                self.place_player();
            }
            Err(e) => tracing::warn!("clipboard does not hold a usable layout: {}", e),
        }
    }

    /// Rebuild the light field and the player's view for this frame
    fn update(&mut self) {
        self.world.relight();
        if let Some(player) = self.player {
            self.world.observe(player, self.config.lighting.sight_radius);
        }
    }

    fn draw(&self) {
        let [r, g, b] = self.config.visual.background;
        let background = Color::from_rgba(r, g, b, 255);
        clear_background(background);

        let grid = self.world.grid();
        let registry = self.world.registry();
        let size = self.config.visual.cell_size;
        let tick = self.world.tick();

        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let tile = grid.tile(x, y);
                let colour = tile.visuals(registry).fore_colour;
                let px = x as f32 * size;
                let py = y as f32 * size;

                let shown = if tick > 0 && tile.last_visible == tick {
                    shade(colour, tile.light.level())
                } else if tile.last_visible > 0 {
                    shade(colour, self.config.visual.remembered_level)
                } else {
                    continue;
                };
                draw_rectangle(px, py, size - 1.0, size - 1.0, to_color(shown));

                if let Some(entity) = tile.entity().and_then(|id| self.world.entity(id)) {
                    let glyph = entity.glyph.to_string();
                    draw_text(&glyph, px + size * 0.25, py + size * 0.8, size, WHITE);
                }
            }
        }

        let info = format!(
            "Tick: {}\nLeft click: toggle wall\nRight click: place/remove lamp\nArrows: move\nC: copy layout  V: paste layout\nEsc: close window",
            tick
        );
        draw_text(&info, 10.0, 20.0, 20.0, WHITE);
    }
}

fn main() -> Result<()> {
    // Config is read before the global subscriber exists, so give it a
    // temporary one to report through
    let config = tracing::subscriber::with_default(
        tracing_subscriber::fmt().with_writer(std::io::stderr).finish(),
        Config::load,
    );
    init_tracing(&config.logging.filter);

    let mut viewer = Viewer::new(config)?;
    let grid = viewer.world.grid();
    let conf = macroquad::window::Conf {
        window_title: viewer.config.visual.window_title.clone(),
        window_width: (grid.width() as f32 * viewer.config.visual.cell_size) as i32,
        window_height: (grid.height() as f32 * viewer.config.visual.cell_size) as i32,
        ..macroquad::window::Conf::default()
    };

    macroquad::Window::from_config(conf, async move {
        loop {
            viewer.handle_input();

            // Close window on Escape
            if is_key_pressed(KeyCode::Escape) {
                break;
            }

            viewer.update();
            viewer.draw();

            next_frame().await
        }
    });

    Ok(())
}
