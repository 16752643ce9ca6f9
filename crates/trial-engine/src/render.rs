//! Read-only frame views and the renderer seam.
//!
//! Machines never draw. Once per frame they build a [`FrameView`] describing
//! what is on screen and hand it to a [`Renderer`]. A real frontend maps
//! [`Visual`] identifiers to images; the renderers here either discard the
//! view or record it for tests.

use serde::{Deserialize, Serialize};
use trial_world::cell::Visual;
use trial_world::description::Coord;
use trial_world::grid::Point;
use trial_world::item::{ItemId, ItemKind, Placement};
use trial_world::level::Level;

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// One drawn cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub at: Coord,
    pub origin: Point,
    pub visual: Visual,
}

/// One drawn item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemView {
    pub id: ItemId,
    pub kind: ItemKind,
    pub render: Point,
    pub held: bool,
}

/// Everything a renderer needs to draw a level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelView {
    pub name: String,
    pub rows: usize,
    pub cols: usize,
    pub tile_size: f64,
    pub cells: Vec<CellView>,
    pub items: Vec<ItemView>,
    pub player: Point,
    /// Offset that keeps the player centred in the window.
    pub camera: Point,
}

impl LevelView {
    /// Capture the drawable state of `level` for a `width x height` window.
    ///
    /// A held item is drawn at the player's position.
    pub fn capture(level: &Level, width: f64, height: f64) -> Self {
        let grid = level.grid();
        let tile_size = grid.layout().tile_size;
        let player = level.player().render();

        let cells = grid
            .iter()
            .map(|(pos, cell)| CellView {
                at: pos.coord(),
                origin: grid.pixel_origin(pos),
                visual: cell.visual(),
            })
            .collect();

        let items = level
            .items()
            .iter()
            .map(|(id, item)| {
                let held = item.placement == Placement::Held;
                ItemView {
                    id,
                    kind: item.kind,
                    render: if held { player } else { item.render },
                    held,
                }
            })
            .collect();

        Self {
            name: level.name().to_owned(),
            rows: grid.row_count(),
            cols: grid.column_count(),
            tile_size,
            cells,
            items,
            player,
            camera: follow(player, tile_size, width, height),
        }
    }
}

/// Offset that puts a `tile`-sized sprite at `target` in the window centre.
pub fn follow(target: Point, tile: f64, width: f64, height: f64) -> Point {
    Point::new(
        -(target.x + (tile / 2.0).floor() - (width / 2.0).floor()),
        -(target.y + (tile / 2.0).floor() - (height / 2.0).floor()),
    )
}

/// A menu with a highlighted entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuView {
    pub title: String,
    pub items: Vec<String>,
    pub selected: usize,
}

/// What is on screen this frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scene", rename_all = "snake_case")]
pub enum Scene {
    /// The title fading in; `alpha` runs from 0 to 1.
    Intro { title: String, alpha: f64 },
    Menu(MenuView),
    Level(LevelView),
    /// The pause menu over a frozen level.
    Pause { level: LevelView, menu: MenuView },
    /// A blocking text box.
    Popup { text: String },
}

impl Scene {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Intro { .. } => "intro",
            Self::Menu(_) => "menu",
            Self::Level(_) => "level",
            Self::Pause { .. } => "pause",
            Self::Popup { .. } => "popup",
        }
    }
}

/// One presented frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameView {
    /// The presenting machine's frame counter.
    pub frame: u64,
    pub scene: Scene,
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Draws frames. Called exactly once per machine tick.
pub trait Renderer {
    fn present(&mut self, frame: &FrameView);
}

/// Discards every frame (headless runs).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn present(&mut self, _: &FrameView) {}
}

/// Keeps every presented frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    frames: Vec<FrameView>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[FrameView] {
        &self.frames
    }

    pub fn last(&self) -> Option<&FrameView> {
        self.frames.last()
    }

    /// The scene kinds in presentation order, with consecutive repeats
    /// collapsed.
    pub fn scene_trail(&self) -> Vec<&'static str> {
        let mut trail: Vec<&'static str> = Vec::new();
        for frame in &self.frames {
            let kind = frame.scene.kind();
            if trail.last() != Some(&kind) {
                trail.push(kind);
            }
        }
        trail
    }
}

impl Renderer for RecordingRenderer {
    fn present(&mut self, frame: &FrameView) {
        self.frames.push(frame.clone());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use trial_world::prelude::*;

    #[test]
    fn capture_lists_every_cell_and_draws_held_items_on_the_player() {
        let desc = LevelDescription::new("view", &["C "], Coord::new(0, 0)).with_dispenser(
            Coord::new(0, 0),
            false,
            true,
        );
        let mut level = Level::build(&desc, Layout::default(), LevelOptions::default()).unwrap();
        level.interact().unwrap();

        let view = LevelView::capture(&level, 100.0, 50.0);
        assert_eq!(view.cells.len(), 2);
        assert_eq!(view.cells[0].visual, Visual::CubeDispenser);
        assert_eq!(view.cells[1].origin, Point::new(50.0, 0.0));
        assert_eq!(view.items.len(), 1);
        assert!(view.items[0].held);
        assert_eq!(view.items[0].render, view.player);
    }

    #[test]
    fn camera_centres_the_player() {
        let camera = follow(Point::new(100.0, 40.0), 50.0, 1280.0, 720.0);
        assert_eq!(camera, Point::new(515.0, 295.0));
    }

    #[test]
    fn scene_trail_collapses_repeats() {
        let mut renderer = RecordingRenderer::new();
        for (frame, text) in ["a", "a", "b"].into_iter().enumerate() {
            renderer.present(&FrameView {
                frame: frame as u64,
                scene: Scene::Popup { text: text.into() },
            });
        }
        renderer.present(&FrameView {
            frame: 3,
            scene: Scene::Intro {
                title: "Trial".into(),
                alpha: 0.5,
            },
        });
        assert_eq!(renderer.scene_trail(), vec!["popup", "intro"]);
        assert_eq!(renderer.frames().len(), 4);
    }
}
