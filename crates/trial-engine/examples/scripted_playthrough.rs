//! Headless playthrough of two small levels driven by a fixed input script.
//!
//! Run with:
//!   cargo run --example scripted_playthrough -p trial-engine [config.json]
//!
//! Set `RUST_LOG=info` (or `debug`) to watch machines start and stop and
//! signals travel through the level.

use trial_engine::prelude::*;

const LEVELS: &str = r#"[
    {
        "name": "Button and door",
        "rows": ["I B", "*D*", " !*"],
        "player_start": { "row": 0, "col": 0 },
        "wiring": [{ "source": { "row": 0, "col": 2 }, "targets": [{ "row": 1, "col": 1 }] }],
        "texts": [{ "at": { "row": 0, "col": 0 }, "text": "Press the button to open the door." }]
    },
    {
        "name": "Weighted switch",
        "rows": ["C _*", "  D!"],
        "player_start": { "row": 0, "col": 1 },
        "wiring": [{ "source": { "row": 0, "col": 2 }, "targets": [{ "row": 1, "col": 2 }] }],
        "dispensers": [{ "at": { "row": 0, "col": 0 }, "auto_respawn": true, "dispense_on_load": true }]
    }
]"#;

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Prints a line whenever the scene changes and a grid snapshot whenever a
/// level frame shows the player at rest on a new cell.
#[derive(Default)]
struct ConsoleRenderer {
    last_scene: Option<&'static str>,
    last_player: Option<Point>,
}

impl ConsoleRenderer {
    fn draw_level(view: &LevelView) {
        let mut rows = vec![vec![' '; view.cols]; view.rows];
        for cell in &view.cells {
            rows[cell.at.row][cell.at.col] = glyph(cell.visual);
        }
        for item in &view.items {
            if let Some(cell) = view.cells.iter().find(|c| covers(c.origin, view.tile_size, item.render)) {
                if !item.held {
                    rows[cell.at.row][cell.at.col] = 'o';
                }
            }
        }
        if let Some(cell) = view.cells.iter().find(|c| c.origin == view.player) {
            rows[cell.at.row][cell.at.col] = '@';
        }
        for row in rows {
            println!("    {}", row.into_iter().collect::<String>());
        }
    }
}

fn covers(origin: Point, tile: f64, p: Point) -> bool {
    p.x >= origin.x && p.x < origin.x + tile && p.y >= origin.y && p.y < origin.y + tile
}

fn glyph(visual: Visual) -> char {
    match visual {
        Visual::Empty => '.',
        Visual::Wall => '*',
        Visual::ButtonOff => 'b',
        Visual::ButtonOn => 'B',
        Visual::DoorClosed => 'D',
        Visual::DoorOpen => 'd',
        Visual::CubeDispenser => 'C',
        Visual::PressureReleased => '_',
        Visual::PressurePressed => '=',
        Visual::FizzlerActive => 'F',
        Visual::FizzlerInactive => 'f',
        Visual::Info => 'I',
        Visual::Exit => '!',
    }
}

impl Renderer for ConsoleRenderer {
    fn present(&mut self, frame: &FrameView) {
        let kind = frame.scene.kind();
        if self.last_scene != Some(kind) {
            println!("[{:>4}] {kind}", frame.frame);
            self.last_scene = Some(kind);
        }
        match &frame.scene {
            Scene::Popup { text } if frame.frame == 1 => println!("       \"{text}\""),
            Scene::Level(view) => {
                let at_rest = view.cells.iter().any(|c| c.origin == view.player);
                if at_rest && self.last_player != Some(view.player) {
                    println!("       {}", view.name);
                    Self::draw_level(view);
                    self.last_player = Some(view.player);
                }
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

fn script(config: &EngineConfig) -> ScriptedInput {
    let t = config.move_ticks;
    ScriptedInput::builder()
        .idle(config.intro_ticks as usize + 1)
        .press(InputEvent::Confirm)
        // Level one: read the sign, press the button, walk through the door.
        .press(InputEvent::Interact)
        .press(InputEvent::Confirm)
        .walk(Direction::Right, t)
        .walk(Direction::Right, t)
        .press(InputEvent::Interact)
        .walk(Direction::Left, t)
        .walk(Direction::Down, t)
        .walk(Direction::Down, t)
        // Level two: carry the cube onto the switch.
        .walk(Direction::Left, t)
        .press(InputEvent::Interact)
        .walk(Direction::Right, t)
        .walk(Direction::Right, t)
        .press(InputEvent::Interact)
        .walk(Direction::Down, t)
        .walk(Direction::Right, t)
        .walk(Direction::Right, t)
        .idle(2)
        .press(InputEvent::Quit)
        .build()
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig {
            intro_ticks: 10,
            headless: true,
            ..EngineConfig::default()
        },
    };

    let levels = StaticLevels::from_json(LEVELS)?;
    let mut checkpoint = MemoryCheckpoint::default();
    let mut input = RecordingInput::new(script(&config));
    let mut renderer = ConsoleRenderer::default();

    let code = run_headless(
        levels,
        &mut checkpoint,
        config,
        &mut input,
        &mut renderer,
    )?;

    let log = input.finish();
    println!(
        "exit: {code:?} after {} input frames, checkpoint at level {}",
        log.frames.len(),
        checkpoint.level
    );
    Ok(())
}
