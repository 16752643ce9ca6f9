//! Trial Engine -- frame loop, animation, movement and menu flow for Trial.
//!
//! This crate drives a [`trial_world`] level through time. Every frame the
//! active [`Machine`](machine::Machine) polls an
//! [`InputSource`](input::InputSource), runs the tasks queued on its
//! [`Scheduler`](schedule::Scheduler) and presents a
//! [`FrameView`](render::FrameView) to a [`Renderer`](render::Renderer).
//! Walks and fades are [`Animation`](animation::Animation)s guarded by
//! [`ActionGate`](gate::ActionGate) sockets, so a second walk can't start
//! while one is in flight.
//!
//! # Quick Start
//!
//! ```
//! use trial_engine::prelude::*;
//!
//! let levels = StaticLevels::new(vec![
//!     LevelDescription::new("corridor", &[" !"], Coord::new(0, 0)),
//! ]);
//! let config = EngineConfig { intro_ticks: 0, ..Default::default() };
//!
//! // Play, walk right onto the exit, then quit from the menu.
//! let mut input = ScriptedInput::builder()
//!     .press(InputEvent::Confirm)
//!     .walk(Direction::Right, config.move_ticks)
//!     .press(InputEvent::Quit)
//!     .build();
//! let mut renderer = RecordingRenderer::new();
//! let mut io = Frontend::new(&mut input, &mut renderer);
//!
//! let mut menu = RootMenu::new(levels, MemoryCheckpoint::default(), config);
//! assert_eq!(run(&mut menu, &mut io), ExitCode::Quit);
//! assert_eq!(renderer.scene_trail(), vec!["level", "menu"]);
//! ```

#![deny(unsafe_code)]

pub mod animation;
pub mod app;
pub mod checkpoint;
pub mod config;
pub mod gate;
pub mod input;
pub mod machine;
pub mod machines;
pub mod movement;
pub mod render;
pub mod schedule;
pub mod session;

use std::path::PathBuf;

use trial_world::{LoadError, WorldError};

/// Re-export the world crate for convenience.
pub use trial_world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Everything that can end a machine's run early.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A level invariant broke mid-session.
    #[error(transparent)]
    World(#[from] WorldError),

    /// A level could not be built from its description.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Reading or writing a file failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The level source is empty.
    #[error("no levels to play")]
    NoLevels,
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    // Re-export everything from the world prelude.
    pub use trial_world::prelude::*;

    pub use crate::animation::{Animation, GateContext, Idle, Motion};
    pub use crate::app::{run_headless, trace_level, LevelTrace};
    pub use crate::checkpoint::{CheckpointStore, FileCheckpoint, MemoryCheckpoint};
    pub use crate::config::EngineConfig;
    pub use crate::gate::{ActionGate, FireTicket, Guard};
    pub use crate::input::{
        InputEvent, InputLog, InputSource, RecordingInput, ScriptBuilder, ScriptedInput,
    };
    pub use crate::machine::{run, wants_quit, ExitCode, Frontend, Machine};
    pub use crate::machines::intro::Intro;
    pub use crate::machines::level::LevelRunner;
    pub use crate::machines::menu::RootMenu;
    pub use crate::machines::pause::Pause;
    pub use crate::machines::popup::TextPopup;
    pub use crate::machines::MenuCursor;
    pub use crate::movement::{Direction, PLAYER_WALK};
    pub use crate::render::{
        CellView, FrameView, ItemView, LevelView, MenuView, NullRenderer, RecordingRenderer,
        Renderer, Scene,
    };
    pub use crate::schedule::{Scheduler, Step, Task};
    pub use crate::session::{LevelContext, LevelSession};
    pub use crate::EngineError;
}
