//! One level session: the world plus the time it runs in.
//!
//! A [`LevelSession`] owns everything a running level needs and nothing
//! else: the [`Level`], its own [`ActionGate`], the scheduler of in-flight
//! animations and a frame counter. Restarting a level builds a new session,
//! so no socket or task can leak from one attempt into the next.
//!
//! # Example
//!
//! ```
//! use trial_engine::prelude::*;
//!
//! let desc = LevelDescription::new("hall", &["  !"], Coord::new(0, 0));
//! let mut session = LevelSession::new(&desc, &EngineConfig::default()).unwrap();
//!
//! assert!(session.request_move(Direction::Right));
//! assert!(!session.request_move(Direction::Right)); // walk in flight
//! for _ in 0..5 {
//!     session.advance().unwrap();
//! }
//! assert_eq!(session.level().player().position().coord(), Coord::new(0, 1));
//! ```

use serde::Serialize;
use trial_world::description::LevelDescription;
use trial_world::grid::Bounds;
use trial_world::level::{Interaction, Level, LevelEvent};

use crate::animation::GateContext;
use crate::config::EngineConfig;
use crate::gate::ActionGate;
use crate::movement::{self, Direction, PLAYER_WALK};
use crate::render::LevelView;
use crate::schedule::Scheduler;
use crate::EngineError;

/// The state scheduled tasks work on.
#[derive(Debug, Clone)]
pub struct LevelContext {
    pub level: Level,
    pub gate: ActionGate,
}

impl GateContext for LevelContext {
    fn gate(&mut self) -> &mut ActionGate {
        &mut self.gate
    }
}

/// A running level.
#[derive(Debug)]
pub struct LevelSession {
    ctx: LevelContext,
    scheduler: Scheduler<LevelContext>,
    frame: u64,
    move_ticks: u32,
    window: (f64, f64),
}

impl LevelSession {
    /// Build the level described by `desc`, laid out for `config`'s window.
    ///
    /// # Errors
    ///
    /// [`EngineError::Load`] if the description is invalid.
    pub fn new(desc: &LevelDescription, config: &EngineConfig) -> Result<Self, EngineError> {
        let bounds = Bounds {
            rows: desc.row_count(),
            cols: desc.column_count(),
        };
        let level = Level::build(desc, config.layout_for(bounds), config.level_options())?;
        tracing::info!(level = %level.name(), "level session started");
        Ok(Self {
            ctx: LevelContext {
                level,
                gate: ActionGate::new(),
            },
            scheduler: Scheduler::new(),
            frame: 0,
            move_ticks: config.move_ticks,
            window: (config.window_width, config.window_height),
        })
    }

    pub fn level(&self) -> &Level {
        &self.ctx.level
    }

    pub fn level_mut(&mut self) -> &mut Level {
        &mut self.ctx.level
    }

    pub fn gate(&self) -> &ActionGate {
        &self.ctx.gate
    }

    /// Frames advanced so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Tasks waiting for the next frame.
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// Whether a walk is in flight.
    pub fn is_walking(&self) -> bool {
        self.ctx.gate.is_fired(PLAYER_WALK)
    }

    /// Ask the player to walk one cell. See [`movement::change_cell`].
    pub fn request_move(&mut self, direction: Direction) -> bool {
        movement::change_cell(
            &mut self.ctx,
            &mut self.scheduler,
            direction,
            self.move_ticks,
        )
    }

    /// The interact action on the player's current cell.
    pub fn interact(&mut self) -> Result<Interaction, EngineError> {
        let result = self.ctx.level.interact()?;
        tracing::debug!(?result, at = %self.ctx.level.player().position(), "interact");
        Ok(result)
    }

    /// Run one frame of scheduled work.
    pub fn advance(&mut self) -> Result<(), EngineError> {
        self.frame += 1;
        self.scheduler.drain(&mut self.ctx)?;
        Ok(())
    }

    /// Events the level produced since the last call.
    pub fn drain_events(&mut self) -> Vec<LevelEvent> {
        self.ctx.level.drain_events()
    }

    /// Unblock movement when the level ends. Walk ticks still queued become
    /// no-ops.
    pub fn end_level(&mut self) {
        self.ctx.gate.force_release(PLAYER_WALK);
    }

    /// The drawable state of the level.
    pub fn view(&self) -> LevelView {
        LevelView::capture(&self.ctx.level, self.window.0, self.window.1)
    }

    /// BLAKE3 hex digest of the drawable state and the frame counter.
    ///
    /// Two sessions fed the same input from the same config hash equal on
    /// every frame.
    pub fn state_hash(&self) -> Result<String, EngineError> {
        #[derive(Serialize)]
        struct HashableState<'a> {
            frame: u64,
            view: &'a LevelView,
            fired: Vec<&'a str>,
        }

        let view = self.view();
        let hashable = HashableState {
            frame: self.frame,
            view: &view,
            fired: self.ctx.gate.fired_sockets().collect(),
        };
        let json_bytes = serde_json::to_vec(&hashable)?;
        Ok(blake3::hash(&json_bytes).to_hex().to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
