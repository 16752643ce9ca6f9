//! Grid-gated, animated player movement.
//!
//! [`change_cell`] turns a direction into a walk [`Animation`] on the
//! [`PLAYER_WALK`] socket. The socket does not depend on the direction, so at
//! most one move is ever in flight. The player's drawn position slides
//! towards the target over the animation; the logical position only changes
//! when the walk finishes, through [`Level::move_player_to`], which runs the
//! old cell's leave hook and the new cell's stand hook.
//!
//! [`Level::move_player_to`]: trial_world::level::Level::move_player_to

use serde::{Deserialize, Serialize};
use trial_world::grid::{Point, Position};

use crate::animation::{Animation, Motion};
use crate::schedule::Scheduler;
use crate::session::LevelContext;
use crate::EngineError;

/// Socket held while the player is walking.
pub const PLAYER_WALK: &str = "PLAYER_WALK";

/// One of the four grid directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// `(d_row, d_col)` of one step.
    pub fn delta(self) -> (i64, i64) {
        match self {
            Self::Up => (-1, 0),
            Self::Down => (1, 0),
            Self::Left => (0, -1),
            Self::Right => (0, 1),
        }
    }
}

/// Slides the player's drawn position and commits the move at the end.
#[derive(Debug, Clone, Copy)]
pub struct WalkMotion {
    target: Position,
    step: Point,
}

impl Motion<LevelContext> for WalkMotion {
    fn advance(&mut self, ctx: &mut LevelContext, _: u32, _: u32) -> Result<(), EngineError> {
        ctx.level.player_mut().nudge(self.step.x, self.step.y);
        Ok(())
    }

    fn finish(&mut self, ctx: &mut LevelContext) -> Result<(), EngineError> {
        ctx.level.move_player_to(self.target)?;
        Ok(())
    }
}

/// Request a one-cell move of the player.
///
/// Returns `true` if a walk started. Moving off the grid, into a
/// non-walkable cell, or while another walk holds [`PLAYER_WALK`] is a silent
/// no-op returning `false`.
pub fn change_cell(
    ctx: &mut LevelContext,
    scheduler: &mut Scheduler<LevelContext>,
    direction: Direction,
    ticks: u32,
) -> bool {
    let (dr, dc) = direction.delta();
    let Ok(target) = ctx.level.player().position().offset(dr, dc) else {
        return false;
    };
    if !ctx.level.grid()[target].walkable() {
        return false;
    }

    let from = ctx.level.player().render();
    let to = ctx.level.grid().pixel_origin(target);
    let ticks = ticks.max(1);
    let motion = WalkMotion {
        target,
        step: Point::new(
            (to.x - from.x) / f64::from(ticks),
            (to.y - from.y) / f64::from(ticks),
        ),
    };
    let started = Animation::new(PLAYER_WALK, ticks, motion).start(ctx, scheduler);
    if started {
        tracing::debug!(?direction, to = %target, "walk started");
    }
    started
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
