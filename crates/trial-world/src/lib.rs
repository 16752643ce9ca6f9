//! Trial World -- grid, cells, signal graph and items for the Trial puzzle game.
//!
//! This crate holds the rules of a single level and nothing about time: a
//! [`Grid`](grid::Grid) of tagged-variant [`Cell`](cell::Cell)s wired into a
//! directed signal graph, an item arena for takeable cubes, and the player's
//! logical position. The frame loop, animation and menu flow live in
//! `trial-engine`, which drives a [`Level`](level::Level) through its player
//! hooks and drains the [`LevelEvent`](level::LevelEvent)s it emits.
//!
//! # Quick Start
//!
//! ```
//! use trial_world::prelude::*;
//!
//! // Button at (0, 1) wired to a closed door at (0, 2).
//! let desc = LevelDescription::new("corridor", &[" BD"], Coord::new(0, 0))
//!     .with_wire(Coord::new(0, 1), &[Coord::new(0, 2)]);
//! let mut level = Level::build(&desc, Layout::default(), LevelOptions::default()).unwrap();
//!
//! let button = level.grid().position(0, 1).unwrap();
//! let door = level.grid().position(0, 2).unwrap();
//! level.move_player_to(button).unwrap();
//! assert_eq!(level.interact().unwrap(), Interaction::Activated);
//! assert!(level.grid()[door].walkable());
//! ```

#![deny(unsafe_code)]

pub mod behavior;
pub mod cell;
pub mod description;
pub mod grid;
pub mod item;
pub mod level;
pub mod player;
pub mod signal;

use description::Coord;
use item::ItemId;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Invariant violations raised while mutating a level.
///
/// None of these are expected during normal play. They mean the movement
/// guard or the signal graph contract was broken, and the level session that
/// hit one should be aborted rather than patched up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// A position was moved or set outside the grid.
    #[error("position ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: i64,
        col: i64,
        rows: usize,
        cols: usize,
    },

    /// The player tried to take an item while already holding one.
    #[error("player already holds {held}")]
    AlreadyHolding { held: ItemId },

    /// The player tried to release an item while holding nothing.
    #[error("player is not holding anything")]
    NothingHeld,

    /// An item id does not refer to a live item.
    #[error("item {0} does not exist (stale or never spawned)")]
    StaleItem(ItemId),

    /// An item was requested from a cell that is not a dispenser.
    #[error("cell {0} is not a dispenser")]
    NotADispenser(Coord),

    /// Signal propagation nested deeper than the configured limit.
    #[error("signal cascade exceeded depth {limit} at cell {at}")]
    CascadeLimit { limit: usize, at: Coord },
}

/// Errors found while building a level from its description.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The level has no rows or no columns.
    #[error("level '{level}' has an empty grid")]
    EmptyGrid { level: String },

    /// A row's length differs from the first row's.
    #[error("level '{level}': row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        level: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A grid character does not map to any cell kind.
    #[error("level '{level}': unknown cell symbol {symbol:?} at {at}")]
    UnknownSymbol {
        level: String,
        symbol: char,
        at: Coord,
    },

    /// A coordinate in the metadata lies outside the grid.
    #[error("level '{level}': {what} references {at}, outside the {rows}x{cols} grid")]
    CoordOutOfBounds {
        level: String,
        what: &'static str,
        at: Coord,
        rows: usize,
        cols: usize,
    },

    /// Display text was attached to a cell that is not an Info cell.
    #[error("level '{level}': text given for {at}, which is a {kind} cell, not info")]
    TextOnNonInfo {
        level: String,
        at: Coord,
        kind: &'static str,
    },

    /// Dispenser settings were attached to a cell that is not a dispenser.
    #[error("level '{level}': dispenser settings given for {at}, which is a {kind} cell")]
    NotADispenser {
        level: String,
        at: Coord,
        kind: &'static str,
    },

    /// The player would start inside a non-walkable cell.
    #[error("level '{level}': player start {at} is not walkable")]
    StartNotWalkable { level: String, at: Coord },

    /// A cell was wired to itself.
    #[error("level '{level}': cell {at} is wired to itself")]
    SelfWire { level: String, at: Coord },

    /// A level index past the end of the level list.
    #[error("level #{index} requested, but only {count} levels exist")]
    MissingLevel { index: usize, count: usize },

    /// The description could not be parsed.
    #[error("failed to parse level description: {0}")]
    Json(#[from] serde_json::Error),

    /// An invariant broke while running load-time setup (e.g. first dispense).
    #[error("level setup failed: {0}")]
    Setup(#[from] WorldError),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::cell::{Cell, CellKind, Visual};
    pub use crate::description::{
        Coord, DispenserSpec, InfoText, LevelDescription, LevelSource, StaticLevels, Wire,
    };
    pub use crate::grid::{Bounds, Grid, Layout, Point, Position};
    pub use crate::item::{Item, ItemArena, ItemId, ItemKind, Placement};
    pub use crate::level::{Interaction, Level, LevelEvent, LevelOptions};
    pub use crate::player::Player;
    pub use crate::{LoadError, WorldError};
}
