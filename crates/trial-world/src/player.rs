//! The player model: where the player is, what they hold, and where they
//! are drawn.

use crate::grid::{Point, Position};
use crate::item::ItemId;

/// The player's logical and visual state.
///
/// `position` is the grid cell the player occupies for game purposes. `render`
/// is the fractional pixel position used for drawing; during a move animation
/// it travels towards the target cell while `position` still names the old
/// one, and the two agree again once the move completes.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    position: Position,
    held: Option<ItemId>,
    render: Point,
}

impl Player {
    pub(crate) fn new(position: Position, render: Point) -> Self {
        Self {
            position,
            held: None,
            render,
        }
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }

    #[inline]
    pub fn held(&self) -> Option<ItemId> {
        self.held
    }

    #[inline]
    pub fn render(&self) -> Point {
        self.render
    }

    /// Move the drawn position by a pixel delta.
    pub fn nudge(&mut self, dx: f64, dy: f64) {
        self.render = self.render.translated(dx, dy);
    }

    /// Put the drawn position exactly at `point`.
    pub fn place_render(&mut self, point: Point) {
        self.render = point;
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn set_held(&mut self, held: Option<ItemId>) {
        self.held = held;
    }
}
