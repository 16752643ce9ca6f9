//! The per-kind behavior table.
//!
//! Every cell kind reacts to the same seven hooks. The hooks are methods on
//! [`Level`] rather than on [`Cell`](crate::cell::Cell) because most
//! reactions reach beyond their own tile: a dispenser creates items, a
//! fizzler takes the player's cube, a button signals other cells.
//!
//! | kind            | stand             | leave   | item placed/removed | activation  | positive      | negative      |
//! |-----------------|-------------------|---------|---------------------|-------------|---------------|---------------|
//! | Button          |                   |         |                     | toggle+send |               |               |
//! | Door            |                   |         |                     |             | non-default   | default       |
//! | Dispenser       |                   |         |                     |             | redispense    |               |
//! | PressureSwitch  | press             | release | recount             |             |               |               |
//! | Fizzler         | destroy held item |         |                     |             | deactivate    | activate      |
//! | Info            |                   |         |                     | show text   |               |               |
//! | Exit            | level complete    |         |                     |             |               |               |
//!
//! `depth` is the signal nesting at which the hook runs; hooks that send pass
//! it on so [`Level::send`] can enforce the cascade limit.

use tracing::debug;

use crate::cell::CellKind;
use crate::grid::Position;
use crate::level::{Level, LevelEvent};
use crate::WorldError;

impl Level {
    pub(crate) fn on_stand(&mut self, at: Position, depth: usize) -> Result<(), WorldError> {
        match self.grid[at].kind_mut() {
            CellKind::PressureSwitch { standing, .. } => {
                *standing = true;
                self.refresh_switch(at, depth)
            }
            CellKind::Fizzler { active } => {
                if *active && self.player.held().is_some() {
                    let item = self.release_at_depth(depth)?;
                    debug!(%item, at = %at, "fizzler destroyed held item");
                    self.destroy_at_depth(item, true, depth)?;
                }
                Ok(())
            }
            CellKind::Exit => {
                self.events.push(LevelEvent::LevelComplete);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn on_leave(&mut self, at: Position, depth: usize) -> Result<(), WorldError> {
        if let CellKind::PressureSwitch { standing, .. } = self.grid[at].kind_mut() {
            *standing = false;
            return self.refresh_switch(at, depth);
        }
        Ok(())
    }

    pub(crate) fn on_item_placed(&mut self, at: Position, depth: usize) -> Result<(), WorldError> {
        self.recount_items(at, depth)
    }

    pub(crate) fn on_item_removed(&mut self, at: Position, depth: usize) -> Result<(), WorldError> {
        self.recount_items(at, depth)
    }

    pub(crate) fn on_activation(&mut self, at: Position, depth: usize) -> Result<(), WorldError> {
        match self.grid[at].kind() {
            CellKind::Button => {
                let toggled = !self.grid[at].state();
                self.grid[at].set_state(toggled);
                debug!(at = %at, state = toggled, "button toggled");
                self.send_at_depth(at, depth)
            }
            CellKind::Info { text } => {
                let text = text.clone();
                self.events.push(LevelEvent::ShowText(text));
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn on_positive_signal(
        &mut self,
        at: Position,
        depth: usize,
    ) -> Result<(), WorldError> {
        match self.grid[at].kind_mut() {
            CellKind::Door { default_open } => {
                let open = !*default_open;
                self.grid[at].set_walkable(open);
                Ok(())
            }
            CellKind::Dispenser(d) => {
                let live = d.live;
                if let Some(item) = live.filter(|&i| self.items.contains(i)) {
                    self.destroy_at_depth(item, false, depth)?;
                }
                self.spawn_from(at, depth)?;
                Ok(())
            }
            CellKind::Fizzler { active } => {
                *active = false;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn on_negative_signal(
        &mut self,
        at: Position,
        _depth: usize,
    ) -> Result<(), WorldError> {
        match self.grid[at].kind_mut() {
            CellKind::Door { default_open } => {
                let open = *default_open;
                self.grid[at].set_walkable(open);
            }
            CellKind::Fizzler { active } => *active = true,
            _ => {}
        }
        Ok(())
    }

    // -- helpers --------------------------------------------------------------

    fn recount_items(&mut self, at: Position, depth: usize) -> Result<(), WorldError> {
        let any = !self.grid[at].occupants().is_empty();
        if let CellKind::PressureSwitch { item_lying, .. } = self.grid[at].kind_mut() {
            *item_lying = any;
            return self.refresh_switch(at, depth);
        }
        Ok(())
    }

    /// Re-derive a pressure switch's state and send if it flipped.
    fn refresh_switch(&mut self, at: Position, depth: usize) -> Result<(), WorldError> {
        let pressed = match self.grid[at].kind() {
            CellKind::PressureSwitch {
                standing,
                item_lying,
            } => *standing || *item_lying,
            _ => return Ok(()),
        };
        if pressed == self.grid[at].state() {
            return Ok(());
        }
        self.grid[at].set_state(pressed);
        debug!(at = %at, pressed, "pressure switch changed");
        self.send_at_depth(at, depth)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
