//! Signal propagation over the wiring graph.
//!
//! A send from cell `a` asks every cell in `a.connections` to re-derive its
//! activation: the AND of the `state` of all of its activators. The receiver
//! then runs its positive or negative handler. Handlers may send again, so
//! every send carries the nesting depth it runs at and refuses to go past
//! [`LevelOptions::max_cascade_depth`](crate::level::LevelOptions).

use tracing::{debug, warn};

use crate::grid::Position;
use crate::level::Level;
use crate::WorldError;

impl Level {
    /// Notify every cell wired from `from`.
    ///
    /// # Errors
    ///
    /// [`WorldError::OutOfBounds`] if `from` belongs to another grid,
    /// [`WorldError::CascadeLimit`] if propagation nests deeper than the
    /// configured limit, or any error a receiving handler raises.
    pub fn send(&mut self, from: Position) -> Result<(), WorldError> {
        let from = self.grid.validate(from)?;
        self.send_at_depth(from, 0)
    }

    pub(crate) fn send_at_depth(&mut self, from: Position, depth: usize) -> Result<(), WorldError> {
        let limit = self.options.max_cascade_depth;
        if depth >= limit {
            warn!(at = %from, limit, "signal cascade limit reached");
            return Err(WorldError::CascadeLimit {
                limit,
                at: from.coord(),
            });
        }
        let targets: Vec<Position> = self.grid[from].connections().iter().copied().collect();
        debug!(from = %from, state = self.grid[from].state(), targets = targets.len(), depth, "send");
        for target in targets {
            self.check_activators_at_depth(target, depth + 1)?;
        }
        Ok(())
    }

    /// Re-derive the activation of the cell at `at`, store it as the cell's
    /// `state` and run its positive or negative handler. Returns the derived
    /// activation.
    pub fn check_activators(&mut self, at: Position) -> Result<bool, WorldError> {
        let at = self.grid.validate(at)?;
        self.check_activators_at_depth(at, 0)
    }

    pub(crate) fn check_activators_at_depth(
        &mut self,
        at: Position,
        depth: usize,
    ) -> Result<bool, WorldError> {
        let active = self.derived_activation(at);
        self.grid[at].set_state(active);
        if active {
            self.on_positive_signal(at, depth)?;
        } else {
            self.on_negative_signal(at, depth)?;
        }
        Ok(active)
    }

    /// AND over the states of every activator of the cell at `at`.
    ///
    /// A cell with no activators is trivially active; it can only be asked
    /// through [`Level::check_activators`], never by a send.
    ///
    /// # Panics
    ///
    /// Panics if `at` came from another grid, as indexing does.
    pub fn derived_activation(&self, at: Position) -> bool {
        self.grid[at]
            .activators()
            .iter()
            .all(|&source| self.grid[source].state())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn build(desc: &LevelDescription, options: LevelOptions) -> Level {
        Level::build(desc, Layout::default(), options).unwrap()
    }

    fn at(level: &Level, row: usize, col: usize) -> Position {
        level.grid().position(row, col).unwrap()
    }

    #[test]
    fn door_opens_only_when_every_activator_is_on() {
        let desc = LevelDescription::new("and", &["BBD"], Coord::new(0, 0))
            .with_wire(Coord::new(0, 0), &[Coord::new(0, 2)])
            .with_wire(Coord::new(0, 1), &[Coord::new(0, 2)]);
        let mut level = build(&desc, LevelOptions::default());
        let (a, b, door) = (at(&level, 0, 0), at(&level, 0, 1), at(&level, 0, 2));

        level.activate(a).unwrap();
        assert!(!level.derived_activation(door));
        assert!(!level.grid()[door].walkable());

        level.activate(b).unwrap();
        assert!(level.derived_activation(door));
        assert!(level.grid()[door].walkable());

        level.activate(a).unwrap();
        assert!(!level.grid()[door].walkable());
    }

    #[test]
    fn one_source_fans_out_to_every_target() {
        let desc = LevelDescription::new("fan", &["BDDF"], Coord::new(0, 0)).with_wire(
            Coord::new(0, 0),
            &[Coord::new(0, 1), Coord::new(0, 2), Coord::new(0, 3)],
        );
        let mut level = build(&desc, LevelOptions::default());
        level.interact().unwrap();
        assert!(level.grid()[at(&level, 0, 1)].walkable());
        assert!(level.grid()[at(&level, 0, 2)].walkable());
        assert!(!level.grid()[at(&level, 0, 3)].fizzler_active());
        assert!(level.grid()[at(&level, 0, 3)].state());
    }

    #[test]
    fn cascade_limit_aborts_propagation() {
        let desc = LevelDescription::new("deep", &["BD"], Coord::new(0, 0))
            .with_wire(Coord::new(0, 0), &[Coord::new(0, 1)]);
        let options = LevelOptions {
            max_cascade_depth: 0,
            ..LevelOptions::default()
        };
        let mut level = build(&desc, options);
        assert_eq!(
            level.interact(),
            Err(WorldError::CascadeLimit {
                limit: 0,
                at: Coord::new(0, 0),
            })
        );
    }

    #[test]
    fn check_activators_without_sources_is_positive() {
        let desc = LevelDescription::new("lonely", &[" D"], Coord::new(0, 0));
        let mut level = build(&desc, LevelOptions::default());
        let door = at(&level, 0, 1);
        assert!(level.check_activators(door).unwrap());
        assert!(level.grid()[door].walkable());
    }

    #[test]
    fn send_from_unwired_cell_is_a_no_op() {
        let desc = LevelDescription::new("solo", &["BD"], Coord::new(0, 0));
        let mut level = build(&desc, LevelOptions::default());
        level.send(at(&level, 0, 0)).unwrap();
        assert!(!level.grid()[at(&level, 0, 1)].walkable());
    }
}
