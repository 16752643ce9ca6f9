//! A single level's world: grid, items, player, and outgoing events.
//!
//! [`Level`] is the mutable state one level session works on. The engine
//! drives it through the player hooks ([`Level::move_player_to`],
//! [`Level::interact`]); signal propagation, dispensers and fizzlers all run
//! inside those calls. Effects the engine must react to, such as a popup or
//! the end of the level, are queued as [`LevelEvent`]s and drained with
//! [`Level::drain_events`].

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use tracing::{debug, warn};

use crate::cell::{Cell, CellKind};
use crate::description::{Coord, LevelDescription};
use crate::grid::{Grid, Layout, Point, Position};
use crate::item::{Item, ItemArena, ItemId, Placement};
use crate::player::Player;
use crate::{LoadError, WorldError};

// ---------------------------------------------------------------------------
// LevelOptions
// ---------------------------------------------------------------------------

/// Tunables applied when a level is built.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelOptions {
    /// Seed for the item placement jitter.
    pub seed: u64,
    /// Pixel size of a drawn item; lying items are jittered within their tile.
    pub item_size: f64,
    /// Maximum nesting of signal sends before propagation aborts.
    pub max_cascade_depth: usize,
}

impl Default for LevelOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            item_size: 20.0,
            max_cascade_depth: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Something the level asks its driver to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelEvent {
    /// An Info cell was activated; show its text and block until dismissed.
    ShowText(String),
    /// The player reached an exit.
    LevelComplete,
    /// A dispenser produced an item.
    ItemSpawned { item: ItemId, at: Coord },
    /// An item was destroyed.
    ItemDestroyed { item: ItemId },
}

/// The result of the player's interact action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// The held item was put down on the player's cell.
    Released(ItemId),
    /// An item lying on the player's cell was picked up.
    Took(ItemId),
    /// The player's cell was activated.
    Activated,
    /// Nothing to do here.
    Nothing,
}

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// The world of one level.
#[derive(Debug, Clone)]
pub struct Level {
    name: String,
    pub(crate) grid: Grid,
    pub(crate) items: ItemArena,
    pub(crate) player: Player,
    pub(crate) events: Vec<LevelEvent>,
    pub(crate) options: LevelOptions,
    rng: Pcg32,
}

impl Level {
    /// Build a level from its description.
    ///
    /// Wiring is created as matching connection/activator pairs, Info texts
    /// and dispenser settings are attached, the player is placed and stands
    /// on the start cell, and dispensers marked `dispense_on_load` produce
    /// their first item.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] for any malformed or inconsistent description.
    pub fn build(
        desc: &LevelDescription,
        layout: Layout,
        options: LevelOptions,
    ) -> Result<Self, LoadError> {
        let level = desc.name.clone();
        if desc.rows.is_empty() || desc.column_count() == 0 {
            return Err(LoadError::EmptyGrid { level });
        }

        let expected = desc.column_count();
        let mut rows = Vec::with_capacity(desc.rows.len());
        for (r, line) in desc.rows.iter().enumerate() {
            let found = line.chars().count();
            if found != expected {
                return Err(LoadError::RaggedRow {
                    level,
                    row: r,
                    expected,
                    found,
                });
            }
            let mut row = Vec::with_capacity(found);
            for (c, symbol) in line.chars().enumerate() {
                let cell = Cell::from_symbol(symbol).ok_or_else(|| LoadError::UnknownSymbol {
                    level: level.clone(),
                    symbol,
                    at: Coord::new(r, c),
                })?;
                row.push(cell);
            }
            rows.push(row);
        }
        let mut grid = Grid::from_rows(rows, layout).ok_or_else(|| LoadError::EmptyGrid {
            level: level.clone(),
        })?;

        for wire in &desc.wiring {
            let source = locate(&grid, &level, "wiring source", wire.source)?;
            for &target in &wire.targets {
                let target = locate(&grid, &level, "wiring target", target)?;
                if target == source {
                    return Err(LoadError::SelfWire {
                        level,
                        at: source.coord(),
                    });
                }
                grid[source].add_connection(target);
                grid[target].add_activator(source);
            }
        }

        for info in &desc.texts {
            let at = locate(&grid, &level, "info text", info.at)?;
            match grid[at].kind_mut() {
                CellKind::Info { text } => *text = info.text.clone(),
                other => {
                    return Err(LoadError::TextOnNonInfo {
                        level,
                        at: info.at,
                        kind: other.name(),
                    })
                }
            }
        }

        for spec in &desc.dispensers {
            let at = locate(&grid, &level, "dispenser settings", spec.at)?;
            match grid[at].kind_mut() {
                CellKind::Dispenser(d) => {
                    d.auto_respawn = spec.auto_respawn;
                    d.dispense_on_load = spec.dispense_on_load;
                }
                other => {
                    return Err(LoadError::NotADispenser {
                        level,
                        at: spec.at,
                        kind: other.name(),
                    })
                }
            }
        }

        let start = locate(&grid, &level, "player start", desc.player_start)?;
        if !grid[start].walkable() {
            return Err(LoadError::StartNotWalkable {
                level,
                at: desc.player_start,
            });
        }

        let player = Player::new(start, grid.pixel_origin(start));
        let mut built = Self {
            name: desc.name.clone(),
            grid,
            items: ItemArena::new(),
            player,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(options.seed),
            options,
        };

        let first_dispense: Vec<Position> = built
            .grid
            .iter()
            .filter(|(_, cell)| {
                matches!(cell.kind(), CellKind::Dispenser(d) if d.dispense_on_load)
            })
            .map(|(pos, _)| pos)
            .collect();
        for pos in first_dispense {
            built.spawn_from(pos, 0)?;
        }
        built.on_stand(start, 0)?;

        debug!(
            level = %built.name,
            rows = built.grid.row_count(),
            cols = built.grid.column_count(),
            "level built"
        );
        Ok(built)
    }

    // -- accessors ----------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    /// Mutable access to the player's drawn position. The logical position
    /// only changes through [`Level::move_player_to`].
    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn items(&self) -> &ItemArena {
        &self.items
    }

    pub fn options(&self) -> &LevelOptions {
        &self.options
    }

    /// Take every event queued since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<LevelEvent> {
        std::mem::take(&mut self.events)
    }

    // -- player hooks -------------------------------------------------------

    /// Complete a player move: leave the old cell, occupy `target`, stand on
    /// it. The drawn position snaps to the target's pixel origin.
    ///
    /// Walkability is the caller's concern; this is the tail of a move that
    /// was already accepted.
    ///
    /// # Errors
    ///
    /// [`WorldError::OutOfBounds`] if `target` belongs to another grid, or
    /// any error the leave or stand hooks raise.
    pub fn move_player_to(&mut self, target: Position) -> Result<(), WorldError> {
        let target = self.grid.validate(target)?;
        let from = self.player.position();
        self.on_leave(from, 0)?;
        self.player.set_position(target);
        self.player.place_render(self.grid.pixel_origin(target));
        debug!(from = %from, to = %target, "player moved");
        self.on_stand(target, 0)
    }

    /// The interact action: put down the held item, else pick up the oldest
    /// item here, else activate the cell.
    pub fn interact(&mut self) -> Result<Interaction, WorldError> {
        if self.player.held().is_some() {
            return self.release().map(Interaction::Released);
        }
        let here = self.player.position();
        if let Some(&item) = self.grid[here].occupants().first() {
            self.take(item)?;
            return Ok(Interaction::Took(item));
        }
        if self.activate(here)? {
            Ok(Interaction::Activated)
        } else {
            Ok(Interaction::Nothing)
        }
    }

    /// Activate the cell at `at`. Non-activatable cells are a no-op and
    /// return `false`.
    pub fn activate(&mut self, at: Position) -> Result<bool, WorldError> {
        if !self.grid.get(at)?.activatable() {
            return Ok(false);
        }
        self.on_activation(at, 0)?;
        Ok(true)
    }

    /// Pick up a lying item.
    ///
    /// # Errors
    ///
    /// [`WorldError::AlreadyHolding`] if the player's hands are full, or
    /// [`WorldError::StaleItem`] if `item` is not live.
    pub fn take(&mut self, item: ItemId) -> Result<(), WorldError> {
        if let Some(held) = self.player.held() {
            return Err(WorldError::AlreadyHolding { held });
        }
        let render = self.player.render();
        let entry = self.items.get_mut(item)?;
        let Placement::Lying(at) = entry.placement else {
            // A held item that the player does not hold cannot exist.
            return Err(WorldError::StaleItem(item));
        };
        entry.placement = Placement::Held;
        entry.render = render;
        self.grid[at].remove_occupant(item);
        self.player.set_held(Some(item));
        debug!(%item, at = %at, "item taken");
        self.on_item_removed(at, 0)
    }

    /// Put the held item down on the player's cell and return its id.
    ///
    /// # Errors
    ///
    /// [`WorldError::NothingHeld`] if the player holds nothing.
    pub fn release(&mut self) -> Result<ItemId, WorldError> {
        self.release_at_depth(0)
    }

    pub(crate) fn release_at_depth(&mut self, depth: usize) -> Result<ItemId, WorldError> {
        let item = self.player.held().ok_or(WorldError::NothingHeld)?;
        let at = self.player.position();
        let render = self.jittered(at);
        let entry = self.items.get_mut(item)?;
        entry.placement = Placement::Lying(at);
        entry.render = render;
        self.player.set_held(None);
        self.grid[at].push_occupant(item);
        if self.grid[at].occupants().len() > 2 {
            warn!(at = %at, count = self.grid[at].occupants().len(), "too many items on one cell");
        }
        debug!(%item, at = %at, "item released");
        self.on_item_placed(at, depth)?;
        Ok(item)
    }

    // -- items --------------------------------------------------------------

    /// Destroy an item wherever it is. Its dispenser, if auto-respawning,
    /// produces exactly one replacement.
    pub fn destroy_item(&mut self, item: ItemId) -> Result<(), WorldError> {
        self.destroy_at_depth(item, true, 0)
    }

    pub(crate) fn destroy_at_depth(
        &mut self,
        item: ItemId,
        respawn: bool,
        depth: usize,
    ) -> Result<(), WorldError> {
        let removed = self.items.remove(item)?;
        match removed.placement {
            Placement::Lying(at) => {
                self.grid[at].remove_occupant(item);
            }
            Placement::Held => self.player.set_held(None),
        }
        self.events.push(LevelEvent::ItemDestroyed { item });
        debug!(%item, "item destroyed");

        if let Placement::Lying(at) = removed.placement {
            self.on_item_removed(at, depth)?;
        }

        if let Some(source) = removed.dispenser {
            let mut refill = false;
            if let CellKind::Dispenser(d) = self.grid[source].kind_mut() {
                if d.live == Some(item) {
                    d.live = None;
                    refill = respawn && d.auto_respawn;
                }
            }
            if refill {
                self.spawn_from(source, depth)?;
            }
        }
        Ok(())
    }

    /// Create a fresh item on the dispenser cell at `at`.
    pub(crate) fn spawn_from(&mut self, at: Position, depth: usize) -> Result<ItemId, WorldError> {
        let kind = match self.grid[at].kind() {
            CellKind::Dispenser(d) => d.item_kind,
            _ => return Err(WorldError::NotADispenser(at.coord())),
        };
        let render = self.jittered(at);
        let item = self.items.insert(Item {
            kind,
            placement: Placement::Lying(at),
            render,
            dispenser: Some(at),
        });
        if let CellKind::Dispenser(d) = self.grid[at].kind_mut() {
            d.live = Some(item);
        }
        self.grid[at].push_occupant(item);
        self.events.push(LevelEvent::ItemSpawned {
            item,
            at: at.coord(),
        });
        debug!(%item, at = %at, "item dispensed");
        self.on_item_placed(at, depth)?;
        Ok(item)
    }

    /// A random drawn position for an item inside the tile at `at`.
    fn jittered(&mut self, at: Position) -> Point {
        let origin = self.grid.pixel_origin(at);
        let slack = (self.grid.layout().tile_size - self.options.item_size).max(0.0);
        origin.translated(
            self.rng.gen_range(0.0..=slack),
            self.rng.gen_range(0.0..=slack),
        )
    }

    // -- diagnostics --------------------------------------------------------

    /// Check ownership and wiring invariants. Returns one message per
    /// violation; an empty list means the level is consistent.
    pub fn audit(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if let Some(held) = self.player.held() {
            match self.items.get(held) {
                Ok(item) if item.placement == Placement::Held => {}
                Ok(_) => problems.push(format!("player holds {held}, but it is lying")),
                Err(_) => problems.push(format!("player holds dead {held}")),
            }
        }

        for (id, item) in self.items.iter() {
            match item.placement {
                Placement::Held if self.player.held() != Some(id) => {
                    problems.push(format!("{id} is held, but not by the player"));
                }
                Placement::Held => {}
                Placement::Lying(at) => {
                    let count = self.grid[at].occupants().iter().filter(|&&o| o == id).count();
                    if count != 1 {
                        problems.push(format!("{id} lies at {at} but is listed {count} times"));
                    }
                }
            }
        }

        for (pos, cell) in self.grid.iter() {
            for &occupant in cell.occupants() {
                match self.items.get(occupant) {
                    Ok(item) if item.placement == Placement::Lying(pos) => {}
                    _ => problems.push(format!("cell {pos} lists {occupant}, which is not lying there")),
                }
            }
            for &target in cell.connections() {
                if !self.grid[target].activators().contains(&pos) {
                    problems.push(format!("{pos} -> {target} has no matching activator"));
                }
            }
            for &source in cell.activators() {
                if !self.grid[source].connections().contains(&pos) {
                    problems.push(format!("{pos} <- {source} has no matching connection"));
                }
            }
            if let CellKind::Dispenser(d) = cell.kind() {
                if let Some(live) = d.live {
                    if !self.items.contains(live) {
                        problems.push(format!("dispenser {pos} tracks dead {live}"));
                    }
                }
            }
        }

        problems
    }
}

/// Validate a description coordinate against the grid being loaded.
fn locate(grid: &Grid, level: &str, what: &'static str, at: Coord) -> Result<Position, LoadError> {
    grid.position_at(at).map_err(|_| LoadError::CoordOutOfBounds {
        level: level.to_owned(),
        what,
        at,
        rows: grid.row_count(),
        cols: grid.column_count(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Visual;

    fn build(desc: &LevelDescription) -> Level {
        Level::build(desc, Layout::default(), LevelOptions::default()).unwrap()
    }

    fn pos(level: &Level, row: usize, col: usize) -> Position {
        level.grid().position(row, col).unwrap()
    }

    // -- loading ------------------------------------------------------------

    #[test]
    fn wiring_is_created_in_both_directions() {
        let desc = LevelDescription::new("w", &["B_D"], Coord::new(0, 0))
            .with_wire(Coord::new(0, 0), &[Coord::new(0, 2)])
            .with_wire(Coord::new(0, 1), &[Coord::new(0, 2)]);
        let level = build(&desc);
        let door = pos(&level, 0, 2);
        assert_eq!(level.grid()[door].activators().len(), 2);
        assert!(level.grid()[pos(&level, 0, 0)].connections().contains(&door));
        assert!(level.audit().is_empty());
    }

    #[test]
    fn load_errors_are_reported() {
        let ragged = LevelDescription::new("r", &["  ", " "], Coord::new(0, 0));
        assert!(matches!(
            Level::build(&ragged, Layout::default(), LevelOptions::default()),
            Err(LoadError::RaggedRow { row: 1, .. })
        ));

        let unknown = LevelDescription::new("u", &[" x"], Coord::new(0, 0));
        assert!(matches!(
            Level::build(&unknown, Layout::default(), LevelOptions::default()),
            Err(LoadError::UnknownSymbol { symbol: 'x', .. })
        ));

        let text = LevelDescription::new("t", &[" B"], Coord::new(0, 0))
            .with_text(Coord::new(0, 1), "nope");
        assert!(matches!(
            Level::build(&text, Layout::default(), LevelOptions::default()),
            Err(LoadError::TextOnNonInfo { kind: "button", .. })
        ));

        let wall_start = LevelDescription::new("s", &["* "], Coord::new(0, 0));
        assert!(matches!(
            Level::build(&wall_start, Layout::default(), LevelOptions::default()),
            Err(LoadError::StartNotWalkable { .. })
        ));

        let far_wire = LevelDescription::new("f", &["B "], Coord::new(0, 1))
            .with_wire(Coord::new(0, 0), &[Coord::new(3, 3)]);
        assert!(matches!(
            Level::build(&far_wire, Layout::default(), LevelOptions::default()),
            Err(LoadError::CoordOutOfBounds { what: "wiring target", .. })
        ));

        let self_wire = LevelDescription::new("x", &["B "], Coord::new(0, 1))
            .with_wire(Coord::new(0, 0), &[Coord::new(0, 0)]);
        assert!(matches!(
            Level::build(&self_wire, Layout::default(), LevelOptions::default()),
            Err(LoadError::SelfWire { .. })
        ));

        let empty = LevelDescription::new("e", &[], Coord::new(0, 0));
        assert!(matches!(
            Level::build(&empty, Layout::default(), LevelOptions::default()),
            Err(LoadError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn info_text_is_attached() {
        let desc = LevelDescription::new("i", &[" I"], Coord::new(0, 0))
            .with_text(Coord::new(0, 1), "press E");
        let level = build(&desc);
        assert_eq!(level.grid()[pos(&level, 0, 1)].text(), Some("press E"));
    }

    #[test]
    fn dispense_on_load_produces_one_item() {
        let desc = LevelDescription::new("c", &[" C"], Coord::new(0, 0)).with_dispenser(
            Coord::new(0, 1),
            true,
            true,
        );
        let mut level = build(&desc);
        assert_eq!(level.items().len(), 1);
        assert_eq!(level.grid()[pos(&level, 0, 1)].occupants().len(), 1);
        assert!(matches!(
            level.drain_events().as_slice(),
            [LevelEvent::ItemSpawned { .. }]
        ));
    }

    // -- interaction ----------------------------------------------------------

    #[test]
    fn interact_takes_then_releases() {
        let desc = LevelDescription::new("c", &["C "], Coord::new(0, 0)).with_dispenser(
            Coord::new(0, 0),
            true,
            true,
        );
        let mut level = build(&desc);
        let here = pos(&level, 0, 0);
        let Interaction::Took(item) = level.interact().unwrap() else {
            panic!("expected to take the dispensed cube");
        };
        assert_eq!(level.player().held(), Some(item));
        assert!(level.grid()[here].occupants().is_empty());
        assert!(level.audit().is_empty());

        level.move_player_to(pos(&level, 0, 1)).unwrap();
        assert_eq!(level.interact().unwrap(), Interaction::Released(item));
        assert_eq!(level.player().held(), None);
        assert_eq!(level.grid()[pos(&level, 0, 1)].occupants(), &[item]);
        assert!(level.audit().is_empty());
    }

    #[test]
    fn positions_from_another_level_are_rejected() {
        let mut small = build(&LevelDescription::new("small", &["B"], Coord::new(0, 0)));
        let big = build(&LevelDescription::new("big", &["   ", "  B"], Coord::new(0, 0)));
        let foreign = pos(&big, 1, 2);
        let out = Err(WorldError::OutOfBounds {
            row: 1,
            col: 2,
            rows: 1,
            cols: 1,
        });

        assert_eq!(small.activate(foreign), out.clone().map(|()| false));
        assert_eq!(small.move_player_to(foreign), out.clone());
        assert_eq!(small.check_activators(foreign), out.clone().map(|()| false));
        assert_eq!(small.send(foreign), out);
        assert_eq!(small.player().position(), pos(&small, 0, 0));
        assert!(!small.grid()[pos(&small, 0, 0)].state());
    }

    #[test]
    fn taking_while_holding_is_an_invariant_violation() {
        let desc = LevelDescription::new("c", &["C"], Coord::new(0, 0)).with_dispenser(
            Coord::new(0, 0),
            false,
            true,
        );
        let mut level = build(&desc);
        let first = level.grid()[pos(&level, 0, 0)].occupants()[0];
        level.take(first).unwrap();
        assert_eq!(level.take(first), Err(WorldError::AlreadyHolding { held: first }));
    }

    #[test]
    fn releasing_nothing_is_an_invariant_violation() {
        let mut level = build(&LevelDescription::new("n", &[" "], Coord::new(0, 0)));
        assert_eq!(level.release(), Err(WorldError::NothingHeld));
    }

    #[test]
    fn interact_on_plain_floor_is_nothing() {
        let mut level = build(&LevelDescription::new("n", &[" "], Coord::new(0, 0)));
        assert_eq!(level.interact().unwrap(), Interaction::Nothing);
    }

    #[test]
    fn exit_emits_level_complete() {
        let mut level = build(&LevelDescription::new("x", &[" !"], Coord::new(0, 0)));
        level.move_player_to(pos(&level, 0, 1)).unwrap();
        assert_eq!(level.drain_events(), vec![LevelEvent::LevelComplete]);
    }

    #[test]
    fn info_activation_emits_text() {
        let desc = LevelDescription::new("i", &["I"], Coord::new(0, 0))
            .with_text(Coord::new(0, 0), "hello");
        let mut level = build(&desc);
        assert_eq!(level.interact().unwrap(), Interaction::Activated);
        assert_eq!(
            level.drain_events(),
            vec![LevelEvent::ShowText("hello".to_owned())]
        );
    }

    #[test]
    fn move_snaps_render_position() {
        let mut level = build(&LevelDescription::new("m", &["  "], Coord::new(0, 0)));
        level.player_mut().nudge(3.0, 4.0);
        let target = pos(&level, 0, 1);
        level.move_player_to(target).unwrap();
        assert_eq!(level.player().position(), target);
        assert_eq!(level.player().render(), Point::new(50.0, 0.0));
        assert_eq!(level.grid()[target].visual(), Visual::Empty);
    }

    #[test]
    fn jitter_stays_inside_tile_and_is_seeded() {
        let desc = LevelDescription::new("j", &["C"], Coord::new(0, 0)).with_dispenser(
            Coord::new(0, 0),
            true,
            true,
        );
        let a = build(&desc);
        let b = build(&desc);
        let (_, item_a) = a.items().iter().next().unwrap();
        let (_, item_b) = b.items().iter().next().unwrap();
        assert_eq!(item_a.render, item_b.render);
        assert!((0.0..=30.0).contains(&item_a.render.x));
        assert!((0.0..=30.0).contains(&item_a.render.y));
    }
}
