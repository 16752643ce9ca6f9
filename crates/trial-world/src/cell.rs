//! Cells: one interactive tile of the grid.
//!
//! A [`Cell`] is a tagged variant over a fixed set of kinds
//! ([`CellKind`]). The attributes every kind shares (walkability, signal
//! state, wiring, occupants) live on the cell itself; kind-specific data lives
//! in the variant. What each kind *does* on player and signal events is the
//! behavior table in [`crate::behavior`].

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::grid::Position;
use crate::item::{ItemId, ItemKind};

// ---------------------------------------------------------------------------
// CellKind
// ---------------------------------------------------------------------------

/// Settings and live item of a dispenser cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispenser {
    pub item_kind: ItemKind,
    pub auto_respawn: bool,
    pub dispense_on_load: bool,
    /// The single item this dispenser currently owns, if one is alive.
    pub live: Option<ItemId>,
}

impl Default for Dispenser {
    fn default() -> Self {
        Self {
            item_kind: ItemKind::Cube,
            auto_respawn: true,
            dispense_on_load: false,
            live: None,
        }
    }
}

/// The kind of a cell, with any per-kind data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellKind {
    /// Plain floor.
    Empty,
    /// Never walkable.
    Wall,
    /// Toggles its state when activated by the player.
    Button,
    /// Opens or closes on signals, relative to its default.
    Door { default_open: bool },
    /// Produces items.
    Dispenser(Dispenser),
    /// Pressed while the player stands on it or an item lies on it.
    PressureSwitch { standing: bool, item_lying: bool },
    /// Destroys held items while active.
    Fizzler { active: bool },
    /// Shows a text popup when activated.
    Info { text: String },
    /// Completes the level when stepped on.
    Exit,
}

impl CellKind {
    /// Map a level-grid symbol to a fresh kind.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        let kind = match symbol {
            ' ' | '.' => Self::Empty,
            '*' => Self::Wall,
            'B' => Self::Button,
            'D' => Self::Door {
                default_open: false,
            },
            'd' => Self::Door { default_open: true },
            'C' => Self::Dispenser(Dispenser::default()),
            '_' => Self::PressureSwitch {
                standing: false,
                item_lying: false,
            },
            'F' => Self::Fizzler { active: true },
            'I' => Self::Info {
                text: String::new(),
            },
            '!' => Self::Exit,
            _ => return None,
        };
        Some(kind)
    }

    /// Short lowercase name, used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Wall => "wall",
            Self::Button => "button",
            Self::Door { .. } => "door",
            Self::Dispenser(_) => "dispenser",
            Self::PressureSwitch { .. } => "pressure switch",
            Self::Fizzler { .. } => "fizzler",
            Self::Info { .. } => "info",
            Self::Exit => "exit",
        }
    }
}

// ---------------------------------------------------------------------------
// Visual
// ---------------------------------------------------------------------------

/// The visual-state identifier a renderer draws for a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visual {
    Empty,
    Wall,
    ButtonOff,
    ButtonOn,
    DoorClosed,
    DoorOpen,
    CubeDispenser,
    PressureReleased,
    PressurePressed,
    FizzlerActive,
    FizzlerInactive,
    Info,
    Exit,
}

impl Visual {
    /// Asset-style name of the visual.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Wall => "wall",
            Self::ButtonOff => "button",
            Self::ButtonOn => "button_on",
            Self::DoorClosed => "door_closed",
            Self::DoorOpen => "door_open",
            Self::CubeDispenser => "cube_dispenser",
            Self::PressureReleased => "pressure_button_deactivated",
            Self::PressurePressed => "pressure_button_activated",
            Self::FizzlerActive => "fizzler",
            Self::FizzlerInactive => "fizzler_off",
            Self::Info => "info",
            Self::Exit => "exit",
        }
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// One tile of the grid.
///
/// `connections` are the cells this cell signals; `activators` are the cells
/// that signal this one. Wiring is only ever added in matching pairs through
/// [`Level`](crate::level::Level), so `a ∈ b.connections ⇔ b ∈ a.activators`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    kind: CellKind,
    walkable: bool,
    activatable: bool,
    state: bool,
    occupants: Vec<ItemId>,
    connections: BTreeSet<Position>,
    activators: BTreeSet<Position>,
}

impl Cell {
    /// A fresh, unwired cell of the given kind with its default attributes.
    pub fn new(kind: CellKind) -> Self {
        let (walkable, activatable, state) = match &kind {
            CellKind::Wall => (false, false, false),
            CellKind::Button | CellKind::Info { .. } => (true, true, false),
            CellKind::Door { default_open } => (*default_open, false, false),
            _ => (true, false, false),
        };
        Self {
            kind,
            walkable,
            activatable,
            state,
            occupants: Vec::new(),
            connections: BTreeSet::new(),
            activators: BTreeSet::new(),
        }
    }

    /// A fresh cell for a level-grid symbol.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        CellKind::from_symbol(symbol).map(Self::new)
    }

    // -- accessors ----------------------------------------------------------

    #[inline]
    pub fn kind(&self) -> &CellKind {
        &self.kind
    }

    #[inline]
    pub fn walkable(&self) -> bool {
        self.walkable
    }

    #[inline]
    pub fn activatable(&self) -> bool {
        self.activatable
    }

    /// The signal state other cells read through their activator sets.
    ///
    /// For a wired receiver this is the AND of its activators as of the
    /// last signal it received. Door openness lives in `walkable` and
    /// fizzler activity in the variant.
    #[inline]
    pub fn state(&self) -> bool {
        self.state
    }

    /// Items lying on this cell, oldest first.
    #[inline]
    pub fn occupants(&self) -> &[ItemId] {
        &self.occupants
    }

    #[inline]
    pub fn connections(&self) -> &BTreeSet<Position> {
        &self.connections
    }

    #[inline]
    pub fn activators(&self) -> &BTreeSet<Position> {
        &self.activators
    }

    /// The text of an Info cell.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            CellKind::Info { text } => Some(text),
            _ => None,
        }
    }

    /// Whether this is a fizzler that currently destroys held items.
    pub fn fizzler_active(&self) -> bool {
        matches!(self.kind, CellKind::Fizzler { active: true })
    }

    /// The visual-state identifier for the renderer.
    pub fn visual(&self) -> Visual {
        match &self.kind {
            CellKind::Empty => Visual::Empty,
            CellKind::Wall => Visual::Wall,
            CellKind::Button if self.state => Visual::ButtonOn,
            CellKind::Button => Visual::ButtonOff,
            CellKind::Door { .. } if self.walkable => Visual::DoorOpen,
            CellKind::Door { .. } => Visual::DoorClosed,
            CellKind::Dispenser(_) => Visual::CubeDispenser,
            CellKind::PressureSwitch { .. } if self.state => Visual::PressurePressed,
            CellKind::PressureSwitch { .. } => Visual::PressureReleased,
            CellKind::Fizzler { active: true } => Visual::FizzlerActive,
            CellKind::Fizzler { active: false } => Visual::FizzlerInactive,
            CellKind::Info { .. } => Visual::Info,
            CellKind::Exit => Visual::Exit,
        }
    }

    // -- crate-internal mutation -------------------------------------------

    pub(crate) fn kind_mut(&mut self) -> &mut CellKind {
        &mut self.kind
    }

    pub(crate) fn set_state(&mut self, state: bool) {
        self.state = state;
    }

    pub(crate) fn set_walkable(&mut self, walkable: bool) {
        self.walkable = walkable;
    }

    pub(crate) fn push_occupant(&mut self, item: ItemId) {
        self.occupants.push(item);
    }

    /// Remove `item` from the occupants. Returns whether it was present.
    pub(crate) fn remove_occupant(&mut self, item: ItemId) -> bool {
        match self.occupants.iter().position(|&o| o == item) {
            Some(i) => {
                self.occupants.remove(i);
                true
            }
            None => false,
        }
    }

    pub(crate) fn add_connection(&mut self, target: Position) {
        self.connections.insert(target);
    }

    pub(crate) fn add_activator(&mut self, source: Position) {
        self.activators.insert(source);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_documented_symbol_maps_to_a_kind() {
        for (symbol, name) in [
            (' ', "empty"),
            ('.', "empty"),
            ('*', "wall"),
            ('B', "button"),
            ('D', "door"),
            ('d', "door"),
            ('C', "dispenser"),
            ('_', "pressure switch"),
            ('F', "fizzler"),
            ('I', "info"),
            ('!', "exit"),
        ] {
            let cell = Cell::from_symbol(symbol).unwrap();
            assert_eq!(cell.kind().name(), name, "symbol {symbol:?}");
        }
        assert!(Cell::from_symbol('x').is_none());
    }

    #[test]
    fn defaults_follow_kind() {
        assert!(!Cell::from_symbol('*').unwrap().walkable());
        assert!(Cell::from_symbol('B').unwrap().activatable());
        assert!(Cell::from_symbol('I').unwrap().activatable());
        assert!(!Cell::from_symbol('_').unwrap().activatable());

        let closed = Cell::from_symbol('D').unwrap();
        assert!(!closed.walkable());
        assert_eq!(closed.visual(), Visual::DoorClosed);

        let open = Cell::from_symbol('d').unwrap();
        assert!(open.walkable());
        assert_eq!(open.visual(), Visual::DoorOpen);

        let fizzler = Cell::from_symbol('F').unwrap();
        assert!(fizzler.walkable());
        assert!(fizzler.fizzler_active());
        assert!(!fizzler.state());
        assert_eq!(fizzler.visual(), Visual::FizzlerActive);
    }

    #[test]
    fn remove_occupant_reports_presence() {
        let mut cell = Cell::new(CellKind::Empty);
        let id = ItemId::new(3, 0);
        cell.push_occupant(id);
        assert!(cell.remove_occupant(id));
        assert!(!cell.remove_occupant(id));
        assert!(cell.occupants().is_empty());
    }

    #[test]
    fn visual_names_match_asset_names() {
        assert_eq!(Visual::PressurePressed.as_str(), "pressure_button_activated");
        assert_eq!(Visual::CubeDispenser.as_str(), "cube_dispenser");
    }
}
