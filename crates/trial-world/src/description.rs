//! Level descriptions: the data contract between the level loader and the
//! world.
//!
//! A [`LevelDescription`] is what an external loader produces: a rectangular
//! character grid (one symbol per cell kind) plus metadata for the level name,
//! the player's start, the signal wiring, Info texts and dispenser settings.
//! It is plain serde data; validation happens when a
//! [`Level`](crate::level::Level) is built from it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LoadError;

// ---------------------------------------------------------------------------
// Coord
// ---------------------------------------------------------------------------

/// An unvalidated `(row, col)` pair as written in a level description.
///
/// Turn it into a bounds-checked [`Position`](crate::grid::Position) with
/// [`Grid::position_at`](crate::grid::Grid::position_at) before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ---------------------------------------------------------------------------
// Metadata entries
// ---------------------------------------------------------------------------

/// One source cell and the cells its signal reaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    pub source: Coord,
    pub targets: Vec<Coord>,
}

/// Display text for an Info cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoText {
    pub at: Coord,
    pub text: String,
}

/// Per-dispenser settings. Dispensers without an entry use the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispenserSpec {
    pub at: Coord,
    /// Spawn a replacement whenever the live item is destroyed.
    #[serde(default = "default_true")]
    pub auto_respawn: bool,
    /// Spawn the first item while the level is being built.
    #[serde(default)]
    pub dispense_on_load: bool,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// LevelDescription
// ---------------------------------------------------------------------------

/// A complete description of one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDescription {
    /// Display name.
    pub name: String,
    /// The character grid, one string per row. All rows have equal length.
    pub rows: Vec<String>,
    /// Where the player appears.
    pub player_start: Coord,
    /// Signal wiring: every target gets the source as an activator.
    #[serde(default)]
    pub wiring: Vec<Wire>,
    /// Texts for Info cells.
    #[serde(default)]
    pub texts: Vec<InfoText>,
    /// Dispenser overrides.
    #[serde(default)]
    pub dispensers: Vec<DispenserSpec>,
}

impl LevelDescription {
    /// Start a description from a name, grid rows and the player start.
    pub fn new(name: &str, rows: &[&str], player_start: Coord) -> Self {
        Self {
            name: name.to_owned(),
            rows: rows.iter().map(|r| (*r).to_owned()).collect(),
            player_start,
            wiring: Vec::new(),
            texts: Vec::new(),
            dispensers: Vec::new(),
        }
    }

    /// Add a wire from `source` to each of `targets`.
    pub fn with_wire(mut self, source: Coord, targets: &[Coord]) -> Self {
        self.wiring.push(Wire {
            source,
            targets: targets.to_vec(),
        });
        self
    }

    /// Attach display text to the Info cell at `at`.
    pub fn with_text(mut self, at: Coord, text: &str) -> Self {
        self.texts.push(InfoText {
            at,
            text: text.to_owned(),
        });
        self
    }

    /// Override the settings of the dispenser at `at`.
    pub fn with_dispenser(mut self, at: Coord, auto_respawn: bool, dispense_on_load: bool) -> Self {
        self.dispensers.push(DispenserSpec {
            at,
            auto_respawn,
            dispense_on_load,
        });
        self
    }

    /// Parse a description from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Json`] if the text is not a valid description.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of rows in the character grid.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns, taken from the first row.
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, |r| r.chars().count())
    }
}

// ---------------------------------------------------------------------------
// LevelSource
// ---------------------------------------------------------------------------

/// Anything that can hand out level descriptions by index.
///
/// This is the seam to the on-disk loader; the engine only needs to know how
/// many levels exist and how to fetch one.
pub trait LevelSource {
    /// Number of levels available.
    fn level_count(&self) -> usize;

    /// Fetch the description of level `index`.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the level cannot be produced.
    fn load(&self, index: usize) -> Result<LevelDescription, LoadError>;
}

/// A fixed, in-memory list of levels.
#[derive(Debug, Clone, Default)]
pub struct StaticLevels {
    levels: Vec<LevelDescription>,
}

impl StaticLevels {
    pub fn new(levels: Vec<LevelDescription>) -> Self {
        Self { levels }
    }

    /// Parse a JSON array of level descriptions.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Json`] on malformed input.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

impl LevelSource for StaticLevels {
    fn level_count(&self) -> usize {
        self.levels.len()
    }

    fn load(&self, index: usize) -> Result<LevelDescription, LoadError> {
        self.levels
            .get(index)
            .cloned()
            .ok_or(LoadError::MissingLevel {
                index,
                count: self.levels.len(),
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_json_with_defaults() {
        let json = r#"{
            "name": "first",
            "rows": ["  !", "*C_"],
            "player_start": {"row": 0, "col": 0},
            "dispensers": [{"at": {"row": 1, "col": 1}}]
        }"#;
        let desc = LevelDescription::from_json(json).unwrap();
        assert_eq!(desc.name, "first");
        assert_eq!(desc.row_count(), 2);
        assert_eq!(desc.column_count(), 3);
        assert!(desc.wiring.is_empty());
        assert!(desc.dispensers[0].auto_respawn);
        assert!(!desc.dispensers[0].dispense_on_load);
    }

    #[test]
    fn malformed_json_is_a_load_error() {
        let err = LevelDescription::from_json("{\"name\": 3}").unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[test]
    fn static_levels_report_count_and_missing_index() {
        let levels = StaticLevels::new(vec![LevelDescription::new("a", &[" "], Coord::new(0, 0))]);
        assert_eq!(levels.level_count(), 1);
        assert_eq!(levels.load(0).unwrap().name, "a");
        assert!(matches!(
            levels.load(1),
            Err(LoadError::MissingLevel { index: 1, count: 1 })
        ));
    }

    #[test]
    fn builder_methods_accumulate_metadata() {
        let desc = LevelDescription::new("b", &["BI"], Coord::new(0, 0))
            .with_wire(Coord::new(0, 0), &[Coord::new(0, 1)])
            .with_text(Coord::new(0, 1), "hello");
        assert_eq!(desc.wiring.len(), 1);
        assert_eq!(desc.texts[0].text, "hello");
    }
}
