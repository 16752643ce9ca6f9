//! Takeable items and their arena.
//!
//! An [`ItemId`] packs a *generation* counter in the high 32 bits and a slot
//! *index* in the low 32 bits. The generation is bumped whenever a slot is
//! freed, so an id kept after its item was destroyed is detected as stale
//! instead of silently aliasing the next item spawned into that slot.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::{Point, Position};
use crate::WorldError;

// ---------------------------------------------------------------------------
// ItemId
// ---------------------------------------------------------------------------

/// A generational item identifier.
///
/// Layout: `[generation: u32 | index: u32]`
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(u64);

impl ItemId {
    #[inline]
    pub fn new(index: u32, generation: u32) -> Self {
        Self((generation as u64) << 32 | index as u64)
    }

    /// The slot index (low 32 bits).
    #[inline]
    pub fn index(self) -> u32 {
        self.0 as u32
    }

    /// The generation (high 32 bits).
    #[inline]
    pub fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item {}v{}", self.index(), self.generation())
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// What an item is. Cubes are the only takeable in the game so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Cube,
}

/// Where an item currently is. An item is never both lying and held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Lying on the cell at this position (and listed in its occupants).
    Lying(Position),
    /// In the player's hands.
    Held,
}

/// A live takeable.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    pub placement: Placement,
    /// Fractional pixel position of the item's top-left corner while lying.
    pub render: Point,
    /// The dispenser that produced this item, if any.
    pub dispenser: Option<Position>,
}

// ---------------------------------------------------------------------------
// ItemArena
// ---------------------------------------------------------------------------

/// Storage for live items with generational slot recycling.
///
/// Free slots are reused in FIFO order so generations spread out over time.
#[derive(Debug, Clone, Default)]
pub struct ItemArena {
    slots: Vec<Option<Item>>,
    generations: Vec<u32>,
    free: VecDeque<u32>,
}

impl ItemArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an item and return its fresh id.
    pub fn insert(&mut self, item: Item) -> ItemId {
        if let Some(index) = self.free.pop_front() {
            self.slots[index as usize] = Some(item);
            ItemId::new(index, self.generations[index as usize])
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Some(item));
            self.generations.push(0);
            ItemId::new(index, 0)
        }
    }

    /// Remove an item, making `id` stale.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::StaleItem`] if `id` is not live.
    pub fn remove(&mut self, id: ItemId) -> Result<Item, WorldError> {
        if !self.contains(id) {
            return Err(WorldError::StaleItem(id));
        }
        let idx = id.index() as usize;
        let item = self.slots[idx].take().ok_or(WorldError::StaleItem(id))?;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free.push_back(id.index());
        Ok(item)
    }

    /// Whether `id` refers to a live item.
    pub fn contains(&self, id: ItemId) -> bool {
        let idx = id.index() as usize;
        idx < self.slots.len()
            && self.generations[idx] == id.generation()
            && self.slots[idx].is_some()
    }

    pub fn get(&self, id: ItemId) -> Result<&Item, WorldError> {
        if !self.contains(id) {
            return Err(WorldError::StaleItem(id));
        }
        self.slots[id.index() as usize]
            .as_ref()
            .ok_or(WorldError::StaleItem(id))
    }

    pub fn get_mut(&mut self, id: ItemId) -> Result<&mut Item, WorldError> {
        if !self.contains(id) {
            return Err(WorldError::StaleItem(id));
        }
        self.slots[id.index() as usize]
            .as_mut()
            .ok_or(WorldError::StaleItem(id))
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live items in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &Item)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.as_ref()
                .map(|item| (ItemId::new(i as u32, self.generations[i]), item))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
