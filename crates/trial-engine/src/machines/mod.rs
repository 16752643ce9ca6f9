//! The concrete machines of the game and the menu cursor they share.

pub mod intro;
pub mod level;
pub mod menu;
pub mod pause;
pub mod popup;

use crate::input::InputEvent;
use crate::movement::Direction;
use crate::render::MenuView;

/// A vertical list of entries with a highlighted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuCursor {
    title: String,
    items: Vec<String>,
    selected: usize,
}

impl MenuCursor {
    pub fn new(title: &str, items: &[&str]) -> Self {
        Self {
            title: title.to_owned(),
            items: items.iter().map(|s| (*s).to_owned()).collect(),
            selected: 0,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Move the highlight for `event`, wrapping at both ends. Returns the
    /// chosen index if `event` confirms the highlighted entry.
    pub fn navigate(&mut self, event: InputEvent) -> Option<usize> {
        let len = self.items.len();
        if len == 0 {
            return None;
        }
        match event {
            InputEvent::Move(Direction::Up) => self.selected = (self.selected + len - 1) % len,
            InputEvent::Move(Direction::Down) => self.selected = (self.selected + 1) % len,
            InputEvent::Confirm | InputEvent::Interact => return Some(self.selected),
            _ => {}
        }
        None
    }

    pub fn view(&self) -> MenuView {
        MenuView {
            title: self.title.clone(),
            items: self.items.clone(),
            selected: self.selected,
        }
    }
}
