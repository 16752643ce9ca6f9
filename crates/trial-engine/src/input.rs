//! Input events, input sources and input recording.
//!
//! The frame loop asks an [`InputSource`] for one frame of events at a time.
//! A source that has run dry returns `None`; the loop treats that as a quit
//! request so scripted runs always terminate.
//!
//! [`RecordingInput`] wraps any source and writes what it hands out into an
//! [`InputLog`], which serializes to JSON and replays through
//! [`ScriptedInput`]. Because the logic is deterministic for a given config,
//! replaying a log reproduces the same frames.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::movement::Direction;
use crate::EngineError;

/// A logical input event. Key mapping is the frontend's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    Move(Direction),
    /// Put down, pick up, or activate.
    Interact,
    /// Open or close the pause menu.
    Pause,
    /// Choose the highlighted menu entry or dismiss a popup.
    Confirm,
    /// Close the game.
    Quit,
}

/// Produces input one frame at a time.
pub trait InputSource {
    /// The events of the next frame, or `None` once the source is exhausted.
    fn poll_frame(&mut self) -> Option<Vec<InputEvent>>;
}

// ---------------------------------------------------------------------------
// ScriptedInput
// ---------------------------------------------------------------------------

/// Replays a fixed list of frames.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<Vec<InputEvent>>,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = Vec<InputEvent>>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// A script builder: `ScriptedInput::builder().press(Interact).idle(5)`.
    pub fn builder() -> ScriptBuilder {
        ScriptBuilder::default()
    }

    /// Frames not yet handed out.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll_frame(&mut self) -> Option<Vec<InputEvent>> {
        self.frames.pop_front()
    }
}

/// Builds a frame script.
#[derive(Debug, Clone, Default)]
pub struct ScriptBuilder {
    frames: Vec<Vec<InputEvent>>,
}

impl ScriptBuilder {
    /// One frame containing `event`.
    pub fn press(mut self, event: InputEvent) -> Self {
        self.frames.push(vec![event]);
        self
    }

    /// `frames` frames without input.
    pub fn idle(mut self, frames: usize) -> Self {
        self.frames
            .extend(std::iter::repeat_with(Vec::new).take(frames));
        self
    }

    /// A move followed by enough idle frames for the walk to complete.
    pub fn walk(self, direction: Direction, move_ticks: u32) -> Self {
        self.press(InputEvent::Move(direction))
            .idle(move_ticks as usize)
    }

    pub fn build(self) -> ScriptedInput {
        ScriptedInput::new(self.frames)
    }
}

// ---------------------------------------------------------------------------
// InputLog / RecordingInput
// ---------------------------------------------------------------------------

/// A recorded input session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputLog {
    /// Events of every polled frame, in order. Empty frames are kept so frame
    /// numbers line up on replay.
    pub frames: Vec<Vec<InputEvent>>,
}

impl InputLog {
    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// A source replaying this log.
    pub fn replay(&self) -> ScriptedInput {
        ScriptedInput::new(self.frames.iter().cloned())
    }
}

/// Passes input through from `inner` while recording it.
#[derive(Debug)]
pub struct RecordingInput<S> {
    inner: S,
    log: InputLog,
}

impl<S: InputSource> RecordingInput<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            log: InputLog::default(),
        }
    }

    pub fn log(&self) -> &InputLog {
        &self.log
    }

    /// Stop recording and return the log.
    pub fn finish(self) -> InputLog {
        self.log
    }
}

impl<S: InputSource> InputSource for RecordingInput<S> {
    fn poll_frame(&mut self) -> Option<Vec<InputEvent>> {
        let frame = self.inner.poll_frame()?;
        self.log.frames.push(frame.clone());
        Some(frame)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
