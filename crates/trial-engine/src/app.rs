//! Headless entry points.
//!
//! [`run_headless`] plays the whole game (menu, levels, checkpoint) against
//! any input source and renderer. [`trace_level`] plays one level without
//! machines and records a state hash per frame, which is how determinism is
//! checked: two traces of the same input must agree frame for frame.

use serde::{Deserialize, Serialize};
use trial_world::description::{LevelDescription, LevelSource};
use trial_world::level::LevelEvent;

use crate::checkpoint::CheckpointStore;
use crate::config::EngineConfig;
use crate::input::{InputEvent, InputSource};
use crate::machine::{run, ExitCode, Frontend};
use crate::machines::menu::RootMenu;
use crate::render::Renderer;
use crate::session::LevelSession;

/// Run the root menu until it exits.
///
/// # Errors
///
/// Returns an error if `config` is invalid, if `levels` is empty, or if the
/// root machine itself failed (see logs for details). A level that fails
/// returns to the menu and is not an error here.
pub fn run_headless<S: LevelSource, K: CheckpointStore>(
    levels: S,
    checkpoint: K,
    config: EngineConfig,
    input: &mut dyn InputSource,
    renderer: &mut dyn Renderer,
) -> Result<ExitCode, anyhow::Error> {
    config.validate()?;
    if levels.level_count() == 0 {
        return Err(anyhow::anyhow!("level source is empty"));
    }

    tracing::info!(
        levels = levels.level_count(),
        headless = config.headless,
        "starting game"
    );
    let mut io = Frontend::new(input, renderer);
    let mut menu = RootMenu::new(levels, checkpoint, config);
    match run(&mut menu, &mut io) {
        ExitCode::Failed => Err(anyhow::anyhow!(
            "root menu failed (see logs for details)"
        )),
        code => Ok(code),
    }
}

// ---------------------------------------------------------------------------
// LevelTrace
// ---------------------------------------------------------------------------

/// Per-frame state hashes of one level played from a script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTrace {
    /// `hashes[i]` is the state hash after frame `i + 1`.
    pub hashes: Vec<String>,
    /// Whether the player reached the exit.
    pub completed: bool,
}

impl LevelTrace {
    pub fn frames(&self) -> usize {
        self.hashes.len()
    }

    /// Index of the first frame whose hash differs from `other`'s, or the
    /// length of the shorter trace if one is a prefix of the other.
    pub fn first_divergence(&self, other: &LevelTrace) -> Option<usize> {
        let diverged = self
            .hashes
            .iter()
            .zip(&other.hashes)
            .position(|(a, b)| a != b);
        match diverged {
            Some(frame) => Some(frame),
            None if self.hashes.len() != other.hashes.len() => {
                Some(self.hashes.len().min(other.hashes.len()))
            }
            None => None,
        }
    }
}

/// Play `desc` from `input` without menus or popups, hashing every frame.
///
/// Moves and interactions are applied, other input is ignored. The trace
/// ends when the exit is reached, on `Quit`, or when input runs out.
///
/// # Errors
///
/// Returns an error if the level fails to build or an invariant breaks.
pub fn trace_level(
    desc: &LevelDescription,
    config: &EngineConfig,
    input: &mut dyn InputSource,
) -> Result<LevelTrace, anyhow::Error> {
    let mut session = LevelSession::new(desc, config)?;
    let mut trace = LevelTrace::default();

    while let Some(events) = input.poll_frame() {
        if events.contains(&InputEvent::Quit) {
            break;
        }
        for event in events {
            match event {
                InputEvent::Move(direction) => {
                    session.request_move(direction);
                }
                InputEvent::Interact => {
                    session.interact()?;
                }
                _ => {}
            }
        }
        session.advance()?;
        trace.hashes.push(session.state_hash()?);

        if session
            .drain_events()
            .iter()
            .any(|e| matches!(e, LevelEvent::LevelComplete))
        {
            session.end_level();
            trace.completed = true;
            break;
        }
    }

    tracing::info!(
        level = %desc.name,
        frames = trace.frames(),
        completed = trace.completed,
        "level traced"
    );
    Ok(trace)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::MemoryCheckpoint;
    use crate::input::ScriptedInput;
    use crate::movement::Direction;
    use crate::render::NullRenderer;
    use trial_world::prelude::*;

    #[test]
    fn invalid_config_is_rejected() {
        let levels = StaticLevels::new(vec![LevelDescription::new("l", &[" "], Coord::new(0, 0))]);
        let config = EngineConfig {
            move_ticks: 0,
            ..EngineConfig::default()
        };
        let mut input = ScriptedInput::builder().build();
        let result = run_headless(
            levels,
            MemoryCheckpoint::default(),
            config,
            &mut input,
            &mut NullRenderer,
        );
        assert!(result.is_err());
    }

    #[test]
    fn empty_source_is_rejected() {
        let mut input = ScriptedInput::builder().build();
        let result = run_headless(
            StaticLevels::default(),
            MemoryCheckpoint::default(),
            EngineConfig::default(),
            &mut input,
            &mut NullRenderer,
        );
        assert!(result.is_err());
    }

    #[test]
    fn trace_stops_at_exit() {
        let desc = LevelDescription::new("t", &["  !"], Coord::new(0, 0));
        let config = EngineConfig::default();
        let mut input = ScriptedInput::builder()
            .walk(Direction::Right, config.move_ticks)
            .walk(Direction::Right, config.move_ticks)
            .idle(10)
            .build();
        let trace = trace_level(&desc, &config, &mut input).unwrap();
        assert!(trace.completed);
        // The second walk starts on frame 7 and commits on frame 11.
        assert_eq!(trace.frames(), 11);
    }

    #[test]
    fn divergence_is_located() {
        let a = LevelTrace {
            hashes: vec!["x".into(), "y".into()],
            completed: false,
        };
        let mut b = a.clone();
        assert_eq!(a.first_divergence(&b), None);
        b.hashes.push("z".into());
        assert_eq!(a.first_divergence(&b), Some(2));
        b.hashes[1] = "w".into();
        assert_eq!(a.first_divergence(&b), Some(1));
    }
}
