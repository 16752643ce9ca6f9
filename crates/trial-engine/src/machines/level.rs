//! The machine that plays one level.

use trial_world::description::LevelDescription;
use trial_world::level::LevelEvent;

use crate::config::EngineConfig;
use crate::input::InputEvent;
use crate::machine::{run, ExitCode, Frontend, Machine};
use crate::machines::pause::Pause;
use crate::machines::popup::TextPopup;
use crate::render::{FrameView, Scene};
use crate::session::LevelSession;
use crate::EngineError;

/// Plays one level until the exit is reached or the player leaves.
///
/// Directional input walks, `Interact` interacts, `Pause` opens the pause
/// overlay and `Quit` quits. Info texts open a blocking popup. Reaching the
/// exit ends the run with [`ExitCode::LevelComplete`].
#[derive(Debug)]
pub struct LevelRunner {
    session: LevelSession,
    code: Option<ExitCode>,
}

impl LevelRunner {
    /// # Errors
    ///
    /// [`EngineError::Load`] if the level cannot be built.
    pub fn new(desc: &LevelDescription, config: &EngineConfig) -> Result<Self, EngineError> {
        Ok(Self {
            session: LevelSession::new(desc, config)?,
            code: None,
        })
    }

    pub fn session(&self) -> &LevelSession {
        &self.session
    }

    fn finish(&mut self, code: ExitCode) {
        if self.code.is_none() {
            self.code = Some(code);
        }
    }

    /// React to everything the level queued since the last call.
    fn react(&mut self, io: &mut Frontend<'_>) {
        for event in self.session.drain_events() {
            match event {
                LevelEvent::ShowText(text) => match run(&mut TextPopup::new(text), io) {
                    ExitCode::Done => {}
                    other => self.finish(other),
                },
                LevelEvent::LevelComplete => {
                    self.session.end_level();
                    tracing::info!(
                        level = %self.session.level().name(),
                        frame = self.session.frame(),
                        "level complete"
                    );
                    self.finish(ExitCode::LevelComplete);
                }
                LevelEvent::ItemSpawned { item, at } => {
                    tracing::debug!(%item, %at, "item spawned");
                }
                LevelEvent::ItemDestroyed { item } => {
                    tracing::debug!(%item, "item destroyed");
                }
            }
            if self.code.is_some() {
                break;
            }
        }
    }
}

impl Machine for LevelRunner {
    fn name(&self) -> &str {
        "level"
    }

    fn handle_input(&mut self, events: &[InputEvent], io: &mut Frontend<'_>) -> Result<(), EngineError> {
        for &event in events {
            match event {
                InputEvent::Quit => self.finish(ExitCode::Quit),
                InputEvent::Move(direction) => {
                    self.session.request_move(direction);
                }
                InputEvent::Interact => {
                    self.session.interact()?;
                    self.react(io);
                }
                InputEvent::Pause => {
                    let mut pause = Pause::new(self.session.view());
                    match run(&mut pause, io) {
                        ExitCode::Done => {}
                        other => self.finish(other),
                    }
                }
                InputEvent::Confirm => {}
            }
            if self.code.is_some() {
                break;
            }
        }
        Ok(())
    }

    fn tick(&mut self, io: &mut Frontend<'_>) -> Result<(), EngineError> {
        self.session.advance()?;
        self.react(io);
        io.present(&FrameView {
            frame: self.session.frame(),
            scene: Scene::Level(self.session.view()),
        });
        Ok(())
    }

    fn quit(&mut self, _: &mut Frontend<'_>) -> Result<(), EngineError> {
        let problems = self.session.level().audit();
        for problem in &problems {
            tracing::warn!(%problem, "level left inconsistent");
        }
        Ok(())
    }

    fn exit_code(&self) -> Option<ExitCode> {
        self.code
    }
}
