//! The root machine: title menu and level progression.

use trial_world::description::LevelSource;

use crate::checkpoint::CheckpointStore;
use crate::config::EngineConfig;
use crate::input::InputEvent;
use crate::machine::{run, wants_quit, ExitCode, Frontend, Machine};
use crate::machines::intro::Intro;
use crate::machines::level::LevelRunner;
use crate::machines::MenuCursor;
use crate::render::{FrameView, Scene};
use crate::EngineError;

const PLAY: usize = 0;
const RESET: usize = 1;
const QUIT: usize = 2;

/// Title menu. `Play` runs levels from the saved checkpoint until the player
/// leaves, `Reset progress` starts over from the first level.
///
/// Completing a level saves the index of the next one. Completing the last
/// level wraps the checkpoint back to the first and returns to the menu. A
/// level that fails to load or aborts is logged and also returns here.
#[derive(Debug)]
pub struct RootMenu<S, K> {
    levels: S,
    checkpoint: K,
    config: EngineConfig,
    title: String,
    next_level: usize,
    menu: MenuCursor,
    frame: u64,
    code: Option<ExitCode>,
}

impl<S: LevelSource, K: CheckpointStore> RootMenu<S, K> {
    pub fn new(levels: S, checkpoint: K, config: EngineConfig) -> Self {
        let title = "Trial".to_owned();
        Self {
            levels,
            checkpoint,
            config,
            menu: MenuCursor::new(&title, &["Play", "Reset progress", "Quit"]),
            title,
            next_level: 0,
            frame: 0,
            code: None,
        }
    }

    /// Index of the level `Play` starts from.
    pub fn next_level(&self) -> usize {
        self.next_level
    }

    pub fn checkpoint(&self) -> &K {
        &self.checkpoint
    }

    pub fn levels(&self) -> &S {
        &self.levels
    }

    fn play_one(&self, index: usize, io: &mut Frontend<'_>) -> ExitCode {
        let desc = match self.levels.load(index) {
            Ok(desc) => desc,
            Err(e) => {
                tracing::error!(index, error = %e, "level failed to load");
                return ExitCode::Failed;
            }
        };
        match LevelRunner::new(&desc, &self.config) {
            Ok(mut runner) => run(&mut runner, io),
            Err(e) => {
                tracing::error!(index, level = %desc.name, error = %e, "level failed to build");
                ExitCode::Failed
            }
        }
    }

    /// Play from the checkpoint until something sends us back to the menu.
    fn play(&mut self, io: &mut Frontend<'_>) -> Result<(), EngineError> {
        loop {
            let index = self.next_level;
            match self.play_one(index, io) {
                ExitCode::LevelComplete => {
                    self.next_level = index + 1;
                    if self.next_level >= self.levels.level_count() {
                        tracing::info!(levels = self.levels.level_count(), "all levels complete");
                        self.next_level = 0;
                        self.checkpoint.save(self.next_level)?;
                        return Ok(());
                    }
                    self.checkpoint.save(self.next_level)?;
                }
                ExitCode::Restart => {
                    tracing::info!(index, "restarting level");
                }
                ExitCode::Quit => {
                    self.code = Some(ExitCode::Quit);
                    return Ok(());
                }
                ExitCode::Done | ExitCode::ToMenu | ExitCode::Failed => return Ok(()),
            }
        }
    }
}

impl<S: LevelSource, K: CheckpointStore> Machine for RootMenu<S, K> {
    fn name(&self) -> &str {
        "root_menu"
    }

    fn start(&mut self, io: &mut Frontend<'_>) -> Result<(), EngineError> {
        let count = self.levels.level_count();
        if count == 0 {
            return Err(EngineError::NoLevels);
        }
        let saved = self.checkpoint.load()?;
        self.next_level = if saved < count {
            saved
        } else {
            tracing::warn!(saved, count, "checkpoint past the last level, starting over");
            0
        };

        if self.config.intro_ticks > 0 {
            let mut intro = Intro::new(self.title.clone(), self.config.intro_ticks);
            if run(&mut intro, io) == ExitCode::Quit {
                self.code = Some(ExitCode::Quit);
            }
        }
        Ok(())
    }

    fn handle_input(&mut self, events: &[InputEvent], io: &mut Frontend<'_>) -> Result<(), EngineError> {
        if wants_quit(events) {
            self.code = Some(ExitCode::Quit);
            return Ok(());
        }
        for &event in events {
            match self.menu.navigate(event) {
                Some(PLAY) => {
                    // The rest of this frame's events predate the play.
                    self.play(io)?;
                    break;
                }
                Some(RESET) => {
                    tracing::info!("progress reset");
                    self.next_level = 0;
                    self.checkpoint.save(0)?;
                }
                Some(QUIT) => self.code = Some(ExitCode::Quit),
                _ => {}
            }
            if self.code.is_some() {
                break;
            }
        }
        Ok(())
    }

    fn tick(&mut self, io: &mut Frontend<'_>) -> Result<(), EngineError> {
        self.frame += 1;
        io.present(&FrameView {
            frame: self.frame,
            scene: Scene::Menu(self.menu.view()),
        });
        Ok(())
    }

    fn quit(&mut self, _: &mut Frontend<'_>) -> Result<(), EngineError> {
        self.checkpoint.save(self.next_level)
    }

    fn exit_code(&self) -> Option<ExitCode> {
        self.code
    }
}
