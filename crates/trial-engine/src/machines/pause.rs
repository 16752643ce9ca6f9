//! Pause overlay.

use crate::input::InputEvent;
use crate::machine::{wants_quit, ExitCode, Frontend, Machine};
use crate::machines::MenuCursor;
use crate::render::{FrameView, LevelView, Scene};
use crate::EngineError;

const RESUME: usize = 0;
const RESTART: usize = 1;
const MAIN_MENU: usize = 2;
const QUIT: usize = 3;

/// The pause menu over a frozen view of the level.
///
/// Exit codes: `Done` (resume), `Restart`, `ToMenu`, `Quit`.
#[derive(Debug, Clone)]
pub struct Pause {
    backdrop: LevelView,
    menu: MenuCursor,
    frame: u64,
    code: Option<ExitCode>,
}

impl Pause {
    pub fn new(backdrop: LevelView) -> Self {
        Self {
            backdrop,
            menu: MenuCursor::new("Paused", &["Resume", "Restart", "Main menu", "Quit"]),
            frame: 0,
            code: None,
        }
    }
}

impl Machine for Pause {
    fn name(&self) -> &str {
        "pause"
    }

    fn handle_input(&mut self, events: &[InputEvent], _: &mut Frontend<'_>) -> Result<(), EngineError> {
        if wants_quit(events) {
            self.code = Some(ExitCode::Quit);
            return Ok(());
        }
        for &event in events {
            if event == InputEvent::Pause {
                self.code = Some(ExitCode::Done);
                break;
            }
            if let Some(choice) = self.menu.navigate(event) {
                self.code = Some(match choice {
                    RESUME => ExitCode::Done,
                    RESTART => ExitCode::Restart,
                    MAIN_MENU => ExitCode::ToMenu,
                    QUIT => ExitCode::Quit,
                    _ => continue,
                });
                break;
            }
        }
        Ok(())
    }

    fn tick(&mut self, io: &mut Frontend<'_>) -> Result<(), EngineError> {
        self.frame += 1;
        io.present(&FrameView {
            frame: self.frame,
            scene: Scene::Pause {
                level: self.backdrop.clone(),
                menu: self.menu.view(),
            },
        });
        Ok(())
    }

    fn exit_code(&self) -> Option<ExitCode> {
        self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScriptedInput;
    use crate::machine::run;
    use crate::movement::Direction;
    use crate::render::NullRenderer;

    fn backdrop() -> LevelView {
        LevelView {
            name: "frozen".into(),
            rows: 0,
            cols: 0,
            tile_size: 50.0,
            cells: Vec::new(),
            items: Vec::new(),
            player: Default::default(),
            camera: Default::default(),
        }
    }

    fn outcome(script: ScriptedInput) -> ExitCode {
        let mut input = script;
        let mut renderer = NullRenderer;
        let mut io = Frontend::new(&mut input, &mut renderer);
        run(&mut Pause::new(backdrop()), &mut io)
    }

    #[test]
    fn every_entry_maps_to_its_code() {
        let down = InputEvent::Move(Direction::Down);
        let pick = |downs: usize| {
            let mut b = ScriptedInput::builder();
            for _ in 0..downs {
                b = b.press(down);
            }
            outcome(b.press(InputEvent::Confirm).build())
        };
        assert_eq!(pick(0), ExitCode::Done);
        assert_eq!(pick(1), ExitCode::Restart);
        assert_eq!(pick(2), ExitCode::ToMenu);
        assert_eq!(pick(3), ExitCode::Quit);
    }

    #[test]
    fn pause_key_resumes() {
        let script = ScriptedInput::builder().idle(3).press(InputEvent::Pause).build();
        assert_eq!(outcome(script), ExitCode::Done);
    }
}
