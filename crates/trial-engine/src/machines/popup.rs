//! Blocking text popup.

use crate::input::InputEvent;
use crate::machine::{wants_quit, ExitCode, Frontend, Machine};
use crate::render::{FrameView, Scene};
use crate::EngineError;

/// Shows a text until any input arrives.
#[derive(Debug, Clone)]
pub struct TextPopup {
    text: String,
    frame: u64,
    code: Option<ExitCode>,
}

impl TextPopup {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            frame: 0,
            code: None,
        }
    }
}

impl Machine for TextPopup {
    fn name(&self) -> &str {
        "text_popup"
    }

    fn handle_input(&mut self, events: &[InputEvent], _: &mut Frontend<'_>) -> Result<(), EngineError> {
        if wants_quit(events) {
            self.code = Some(ExitCode::Quit);
        } else if !events.is_empty() {
            self.code = Some(ExitCode::Done);
        }
        Ok(())
    }

    fn tick(&mut self, io: &mut Frontend<'_>) -> Result<(), EngineError> {
        self.frame += 1;
        io.present(&FrameView {
            frame: self.frame,
            scene: Scene::Popup {
                text: self.text.clone(),
            },
        });
        Ok(())
    }

    fn exit_code(&self) -> Option<ExitCode> {
        self.code
    }
}
