//! Title fade shown before the root menu.

use crate::animation::{Animation, GateContext, Motion};
use crate::gate::ActionGate;
use crate::input::InputEvent;
use crate::machine::{wants_quit, ExitCode, Frontend, Machine};
use crate::render::{FrameView, Scene};
use crate::schedule::Scheduler;
use crate::EngineError;

const INTRO_FADE: &str = "INTRO_FADE";

#[derive(Debug, Default)]
struct FadeState {
    gate: ActionGate,
    alpha: f64,
    faded: bool,
}

impl GateContext for FadeState {
    fn gate(&mut self) -> &mut ActionGate {
        &mut self.gate
    }
}

struct FadeIn;

impl Motion<FadeState> for FadeIn {
    fn advance(&mut self, state: &mut FadeState, tick: u32, duration: u32) -> Result<(), EngineError> {
        state.alpha = f64::from(tick) / f64::from(duration);
        Ok(())
    }

    fn finish(&mut self, state: &mut FadeState) -> Result<(), EngineError> {
        state.faded = true;
        Ok(())
    }
}

/// Fades the title in over a fixed number of frames. `Confirm` or `Interact`
/// skips it.
#[derive(Debug)]
pub struct Intro {
    title: String,
    ticks: u32,
    state: FadeState,
    scheduler: Scheduler<FadeState>,
    frame: u64,
    code: Option<ExitCode>,
}

impl Intro {
    pub fn new(title: impl Into<String>, ticks: u32) -> Self {
        Self {
            title: title.into(),
            ticks,
            state: FadeState::default(),
            scheduler: Scheduler::new(),
            frame: 0,
            code: None,
        }
    }
}

impl Machine for Intro {
    fn name(&self) -> &str {
        "intro"
    }

    fn start(&mut self, _: &mut Frontend<'_>) -> Result<(), EngineError> {
        Animation::new(INTRO_FADE, self.ticks, FadeIn).start(&mut self.state, &mut self.scheduler);
        Ok(())
    }

    fn handle_input(&mut self, events: &[InputEvent], _: &mut Frontend<'_>) -> Result<(), EngineError> {
        if wants_quit(events) {
            self.code = Some(ExitCode::Quit);
        } else if events
            .iter()
            .any(|e| matches!(e, InputEvent::Confirm | InputEvent::Interact))
        {
            tracing::debug!(frame = self.frame, "intro skipped");
            self.code = Some(ExitCode::Done);
        }
        Ok(())
    }

    fn tick(&mut self, io: &mut Frontend<'_>) -> Result<(), EngineError> {
        self.frame += 1;
        self.scheduler.drain(&mut self.state)?;
        io.present(&FrameView {
            frame: self.frame,
            scene: Scene::Intro {
                title: self.title.clone(),
                alpha: self.state.alpha,
            },
        });
        if self.state.faded && self.code.is_none() {
            self.code = Some(ExitCode::Done);
        }
        Ok(())
    }

    fn exit_code(&self) -> Option<ExitCode> {
        self.code
    }
}
