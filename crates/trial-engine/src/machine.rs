//! The state machine contract and its driver.
//!
//! Every screen of the game (root menu, level runner, pause overlay, text
//! popup, intro) is a [`Machine`]. [`run`] drives one machine to completion:
//!
//! ```text
//! start ──▶ ┌─ poll input ─▶ handle_input ─▶ tick ─┐ ──▶ quit ──▶ ExitCode
//!           └────────── while exit_code is None ───┘
//! ```
//!
//! A machine may run a child machine from inside its own `handle_input` by
//! calling [`run`] again with the same [`Frontend`]. The parent is suspended
//! for as long as the child runs, then reads the child's [`ExitCode`] and
//! decides what to do next. The machine stack is simply the call stack.

use serde::{Deserialize, Serialize};

use crate::input::{InputEvent, InputSource};
use crate::render::{FrameView, Renderer};
use crate::EngineError;

/// How a machine ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitCode {
    /// Finished normally; the parent continues.
    Done,
    /// The player reached the exit.
    LevelComplete,
    /// Play the current level again.
    Restart,
    /// Go back to the root menu.
    ToMenu,
    /// Close the game.
    Quit,
    /// An invariant broke or a load failed.
    Failed,
}

/// The collaborators every machine shares: where input comes from and where
/// frames go.
pub struct Frontend<'a> {
    pub input: &'a mut dyn InputSource,
    pub renderer: &'a mut dyn Renderer,
}

impl<'a> Frontend<'a> {
    pub fn new(input: &'a mut dyn InputSource, renderer: &'a mut dyn Renderer) -> Self {
        Self { input, renderer }
    }

    pub fn present(&mut self, frame: &FrameView) {
        self.renderer.present(frame);
    }
}

impl std::fmt::Debug for Frontend<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frontend").finish_non_exhaustive()
    }
}

/// One screen of the game.
pub trait Machine {
    /// Name used for the tracing span.
    fn name(&self) -> &str;

    /// One-time setup before the first frame.
    fn start(&mut self, _io: &mut Frontend<'_>) -> Result<(), EngineError> {
        Ok(())
    }

    /// React to one frame of input. May run child machines.
    fn handle_input(
        &mut self,
        events: &[InputEvent],
        io: &mut Frontend<'_>,
    ) -> Result<(), EngineError>;

    /// Advance one frame and present it.
    fn tick(&mut self, io: &mut Frontend<'_>) -> Result<(), EngineError>;

    /// Teardown, run once whatever the outcome.
    fn quit(&mut self, _io: &mut Frontend<'_>) -> Result<(), EngineError> {
        Ok(())
    }

    /// `None` while running.
    fn exit_code(&self) -> Option<ExitCode>;
}

/// Run `machine` to completion and return its exit code.
///
/// An exhausted input source is delivered as a single [`InputEvent::Quit`].
/// Any error from a hook is logged, `quit` still runs, and the result is
/// [`ExitCode::Failed`].
pub fn run<M: Machine + ?Sized>(machine: &mut M, io: &mut Frontend<'_>) -> ExitCode {
    let span = tracing::info_span!("machine", name = %machine.name());
    let _enter = span.enter();
    tracing::info!("started");

    let outcome = drive(machine, io);
    let teardown = machine.quit(io);

    let code = match (outcome, teardown) {
        (Ok(code), Ok(())) => code,
        (Err(e), _) | (Ok(_), Err(e)) => {
            tracing::error!(error = %e, "machine failed");
            ExitCode::Failed
        }
    };
    tracing::info!(?code, "finished");
    code
}

fn drive<M: Machine + ?Sized>(machine: &mut M, io: &mut Frontend<'_>) -> Result<ExitCode, EngineError> {
    machine.start(io)?;
    loop {
        if let Some(code) = machine.exit_code() {
            return Ok(code);
        }
        let events = io.input.poll_frame().unwrap_or_else(|| vec![InputEvent::Quit]);
        machine.handle_input(&events, io)?;
        machine.tick(io)?;
    }
}

/// Whether a frame of input asks to close the game.
pub fn wants_quit(events: &[InputEvent]) -> bool {
    events.contains(&InputEvent::Quit)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ScriptedInput;
    use crate::render::{NullRenderer, Scene};

    /// Counts frames and stops after `limit` ticks or on the first Quit.
    struct Counter {
        limit: u64,
        ticks: u64,
        quits: u32,
        code: Option<ExitCode>,
        fail_at: Option<u64>,
    }

    impl Counter {
        fn new(limit: u64) -> Self {
            Self {
                limit,
                ticks: 0,
                quits: 0,
                code: None,
                fail_at: None,
            }
        }
    }

    impl Machine for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn handle_input(&mut self, events: &[InputEvent], _: &mut Frontend<'_>) -> Result<(), EngineError> {
            if wants_quit(events) {
                self.code = Some(ExitCode::Quit);
            }
            Ok(())
        }

        fn tick(&mut self, io: &mut Frontend<'_>) -> Result<(), EngineError> {
            self.ticks += 1;
            if self.fail_at == Some(self.ticks) {
                return Err(EngineError::NoLevels);
            }
            io.present(&FrameView {
                frame: self.ticks,
                scene: Scene::Popup { text: String::new() },
            });
            if self.ticks >= self.limit && self.code.is_none() {
                self.code = Some(ExitCode::Done);
            }
            Ok(())
        }

        fn quit(&mut self, _: &mut Frontend<'_>) -> Result<(), EngineError> {
            self.quits += 1;
            Ok(())
        }

        fn exit_code(&self) -> Option<ExitCode> {
            self.code
        }
    }

    #[test]
    fn runs_until_exit_code_then_quits_once() {
        let mut input = ScriptedInput::builder().idle(10).build();
        let mut renderer = NullRenderer;
        let mut io = Frontend::new(&mut input, &mut renderer);
        let mut machine = Counter::new(3);
        assert_eq!(run(&mut machine, &mut io), ExitCode::Done);
        assert_eq!(machine.ticks, 3);
        assert_eq!(machine.quits, 1);
    }

    #[test]
    fn exhausted_input_becomes_quit() {
        let mut input = ScriptedInput::builder().idle(2).build();
        let mut renderer = NullRenderer;
        let mut io = Frontend::new(&mut input, &mut renderer);
        let mut machine = Counter::new(100);
        assert_eq!(run(&mut machine, &mut io), ExitCode::Quit);
        assert_eq!(machine.ticks, 3);
    }

    #[test]
    fn hook_error_fails_and_still_quits() {
        let mut input = ScriptedInput::builder().idle(10).build();
        let mut renderer = NullRenderer;
        let mut io = Frontend::new(&mut input, &mut renderer);
        let mut machine = Counter::new(100);
        machine.fail_at = Some(2);
        assert_eq!(run(&mut machine, &mut io), ExitCode::Failed);
        assert_eq!(machine.quits, 1);
    }
}
