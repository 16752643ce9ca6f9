//! Guarded multi-tick animations.
//!
//! An [`Animation`] is a [`Task`] that runs a [`Motion`] for a fixed number
//! of ticks while holding a socket of the context's [`ActionGate`]. Starting
//! it fires the socket; a second animation on the same socket cannot start
//! until the first one finishes and releases it.
//!
//! ```text
//! start ── fire socket ──▶ tick 1 .. tick n-1: advance, Continue
//!                          tick n:             advance, release socket, finish, Done
//! ```
//!
//! If the socket is force-released while the animation is still queued, its
//! ticket goes stale and the remaining ticks are orphaned no-ops: neither
//! `advance` nor `finish` runs again.

use crate::gate::{ActionGate, FireTicket};
use crate::schedule::{Scheduler, Step, Task};
use crate::EngineError;

/// A context that owns an [`ActionGate`].
pub trait GateContext {
    fn gate(&mut self) -> &mut ActionGate;
}

/// The per-tick effect of an animation.
pub trait Motion<C> {
    /// Apply tick `tick` of `duration` (1-based).
    fn advance(&mut self, ctx: &mut C, tick: u32, duration: u32) -> Result<(), EngineError>;

    /// Called once, after the last tick, with the socket already released.
    fn finish(&mut self, _ctx: &mut C) -> Result<(), EngineError> {
        Ok(())
    }
}

/// A motion that does nothing; useful for pure timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Idle;

impl<C> Motion<C> for Idle {
    fn advance(&mut self, _: &mut C, _: u32, _: u32) -> Result<(), EngineError> {
        Ok(())
    }
}

/// A socket-guarded, fixed-length animation.
pub struct Animation<C> {
    socket: String,
    duration: u32,
    elapsed: u32,
    ticket: Option<FireTicket>,
    motion: Box<dyn Motion<C>>,
}

impl<C> std::fmt::Debug for Animation<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animation")
            .field("socket", &self.socket)
            .field("duration", &self.duration)
            .field("elapsed", &self.elapsed)
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

impl<C: GateContext + 'static> Animation<C> {
    /// An animation of `duration` ticks (at least one) on `socket`.
    pub fn new(socket: impl Into<String>, duration: u32, motion: impl Motion<C> + 'static) -> Self {
        Self {
            socket: socket.into(),
            duration: duration.max(1),
            elapsed: 0,
            ticket: None,
            motion: Box::new(motion),
        }
    }

    pub fn socket(&self) -> &str {
        &self.socket
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Fire the socket and queue the first tick. Returns `false`, and drops
    /// the animation, if the socket is already held.
    pub fn start(mut self, ctx: &mut C, scheduler: &mut Scheduler<C>) -> bool {
        let Some(ticket) = ctx.gate().try_fire(&self.socket) else {
            tracing::debug!(socket = %self.socket, "animation blocked by held socket");
            return false;
        };
        tracing::debug!(socket = %self.socket, duration = self.duration, "animation started");
        self.ticket = Some(ticket);
        scheduler.push(self);
        true
    }
}

impl<C: GateContext> Task<C> for Animation<C> {
    fn step(&mut self, ctx: &mut C) -> Result<Step, EngineError> {
        let Some(ticket) = self.ticket.clone() else {
            return Ok(Step::Done);
        };
        if !ctx.gate().is_current(&ticket) {
            tracing::debug!(socket = %self.socket, elapsed = self.elapsed, "orphaned animation tick dropped");
            self.ticket = None;
            return Ok(Step::Done);
        }

        self.elapsed += 1;
        self.motion.advance(ctx, self.elapsed, self.duration)?;
        if self.elapsed < self.duration {
            return Ok(Step::Continue);
        }

        ctx.gate().release_ticket(&ticket);
        self.ticket = None;
        tracing::debug!(socket = %self.socket, "animation finished");
        self.motion.finish(ctx)?;
        Ok(Step::Done)
    }

    fn name(&self) -> &str {
        &self.socket
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
