//! Per-frame task queue.
//!
//! A [`Scheduler`] holds resumable [`Task`]s over some context `C`. Each
//! frame the owning machine calls [`Scheduler::drain`] once: every task that
//! was queued when the drain started runs exactly once, in FIFO order, and
//! tasks that return [`Step::Continue`] go back on the queue for the next
//! frame. A drain never runs a task twice, so a task that keeps continuing
//! cannot starve the frame loop.

use std::collections::VecDeque;

use crate::EngineError;

/// What a task wants after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Run again next frame.
    Continue,
    /// Finished; drop the task.
    Done,
}

/// A resumable unit of per-frame work.
pub trait Task<C> {
    /// Advance by one frame.
    fn step(&mut self, ctx: &mut C) -> Result<Step, EngineError>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "task"
    }
}

impl<C, F> Task<C> for F
where
    F: FnMut(&mut C) -> Result<Step, EngineError>,
{
    fn step(&mut self, ctx: &mut C) -> Result<Step, EngineError> {
        self(ctx)
    }
}

/// FIFO queue of boxed tasks over a context `C`.
pub struct Scheduler<C> {
    queue: VecDeque<Box<dyn Task<C>>>,
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl<C> std::fmt::Debug for Scheduler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.queue.len())
            .finish()
    }
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task to run on the next drain.
    pub fn push<T: Task<C> + 'static>(&mut self, task: T) {
        self.push_boxed(Box::new(task));
    }

    pub fn push_boxed(&mut self, task: Box<dyn Task<C>>) {
        self.queue.push_back(task);
    }

    /// Number of queued tasks.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every queued task without running it.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Run every task queued at the start of the call once. Returns the
    /// number of tasks that ran.
    ///
    /// # Errors
    ///
    /// The first task error stops the drain. The failing task is dropped;
    /// tasks not yet reached stay queued.
    pub fn drain(&mut self, ctx: &mut C) -> Result<usize, EngineError> {
        let mut batch = std::mem::take(&mut self.queue);
        let mut ran = 0;
        while let Some(mut task) = batch.pop_front() {
            ran += 1;
            match task.step(ctx) {
                Ok(Step::Continue) => self.queue.push_back(task),
                Ok(Step::Done) => {}
                Err(e) => {
                    tracing::warn!(task = task.name(), error = %e, "task failed");
                    self.queue.append(&mut batch);
                    return Err(e);
                }
            }
        }
        Ok(ran)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
