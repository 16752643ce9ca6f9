//! Level progress persistence.
//!
//! The only persisted state is the index of the level to play next. A
//! [`CheckpointStore`] loads and saves that one integer.

use std::path::{Path, PathBuf};

use crate::EngineError;

/// Loads and saves the next-level index.
pub trait CheckpointStore {
    /// The saved index, or 0 if nothing has been saved yet.
    fn load(&mut self) -> Result<usize, EngineError>;

    fn save(&mut self, level: usize) -> Result<(), EngineError>;
}

impl<T: CheckpointStore + ?Sized> CheckpointStore for &mut T {
    fn load(&mut self) -> Result<usize, EngineError> {
        (**self).load()
    }

    fn save(&mut self, level: usize) -> Result<(), EngineError> {
        (**self).save(level)
    }
}

/// Stores the index as text in a file.
///
/// A missing file means no progress. A file that does not hold an integer
/// is reported with a warning and treated the same way.
#[derive(Debug, Clone)]
pub struct FileCheckpoint {
    path: PathBuf,
}

impl FileCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> EngineError {
        EngineError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl CheckpointStore for FileCheckpoint {
    fn load(&mut self) -> Result<usize, EngineError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(self.io_error(e)),
        };
        match serde_json::from_str::<usize>(text.trim()) {
            Ok(level) => Ok(level),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt checkpoint, starting over");
                Ok(0)
            }
        }
    }

    fn save(&mut self, level: usize) -> Result<(), EngineError> {
        std::fs::write(&self.path, level.to_string()).map_err(|e| self.io_error(e))?;
        tracing::debug!(path = %self.path.display(), level, "checkpoint saved");
        Ok(())
    }
}

/// Keeps the index in memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryCheckpoint {
    pub level: usize,
    /// Number of saves so far.
    pub saves: usize,
}

impl MemoryCheckpoint {
    pub fn starting_at(level: usize) -> Self {
        Self { level, saves: 0 }
    }
}

impl CheckpointStore for MemoryCheckpoint {
    fn load(&mut self) -> Result<usize, EngineError> {
        Ok(self.level)
    }

    fn save(&mut self, level: usize) -> Result<(), EngineError> {
        self.level = level;
        self.saves += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
