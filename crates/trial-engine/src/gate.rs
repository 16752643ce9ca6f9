//! Named single-fire guards.
//!
//! An [`ActionGate`] maps socket names to a fired flag. A [`Guard`] bound to
//! a socket runs its action only while the socket is unfired and marks it
//! fired; the action's owner releases the socket when it is done. This is how
//! a move animation keeps a second key press from starting a second move.
//!
//! Each socket also carries an *epoch*. [`ActionGate::try_fire`] hands out a
//! [`FireTicket`] stamped with the current epoch, and
//! [`ActionGate::force_release`] bumps the epoch, so a holder that was forced
//! off its socket can tell that its ticket is no longer current and must not
//! touch the socket (or the world) again.
//!
//! # Example
//!
//! ```
//! use trial_engine::gate::{ActionGate, Guard};
//!
//! let mut gate = ActionGate::new();
//! let guard = Guard::new("PLAYER_WALK");
//!
//! assert_eq!(guard.fire(&mut gate, || 1), Some(1));
//! assert_eq!(guard.fire(&mut gate, || 2), None); // still held
//!
//! guard.release(&mut gate);
//! assert_eq!(guard.fire(&mut gate, || 3), Some(3));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FireTicket
// ---------------------------------------------------------------------------

/// Proof of having fired a socket at a given epoch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FireTicket {
    socket: String,
    epoch: u64,
}

impl FireTicket {
    pub fn socket(&self) -> &str {
        &self.socket
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

// ---------------------------------------------------------------------------
// ActionGate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct Socket {
    fired: bool,
    epoch: u64,
}

/// A registry of named sockets. One gate belongs to one level session.
///
/// Unknown sockets are implicitly unfired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionGate {
    sockets: BTreeMap<String, Socket>,
}

impl ActionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `socket` is currently fired.
    pub fn is_fired(&self, socket: &str) -> bool {
        self.sockets.get(socket).is_some_and(|s| s.fired)
    }

    /// Fire `socket` if it is unfired and return a ticket for this firing.
    /// Returns `None` if the socket is already held.
    pub fn try_fire(&mut self, socket: &str) -> Option<FireTicket> {
        let entry = self.sockets.entry(socket.to_owned()).or_default();
        if entry.fired {
            return None;
        }
        entry.fired = true;
        Some(FireTicket {
            socket: socket.to_owned(),
            epoch: entry.epoch,
        })
    }

    /// Clear `socket`. Releasing an unfired or unknown socket is a no-op.
    pub fn release(&mut self, socket: &str) {
        if let Some(entry) = self.sockets.get_mut(socket) {
            entry.fired = false;
        }
    }

    /// Whether `ticket` still names the current holder of its socket.
    pub fn is_current(&self, ticket: &FireTicket) -> bool {
        self.sockets
            .get(&ticket.socket)
            .is_some_and(|s| s.fired && s.epoch == ticket.epoch)
    }

    /// Release the socket only if `ticket` is still current. Returns whether
    /// the socket was released.
    pub fn release_ticket(&mut self, ticket: &FireTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.release(&ticket.socket);
        true
    }

    /// Clear `socket` regardless of who holds it and orphan every ticket
    /// issued for it so far.
    pub fn force_release(&mut self, socket: &str) {
        let entry = self.sockets.entry(socket.to_owned()).or_default();
        if entry.fired {
            tracing::debug!(socket, epoch = entry.epoch, "socket force-released");
        }
        entry.fired = false;
        entry.epoch += 1;
    }

    /// Names of the sockets that are currently fired.
    pub fn fired_sockets(&self) -> impl Iterator<Item = &str> + '_ {
        self.sockets
            .iter()
            .filter(|(_, s)| s.fired)
            .map(|(name, _)| name.as_str())
    }
}

// ---------------------------------------------------------------------------
// Guard
// ---------------------------------------------------------------------------

/// A single-fire action bound to a socket. Many guards may share a socket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Guard {
    socket: String,
}

impl Guard {
    pub fn new(socket: impl Into<String>) -> Self {
        Self {
            socket: socket.into(),
        }
    }

    pub fn socket(&self) -> &str {
        &self.socket
    }

    /// Run `action` if the socket is unfired, leaving it fired.
    ///
    /// Returns `Some(result)` if the action ran and `None` if the socket was
    /// already held.
    pub fn fire<R>(&self, gate: &mut ActionGate, action: impl FnOnce() -> R) -> Option<R> {
        gate.try_fire(&self.socket)?;
        Some(action())
    }

    /// Clear the socket so the next `fire` on it runs.
    pub fn release(&self, gate: &mut ActionGate) {
        gate.release(&self.socket);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
