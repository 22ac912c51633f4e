//! Relay bookkeeping: which sessions are active and what each last said
//!
//! `RelayState` is owned by the server task and mutated only from there, so
//! it needs no locks. Every active session has an outbound queue drained by
//! its own writer task; pushing a record onto a queue never blocks.
//!
//! The relay never looks inside forwarded records. The only records it
//! builds itself are the id assignment sent on join and the `Left` notice
//! broadcast when a session closes.

use log::{debug, warn};
use shared::{Command, CommandBytes, Result, TankId};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use tokio::sync::mpsc;

/// Queue feeding one connection's writer task.
pub type Outbound = mpsc::UnboundedSender<CommandBytes>;

/// Process-unique number of an accepted connection. Tank ids are reused
/// once vacated, serials never are.
pub type ConnectionSerial = u64;

/// A session whose outbound queue is gone and which must be torn down.
pub type BrokenSession = (TankId, ConnectionSerial);

#[derive(Debug)]
pub struct Session {
    pub id: TankId,
    pub serial: ConnectionSerial,
    pub addr: SocketAddr,
    pub records_received: u64,
    outbound: Outbound,
}

impl Session {
    fn send(&self, record: CommandBytes) -> bool {
        self.outbound.send(record).is_ok()
    }
}

#[derive(Debug, Default)]
pub struct RelayState {
    sessions: BTreeMap<TankId, Session>,
    last_commands: BTreeMap<TankId, CommandBytes>,
}

impl RelayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Smallest non-negative id not held by an active session.
    pub fn next_free_id(&self) -> TankId {
        let mut candidate = 0;
        for &taken in self.sessions.keys() {
            if taken != candidate {
                break;
            }
            candidate += 1;
        }
        candidate
    }

    /// Activates a new session: assigns it an id, queues the assignment
    /// record, then replays the last record of every other active session.
    pub fn join(
        &mut self,
        serial: ConnectionSerial,
        addr: SocketAddr,
        outbound: Outbound,
    ) -> Result<TankId> {
        let id = self.next_free_id();
        let session = Session {
            id,
            serial,
            addr,
            records_received: 0,
            outbound,
        };

        let mut delivered = session.send(Command::assignment(id).encode()?);
        for record in self.last_commands.values() {
            delivered &= session.send(*record);
        }
        if !delivered {
            warn!("Session {} closed before its handshake was queued", id);
        }

        self.sessions.insert(id, session);
        Ok(id)
    }

    /// Records `record` as the latest from `id` and forwards it unchanged to
    /// every other session. Records from a stale connection are dropped.
    pub fn relay(
        &mut self,
        id: TankId,
        serial: ConnectionSerial,
        record: CommandBytes,
    ) -> Vec<BrokenSession> {
        match self.sessions.get_mut(&id) {
            Some(session) if session.serial == serial => session.records_received += 1,
            _ => {
                debug!("Dropping record from stale connection {} (id {})", serial, id);
                return Vec::new();
            }
        }

        self.last_commands.insert(id, record);
        self.broadcast(record, Some(id))
    }

    /// Closes session `id` and tells everyone else it left. Returns sessions
    /// found broken while broadcasting the notice.
    pub fn leave(&mut self, id: TankId, serial: ConnectionSerial) -> Result<Vec<BrokenSession>> {
        if !self.is_current(id, serial) {
            return Ok(Vec::new());
        }

        self.sessions.remove(&id);
        self.last_commands.remove(&id);

        let notice = Command::left(id).encode()?;
        Ok(self.broadcast(notice, None))
    }

    fn broadcast(&self, record: CommandBytes, exclude: Option<TankId>) -> Vec<BrokenSession> {
        self.sessions
            .values()
            .filter(|session| Some(session.id) != exclude)
            .filter(|session| !session.send(record))
            .map(|session| (session.id, session.serial))
            .collect()
    }

    /// True if `id` is active and belongs to connection `serial`.
    pub fn is_current(&self, id: TankId, serial: ConnectionSerial) -> bool {
        self.sessions
            .get(&id)
            .is_some_and(|session| session.serial == serial)
    }

    pub fn session(&self, id: TankId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn last_command(&self, id: TankId) -> Option<&CommandBytes> {
        self.last_commands.get(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
