//! Remote tanks keyed by id, each with its own pending command queue

use crate::pilot::NetworkPilot;
use crate::tank::Tank;
use log::{debug, info};
use shared::{Command, TankId};
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct RemoteTank {
    pub tank: Tank,
    pub pilot: NetworkPilot,
}

/// What the registry did with a received command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// First command for an unknown id; the tank was created and the command queued.
    Joined(TankId),
    Queued(TankId),
    /// The tank and everything still queued for it were removed.
    Left(TankId),
    /// Lacked a tank id, concerned the local tank, or announced the departure
    /// of a tank never seen.
    Ignored,
}

#[derive(Debug, Default)]
pub struct RemoteRegistry {
    tanks: BTreeMap<TankId, RemoteTank>,
}

impl RemoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, command: Command, local_id: Option<TankId>) -> Dispatch {
        let Some(id) = command.tank_id else {
            return Dispatch::Ignored;
        };
        if Some(id) == local_id {
            return Dispatch::Ignored;
        }

        if command.is_left() {
            return match self.tanks.remove(&id) {
                Some(remote) => {
                    info!("Remote tank {} left", id);
                    if remote.pilot.pending() > 0 {
                        debug!(
                            "Discarded {} pending commands of tank {}",
                            remote.pilot.pending(),
                            id
                        );
                    }
                    Dispatch::Left(id)
                }
                None => Dispatch::Ignored,
            };
        }

        let mut joined = false;
        let remote = self.tanks.entry(id).or_insert_with(|| {
            joined = true;
            RemoteTank {
                tank: Tank::spawn(id),
                pilot: NetworkPilot::new(),
            }
        });

        let dropped_before = remote.pilot.dropped();
        remote.pilot.enqueue(command);
        if remote.pilot.dropped() > dropped_before {
            debug!("Backlog for tank {} full, dropped oldest command", id);
        }

        if joined {
            info!("Remote tank {} joined", id);
            Dispatch::Joined(id)
        } else {
            Dispatch::Queued(id)
        }
    }

    /// Oldest pending command for tank `id`.
    pub fn recv_command(&mut self, id: TankId) -> Option<Command> {
        self.tanks.get_mut(&id)?.pilot.next_command()
    }

    pub fn get(&self, id: TankId) -> Option<&RemoteTank> {
        self.tanks.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RemoteTank> {
        self.tanks.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut RemoteTank> {
        self.tanks.values_mut()
    }

    pub fn len(&self) -> usize {
        self.tanks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tanks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Position;

    fn moved(id: TankId, x: i32) -> Command {
        let mut command = Command::for_tank(id);
        command.position = Some(Position::new(x, 0));
        command
    }

    #[test]
    fn test_unknown_id_creates_tank() {
        let mut registry = RemoteRegistry::new();
        assert_eq!(registry.dispatch(moved(1, 5), Some(0)), Dispatch::Joined(1));
        assert_eq!(registry.dispatch(moved(1, 6), Some(0)), Dispatch::Queued(1));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(1).unwrap().tank, Tank::spawn(1));
    }

    #[test]
    fn test_recv_pops_oldest() {
        let mut registry = RemoteRegistry::new();
        registry.dispatch(moved(2, 1), Some(0));
        registry.dispatch(moved(2, 2), Some(0));

        assert_eq!(registry.recv_command(2), Some(moved(2, 1)));
        assert_eq!(registry.recv_command(2), Some(moved(2, 2)));
        assert_eq!(registry.recv_command(2), None);
        assert_eq!(registry.recv_command(9), None);
    }

    #[test]
    fn test_left_removes_tank_and_queue() {
        let mut registry = RemoteRegistry::new();
        registry.dispatch(moved(1, 1), Some(0));
        registry.dispatch(moved(1, 2), Some(0));

        assert_eq!(registry.dispatch(Command::left(1), Some(0)), Dispatch::Left(1));
        assert!(registry.is_empty());
        assert_eq!(registry.recv_command(1), None);
        assert_eq!(registry.dispatch(Command::left(1), Some(0)), Dispatch::Ignored);
    }

    #[test]
    fn test_local_and_anonymous_commands_ignored() {
        let mut registry = RemoteRegistry::new();
        assert_eq!(registry.dispatch(moved(0, 1), Some(0)), Dispatch::Ignored);
        assert_eq!(registry.dispatch(Command::default(), Some(0)), Dispatch::Ignored);
        assert!(registry.is_empty());
    }
}
