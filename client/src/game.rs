//! Per-tick simulation of one client's battlefield
//!
//! Each tick the local tank is flown first, then every remote tank replays
//! one queued command, and finally the projectiles already in flight move.

use crate::battlefield::{walls, Wall};
use crate::input::InputState;
use crate::pilot::{InputPilot, Pilot, PilotContext};
use crate::projectile::Projectile;
use crate::registry::RemoteRegistry;
use crate::tank::Tank;
use log::debug;
use shared::{Command, TankId};

/// One client's view of the battlefield: the locally flown tank, every
/// projectile in flight and the walls. Remote tanks live in the session's
/// [`RemoteRegistry`] and are passed in each tick.
pub struct Game {
    tank: Tank,
    pilot: Box<dyn Pilot + Send>,
    projectiles: Vec<Projectile>,
    walls: Vec<Wall>,
    tick: u64,
}

impl Game {
    pub fn new(id: TankId) -> Self {
        Self::with_pilot(id, Box::new(InputPilot::new(id)))
    }

    pub fn with_pilot(id: TankId, pilot: Box<dyn Pilot + Send>) -> Self {
        Self {
            tank: Tank::spawn(id),
            pilot,
            projectiles: Vec::new(),
            walls: walls(),
            tick: 0,
        }
    }

    /// Advances the world by one tick and returns the command the local tank
    /// wants broadcast, if any.
    ///
    /// The local pilot runs first, then every remote tank replays one queued
    /// command. Projectiles fired during this tick start moving on the next.
    pub fn tick(&mut self, input: &InputState, remotes: &mut RemoteRegistry) -> Option<Command> {
        let tick = self.tick;
        // Shots fired below are appended after this mark
        let in_flight = self.projectiles.len();

        // Local tank: simulate optimistically and publish the outcome
        let mut ctx = PilotContext {
            tick,
            input,
            projectiles: &mut self.projectiles,
            walls: &self.walls,
        };
        let outbound = self.pilot.produce_command(&self.tank, &mut ctx);
        if let Some(command) = &outbound {
            self.tank.apply(command, tick);
            apply_events(&self.tank, command, &mut self.projectiles);
        }

        // Remote tanks: replay what their owners published
        for remote in remotes.iter_mut() {
            let mut ctx = PilotContext {
                tick,
                input,
                projectiles: &mut self.projectiles,
                walls: &self.walls,
            };
            if let Some(command) = remote.pilot.produce_command(&remote.tank, &mut ctx) {
                remote.tank.apply(&command, tick);
                apply_events(&remote.tank, &command, &mut self.projectiles);
            }
        }

        // Advance projectiles and drop spent ones
        for projectile in &mut self.projectiles[..in_flight] {
            projectile.update(&self.walls);
        }
        self.projectiles.retain(|p| !p.is_expired());

        self.tick += 1;
        outbound
    }

    pub fn tank(&self) -> &Tank {
        &self.tank
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }
}

/// Side effects of a command beyond the tank's own attributes.
fn apply_events(tank: &Tank, command: &Command, projectiles: &mut Vec<Projectile>) {
    // New shot at the tank's muzzle
    if let Some(id) = command.fire {
        projectiles.push(Projectile::fired_by(tank, id));
    }

    // The tank was destroyed by this projectile; show it exploding here too
    if let Some(id) = command.touched_by {
        for projectile in projectiles
            .iter_mut()
            .filter(|p| p.id == id && p.owner != tank.id)
        {
            debug!("Projectile {} detonated on tank {}", id, tank.id);
            projectile.detonate();
        }
    }
}
