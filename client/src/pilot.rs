//! Pilots decide what a tank does each tick.
//!
//! The local tank is flown by an [`InputPilot`] that simulates optimistically
//! and emits the resulting [`Command`]; remote tanks are flown by a
//! [`NetworkPilot`] that replays whatever the relay delivered for them.

use crate::battlefield::Wall;
use crate::input::InputState;
use crate::projectile::Projectile;
use crate::tank::Tank;
use log::debug;
use shared::{
    heading, Command, Position, ProjectileId, TankId, TankState, MAX_PENDING_COMMANDS,
    TANK_DELTA_ANGLE, TANK_MAX_SPEED, TURRET_DELTA_ANGLE, TURRET_MAX_ANGULAR_SPEED,
};
use std::collections::VecDeque;

/// World state a pilot may look at (and, for hit events, touch) while
/// deciding.
pub struct PilotContext<'a> {
    pub tick: u64,
    pub input: &'a InputState,
    pub projectiles: &'a mut [Projectile],
    pub walls: &'a [Wall],
}

pub trait Pilot {
    /// The command for `tank` this tick, or `None` to stay silent.
    fn produce_command(&mut self, tank: &Tank, ctx: &mut PilotContext<'_>) -> Option<Command>;
}

/// Projectile ids handed out per shooting tank. Each tank owns a block of
/// [`PROJECTILE_ID_BLOCK`] ids, so shots from different clients never share
/// an id and a `touched_by` names exactly one projectile.
pub const PROJECTILE_ID_BLOCK: ProjectileId = 1 << 20;

/// Tanks beyond this many share blocks again; the last block ends at
/// `i32::MAX`, the largest id the wire can carry.
const PROJECTILE_ID_BLOCKS: TankId = 1 << 11;

/// Process-local projectile id allocator. Ids only grow within the tank's
/// block and never repeat until the block is exhausted.
#[derive(Debug)]
pub struct ProjectileIds {
    base: ProjectileId,
    next: ProjectileId,
}

impl ProjectileIds {
    pub fn for_tank(tank_id: TankId) -> Self {
        Self {
            base: (tank_id % PROJECTILE_ID_BLOCKS) * PROJECTILE_ID_BLOCK,
            next: 1,
        }
    }

    pub fn allocate(&mut self) -> ProjectileId {
        let id = self.base + self.next;
        // 1..BLOCK, skipping the block base itself
        self.next = self.next % (PROJECTILE_ID_BLOCK - 1) + 1;
        id
    }
}

/// Flies the local tank from sampled input.
#[derive(Debug)]
pub struct InputPilot {
    turret_angular_speed: i32,
    projectile_ids: ProjectileIds,
}

impl InputPilot {
    pub fn new(tank_id: TankId) -> Self {
        Self {
            turret_angular_speed: 0,
            projectile_ids: ProjectileIds::for_tank(tank_id),
        }
    }

    fn drive(&mut self, tank: &Tank, ctx: &PilotContext<'_>) -> Command {
        let input = ctx.input;

        let rotation = TANK_DELTA_ANGLE * axis(input.left, input.right);
        let angle = (tank.angle + rotation).rem_euclid(360);

        let translation = axis(input.forward, input.backward);
        let mut speed = if translation != 0 {
            (tank.speed + translation).clamp(-TANK_MAX_SPEED, TANK_MAX_SPEED)
        } else {
            tank.speed - tank.speed.signum()
        };

        let (position, blocked) = resolve_move(tank, angle, speed, ctx.walls);
        if blocked {
            speed = 0;
        }

        let turret_rotation = TURRET_DELTA_ANGLE * axis(input.turret_left, input.turret_right);
        self.turret_angular_speed = if turret_rotation != 0 {
            (self.turret_angular_speed + turret_rotation)
                .clamp(-TURRET_MAX_ANGULAR_SPEED, TURRET_MAX_ANGULAR_SPEED)
        } else {
            self.turret_angular_speed - self.turret_angular_speed.signum()
        };
        let turret_angle = (tank.turret_angle + self.turret_angular_speed).rem_euclid(360);

        let mut command = Command::for_tank(tank.id);
        command.angle = Some(angle);
        command.speed = Some(speed);
        command.position = Some(position);
        command.turret_angle = Some(turret_angle);
        command.fire = input.fire_released.then(|| self.projectile_ids.allocate());
        command
    }
}

impl Pilot for InputPilot {
    fn produce_command(&mut self, tank: &Tank, ctx: &mut PilotContext<'_>) -> Option<Command> {
        // One-shot: the projectile is spent by the same call that reports it.
        if let Some(index) = tank.hit_index(ctx.projectiles) {
            let projectile = &mut ctx.projectiles[index];
            projectile.detonate();
            debug!("Tank {} hit by projectile {}", tank.id, projectile.id);

            let mut command = Command::for_tank(tank.id).with_state(TankState::Destroyed);
            command.speed = Some(0);
            command.touched_by = Some(projectile.id);
            return Some(command);
        }

        if tank.repair_due(ctx.tick) {
            return Some(Command::for_tank(tank.id).with_state(TankState::Operational));
        }
        if tank.is_destroyed() {
            return None;
        }

        Some(self.drive(tank, ctx))
    }
}

fn axis(positive: bool, negative: bool) -> i32 {
    positive as i32 - negative as i32
}

/// Moves `tank` by `delta` along `angle`, shrinking the step one unit at a
/// time until its inner body clears every wall. The reached position is
/// folded back onto the screen, exactly as it will travel on the wire.
/// Returns it together with whether the step had to be shortened.
pub fn resolve_move(tank: &Tank, angle: i32, delta: i32, walls: &[Wall]) -> (Position, bool) {
    let (dx, dy) = heading(angle as f32);
    let step = delta.signum();
    let mut delta = delta;
    let mut blocked = false;

    loop {
        let candidate = Position::new(
            tank.position.x + (delta as f32 * dx).round() as i32,
            tank.position.y + (delta as f32 * dy).round() as i32,
        )
        .wrapped();
        if delta == 0 || !tank.collides_with_walls(candidate, walls) {
            return (candidate, blocked);
        }
        blocked = true;
        delta -= step;
    }
}

/// Flies a remote tank from the commands the relay delivered for it.
///
/// Commands enter at the front and leave from the back, so they are replayed
/// oldest first. Once more than [`MAX_PENDING_COMMANDS`] are waiting the
/// oldest are dropped.
#[derive(Debug, Default)]
pub struct NetworkPilot {
    queue: VecDeque<Command>,
    dropped: u64,
}

impl NetworkPilot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, command: Command) {
        self.queue.push_front(command);
        while self.queue.len() > MAX_PENDING_COMMANDS {
            self.queue.pop_back();
            self.dropped += 1;
        }
    }

    pub fn next_command(&mut self) -> Option<Command> {
        self.queue.pop_back()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Pilot for NetworkPilot {
    fn produce_command(&mut self, _tank: &Tank, _ctx: &mut PilotContext<'_>) -> Option<Command> {
        self.next_command()
    }
}
