//! Projectiles in flight and their three-stage life cycle
//!
//! A projectile is `Active` until it hits a wall or a tank, spends exactly
//! one tick `Detonated` so the explosion can be drawn, and is culled once
//! `Destroyed` or off screen.

use crate::battlefield::Wall;
use crate::tank::Tank;
use shared::{
    heading, Position, ProjectileId, TankId, PROJECTILE_SPEED, SCREEN_HEIGHT, SCREEN_WIDTH,
    TANK_HEIGHT, TANK_WIDTH,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileState {
    Active,
    /// Exploding this tick; destroyed on the next one.
    Detonated,
    Destroyed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: ProjectileId,
    pub owner: TankId,
    pub position: Position,
    pub angle: i32,
    pub speed: i32,
    pub state: ProjectileState,
}

impl Projectile {
    /// Spawns a projectile at the muzzle of `tank`'s turret.
    pub fn fired_by(tank: &Tank, id: ProjectileId) -> Self {
        let angle = tank.angle + tank.turret_angle;
        let (dx, dy) = heading(angle as f32);
        // 0.6 of the body dimensions
        let reach_x = TANK_WIDTH as f32 * 3.0 / 5.0;
        let reach_y = TANK_HEIGHT as f32 * 3.0 / 5.0;
        let x = tank.position.x as f32 + reach_x * dx;
        let y = tank.position.y as f32 + reach_y * dy;

        Self {
            id,
            owner: tank.id,
            position: Position::new(x as i32, y as i32),
            angle,
            speed: PROJECTILE_SPEED,
            state: ProjectileState::Active,
        }
    }

    pub fn is_live(&self) -> bool {
        self.state == ProjectileState::Active
    }

    pub fn detonate(&mut self) {
        if self.state == ProjectileState::Active {
            self.state = ProjectileState::Detonated;
        }
    }

    /// Advances one tick.
    pub fn update(&mut self, walls: &[Wall]) {
        match self.state {
            ProjectileState::Active => {}
            ProjectileState::Detonated => {
                self.state = ProjectileState::Destroyed;
                return;
            }
            ProjectileState::Destroyed => return,
        }

        // Truncated per axis, like the muzzle offset
        let (dx, dy) = heading(self.angle as f32);
        self.position.x += (self.speed as f32 * dx) as i32;
        self.position.y += (self.speed as f32 * dy) as i32;

        // A wall hit shows up as an explosion next tick
        if walls
            .iter()
            .any(|wall| wall.rect.contains_point(self.position.x, self.position.y))
        {
            self.state = ProjectileState::Detonated;
        }
    }

    /// Destroyed, or flown off the battlefield.
    pub fn is_expired(&self) -> bool {
        let Position { x, y } = self.position;
        // Inclusive bounds: a shot exactly on the edge is still drawn
        self.state == ProjectileState::Destroyed
            || !(0..=SCREEN_WIDTH).contains(&x)
            || !(0..=SCREEN_HEIGHT).contains(&y)
    }
}
