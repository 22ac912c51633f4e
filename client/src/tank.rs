//! Tank entity and the field-level merge of incoming commands

use crate::battlefield::{spawn_point, Wall};
use crate::projectile::Projectile;
use shared::{
    Command, Position, Rect, TankId, TankState, REPAIR_TICKS, TANK_HEIGHT, TANK_WIDTH,
    WALL_THICKNESS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Paint of a destroyed tank.
pub const WRECK_COLOR: Color = Color::rgb(30, 30, 30);

#[derive(Debug, Clone, PartialEq)]
pub struct Tank {
    pub id: TankId,
    pub position: Position,
    pub angle: i32,
    pub speed: i32,
    pub turret_angle: i32,
    pub color: Color,
    base_color: Color,
    destroyed_until: Option<u64>,
}

impl Tank {
    pub fn new(id: TankId, position: Position, angle: i32, color: Color) -> Self {
        Self {
            id,
            position,
            angle,
            speed: 0,
            turret_angle: 0,
            color,
            base_color: color,
            destroyed_until: None,
        }
    }

    /// A fresh tank at the battlefield entry point reserved for `id`.
    pub fn spawn(id: TankId) -> Self {
        let spawn = spawn_point(id);
        Self::new(id, spawn.position, spawn.angle, spawn.color)
    }

    /// Merges `command` into this tank. State transitions are applied first,
    /// then every present kinematic field overwrites its attribute.
    pub fn apply(&mut self, command: &Command, tick: u64) {
        match command.state {
            Some(TankState::Operational) => self.repair(),
            Some(TankState::Destroyed) => self.destroy(tick),
            Some(TankState::Left) | None => {}
        }

        if let Some(angle) = command.angle {
            self.angle = angle;
        }
        if let Some(speed) = command.speed {
            self.speed = speed;
        }
        if let Some(position) = command.position {
            self.position = position;
        }
        if let Some(turret_angle) = command.turret_angle {
            self.turret_angle = turret_angle;
        }
    }

    pub fn destroy(&mut self, tick: u64) {
        self.speed = 0;
        self.color = WRECK_COLOR;
        self.destroyed_until = Some(tick + REPAIR_TICKS);
    }

    pub fn repair(&mut self) {
        self.color = self.base_color;
        self.destroyed_until = None;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed_until.is_some()
    }

    /// True once the repair cooldown has run out at `tick`.
    pub fn repair_due(&self, tick: u64) -> bool {
        matches!(self.destroyed_until, Some(until) if tick >= until)
    }

    /// Body rectangle used against walls, placed at `position`.
    pub fn inner_rect_at(&self, position: Position) -> Rect {
        let side = TANK_WIDTH.min(TANK_HEIGHT) - 2 * WALL_THICKNESS;
        Rect::centered_square(position.x, position.y, side)
    }

    pub fn inner_rect(&self) -> Rect {
        self.inner_rect_at(self.position)
    }

    /// Body rectangle used against projectiles.
    pub fn avg_rect(&self) -> Rect {
        let side = (TANK_WIDTH + TANK_HEIGHT) / 2;
        Rect::centered_square(self.position.x, self.position.y, side)
    }

    pub fn collides_with_walls(&self, position: Position, walls: &[Wall]) -> bool {
        let body = self.inner_rect_at(position);
        walls.iter().any(|wall| wall.rect.intersects(&body))
    }

    pub fn is_hit_by(&self, projectile: &Projectile) -> bool {
        projectile.is_live()
            && projectile.owner != self.id
            && self
                .avg_rect()
                .contains_point(projectile.position.x, projectile.position.y)
    }

    /// Index of the first live projectile fired by another tank that sits
    /// inside this tank's body.
    pub fn hit_index(&self, projectiles: &[Projectile]) -> Option<usize> {
        projectiles.iter().position(|p| self.is_hit_by(p))
    }
}
