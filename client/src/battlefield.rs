//! Static battlefield layout: walls and the per-id spawn table

use crate::tank::Color;
use shared::{Position, Rect, TankId, WALL_THICKNESS};

/// A straight wall segment with its collision rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wall {
    pub beg: Position,
    pub end: Position,
    pub rect: Rect,
}

impl Wall {
    /// `beg` must be the top-left end of the segment.
    pub fn new(beg: Position, end: Position, thickness: i32) -> Self {
        debug_assert!(beg.x <= end.x && beg.y <= end.y);
        let rect = Rect::new(
            beg.x - thickness,
            beg.y - thickness,
            end.x - beg.x + 2 * thickness,
            end.y - beg.y + 2 * thickness,
        );
        Self { beg, end, rect }
    }
}

pub fn walls() -> Vec<Wall> {
    [
        ((200, 100), (200, 450)),
        ((200, 300), (500, 300)),
        ((450, 450), (650, 450)),
        ((650, 200), (650, 450)),
        ((400, 200), (650, 200)),
    ]
    .into_iter()
    .map(|((x1, y1), (x2, y2))| {
        Wall::new(Position::new(x1, y1), Position::new(x2, y2), WALL_THICKNESS)
    })
    .collect()
}

/// Where and how a tank with a given id enters the battlefield.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnPoint {
    pub position: Position,
    pub angle: i32,
    pub color: Color,
}

const SPAWN_POINTS: [SpawnPoint; 4] = [
    SpawnPoint {
        position: Position { x: 50, y: 50 },
        angle: -45,
        color: Color::rgb(20, 150, 50),
    },
    SpawnPoint {
        position: Position { x: 750, y: 550 },
        angle: 135,
        color: Color::rgb(50, 150, 250),
    },
    SpawnPoint {
        position: Position { x: 750, y: 50 },
        angle: -135,
        color: Color::rgb(200, 60, 60),
    },
    SpawnPoint {
        position: Position { x: 50, y: 550 },
        angle: 45,
        color: Color::rgb(200, 180, 40),
    },
];

/// Ids beyond the table wrap around it.
pub fn spawn_point(id: TankId) -> SpawnPoint {
    SPAWN_POINTS[id as usize % SPAWN_POINTS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_rect_includes_thickness() {
        let wall = Wall::new(Position::new(200, 100), Position::new(200, 450), 10);
        assert_eq!(wall.rect, Rect::new(190, 90, 20, 370));
    }

    #[test]
    fn test_layout_has_five_walls() {
        assert_eq!(walls().len(), 5);
    }

    #[test]
    fn test_spawn_points_wrap() {
        assert_eq!(spawn_point(0), spawn_point(4));
        assert_eq!(spawn_point(1).position, Position::new(750, 550));
        assert_ne!(spawn_point(0).color, spawn_point(1).color);
    }

    #[test]
    fn test_spawn_points_clear_of_walls() {
        let walls = walls();
        for id in 0..SPAWN_POINTS.len() as TankId {
            let spawn = spawn_point(id);
            let body = Rect::centered_square(spawn.position.x, spawn.position.y, 50);
            assert!(walls.iter().all(|w| !w.rect.intersects(&body)), "spawn {}", id);
        }
    }
}
