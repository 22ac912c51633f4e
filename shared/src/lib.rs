//! Wire protocol, framing and game constants shared by the relay and the clients.
//!
//! Everything that crosses the network is a single fixed-size [`Command`]
//! record. The relay only needs [`framing`] to cut the byte stream on record
//! boundaries; clients additionally decode records through [`command`].

pub mod command;
pub mod error;
pub mod framing;
pub mod geometry;

pub use command::{Command, CommandBytes, Position, ProjectileId, TankId, TankState, COMMAND_LEN};
pub use error::{ProtocolError, Result};
pub use framing::{read_into, write_record, RecordReassembler};
pub use geometry::{heading, Rect};

pub const SCREEN_WIDTH: i32 = 800;
pub const SCREEN_HEIGHT: i32 = 600;
/// Simulation ticks per second.
pub const FPS: u32 = 50;

pub const TANK_WIDTH: i32 = 50;
pub const TANK_HEIGHT: i32 = 40;
pub const TANK_MAX_SPEED: i32 = 5;
/// Degrees of hull rotation per tick while a turn key is held.
pub const TANK_DELTA_ANGLE: i32 = 6;

pub const TURRET_DELTA_ANGLE: i32 = 3;
pub const TURRET_MAX_ANGULAR_SPEED: i32 = 5;

pub const WALL_THICKNESS: i32 = 10;
pub const PROJECTILE_SPEED: i32 = 10;

/// Ticks a destroyed tank waits before it is repaired (3 seconds).
pub const REPAIR_TICKS: u64 = 3 * FPS as u64;

/// Pending commands kept per remote tank before the oldest are dropped.
pub const MAX_PENDING_COMMANDS: usize = 32;
