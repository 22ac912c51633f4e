//! Fixed-width binary encoding of a single tank state update
//!
//! A record is nine little-endian `i32` values in a fixed order:
//! `tank_id, state, angle, speed, x, y, turret_angle, fire, touched_by`.
//! Every field is optional. Absence is encoded with a sentinel that no legal
//! value can take: `-1` for ids, state and coordinates (all legal values are
//! non-negative), `i32::MAX` for the signed kinematic fields. Off the wire
//! the sentinels never appear; fields are plain `Option`s.

use crate::error::{ProtocolError, Result};
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};
use serde::{Deserialize, Serialize};

/// Size of one encoded record in bytes.
pub const COMMAND_LEN: usize = 36;

pub type CommandBytes = [u8; COMMAND_LEN];
pub type TankId = u32;
pub type ProjectileId = u32;

const ABSENT: i32 = -1;
const ABSENT_SCALAR: i32 = i32::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TankState {
    Operational,
    Destroyed,
    /// Control signal: the tank's owner disconnected. Never simulated.
    Left,
}

impl TankState {
    fn to_wire(self) -> i32 {
        match self {
            TankState::Operational => 0,
            TankState::Destroyed => 1,
            TankState::Left => 2,
        }
    }

    fn from_wire(value: i32) -> Result<Option<Self>> {
        match value {
            ABSENT => Ok(None),
            0 => Ok(Some(TankState::Operational)),
            1 => Ok(Some(TankState::Destroyed)),
            2 => Ok(Some(TankState::Left)),
            other => Err(ProtocolError::UnknownState(other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Folds the coordinates back onto the screen torus.
    pub fn wrapped(self) -> Self {
        Self {
            x: self.x.rem_euclid(SCREEN_WIDTH),
            y: self.y.rem_euclid(SCREEN_HEIGHT),
        }
    }
}

/// A field-level patch for one tank. Only present fields are applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Command {
    pub tank_id: Option<TankId>,
    pub state: Option<TankState>,
    pub angle: Option<i32>,
    pub speed: Option<i32>,
    pub position: Option<Position>,
    pub turret_angle: Option<i32>,
    /// Id of a projectile fired this tick.
    pub fire: Option<ProjectileId>,
    /// Id of the projectile that destroyed this tank.
    pub touched_by: Option<ProjectileId>,
}

/// On-wire layout. Field order is the record order.
#[derive(Debug, Serialize, Deserialize)]
struct WireRecord {
    tank_id: i32,
    state: i32,
    angle: i32,
    speed: i32,
    x: i32,
    y: i32,
    turret_angle: i32,
    fire: i32,
    touched_by: i32,
}

impl Command {
    /// An empty command about `tank_id`.
    pub fn for_tank(tank_id: TankId) -> Self {
        Self {
            tank_id: Some(tank_id),
            ..Self::default()
        }
    }

    /// The handshake record telling a new connection which id it was given.
    pub fn assignment(tank_id: TankId) -> Self {
        Self::for_tank(tank_id)
    }

    /// Announces that the owner of `tank_id` disconnected.
    pub fn left(tank_id: TankId) -> Self {
        Self::for_tank(tank_id).with_state(TankState::Left)
    }

    pub fn with_state(mut self, state: TankState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn is_left(&self) -> bool {
        self.state == Some(TankState::Left)
    }

    pub fn encode(&self) -> Result<CommandBytes> {
        let position = self.position.map(Position::wrapped);
        let record = WireRecord {
            tank_id: encode_id("tank_id", self.tank_id)?,
            state: self.state.map_or(ABSENT, TankState::to_wire),
            angle: encode_scalar("angle", self.angle)?,
            speed: encode_scalar("speed", self.speed)?,
            x: position.map_or(ABSENT, |p| p.x),
            y: position.map_or(ABSENT, |p| p.y),
            turret_angle: encode_scalar("turret_angle", self.turret_angle)?,
            fire: encode_id("fire", self.fire)?,
            touched_by: encode_id("touched_by", self.touched_by)?,
        };

        let mut bytes = [0u8; COMMAND_LEN];
        bincode::serialize_into(&mut bytes[..], &record)?;
        Ok(bytes)
    }

    pub fn decode(bytes: &CommandBytes) -> Result<Self> {
        let record: WireRecord = bincode::deserialize(bytes)?;

        let position = match (record.x, record.y) {
            (ABSENT, ABSENT) => None,
            (x, y) if x >= 0 && y >= 0 => Some(Position { x, y }),
            (x, y) => {
                return Err(ProtocolError::InvalidField {
                    field: "position",
                    value: if x < 0 { x } else { y },
                })
            }
        };

        Ok(Self {
            tank_id: decode_id("tank_id", record.tank_id)?,
            state: TankState::from_wire(record.state)?,
            angle: decode_scalar(record.angle),
            speed: decode_scalar(record.speed),
            position,
            turret_angle: decode_scalar(record.turret_angle),
            fire: decode_id("fire", record.fire)?,
            touched_by: decode_id("touched_by", record.touched_by)?,
        })
    }
}

fn encode_id(field: &'static str, value: Option<u32>) -> Result<i32> {
    match value {
        None => Ok(ABSENT),
        Some(v) => i32::try_from(v).map_err(|_| ProtocolError::OutOfRange { field, value: v }),
    }
}

fn encode_scalar(field: &'static str, value: Option<i32>) -> Result<i32> {
    match value {
        None => Ok(ABSENT_SCALAR),
        Some(ABSENT_SCALAR) => Err(ProtocolError::InvalidField {
            field,
            value: ABSENT_SCALAR,
        }),
        Some(v) => Ok(v),
    }
}

fn decode_id(field: &'static str, value: i32) -> Result<Option<u32>> {
    match value {
        ABSENT => Ok(None),
        v if v >= 0 => Ok(Some(v as u32)),
        v => Err(ProtocolError::InvalidField { field, value: v }),
    }
}

fn decode_scalar(value: i32) -> Option<i32> {
    (value != ABSENT_SCALAR).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_command() -> Command {
        Command {
            tank_id: Some(3),
            state: Some(TankState::Destroyed),
            angle: Some(-45),
            speed: Some(-5),
            position: Some(Position::new(799, 0)),
            turret_angle: Some(720),
            fire: Some(0),
            touched_by: Some(41),
        }
    }

    fn words(bytes: &CommandBytes) -> Vec<i32> {
        bytes
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    #[test]
    fn test_record_is_fixed_size() {
        let record = WireRecord {
            tank_id: 0,
            state: 0,
            angle: 0,
            speed: 0,
            x: 0,
            y: 0,
            turret_angle: 0,
            fire: 0,
            touched_by: 0,
        };
        assert_eq!(bincode::serialized_size(&record).unwrap(), COMMAND_LEN as u64);
    }

    #[test]
    fn test_roundtrip_all_absent() {
        let command = Command::default();
        let decoded = Command::decode(&command.encode().unwrap()).unwrap();
        assert_eq!(decoded, command);
    }

    #[test]
    fn test_roundtrip_all_present() {
        let command = full_command();
        let decoded = Command::decode(&command.encode().unwrap()).unwrap();
        assert_eq!(decoded, command);
    }

    #[test]
    fn test_roundtrip_each_state() {
        for state in [TankState::Operational, TankState::Destroyed, TankState::Left] {
            let command = Command::for_tank(1).with_state(state);
            let decoded = Command::decode(&command.encode().unwrap()).unwrap();
            assert_eq!(decoded.state, Some(state));
        }
    }

    #[test]
    fn test_assignment_wire_layout() {
        let bytes = Command::assignment(7).encode().unwrap();
        assert_eq!(
            words(&bytes),
            vec![7, -1, i32::MAX, i32::MAX, -1, -1, i32::MAX, -1, -1]
        );
    }

    #[test]
    fn test_field_order() {
        let bytes = full_command().encode().unwrap();
        assert_eq!(words(&bytes), vec![3, 1, -45, -5, 799, 0, 720, 0, 41]);
    }

    #[test]
    fn test_position_wrapped_before_encoding() {
        let mut command = Command::for_tank(0);
        command.position = Some(Position::new(-5, 601));

        let decoded = Command::decode(&command.encode().unwrap()).unwrap();
        assert_eq!(decoded.position, Some(Position::new(795, 1)));
    }

    #[test]
    fn test_unknown_state_fails() {
        let mut bytes = Command::for_tank(0).encode().unwrap();
        bytes[4..8].copy_from_slice(&9i32.to_le_bytes());

        match Command::decode(&bytes) {
            Err(ProtocolError::UnknownState(9)) => {}
            other => panic!("expected UnknownState, got {:?}", other),
        }
    }

    #[test]
    fn test_half_absent_position_fails() {
        let mut bytes = Command::for_tank(0).encode().unwrap();
        bytes[16..20].copy_from_slice(&10i32.to_le_bytes());

        assert!(matches!(
            Command::decode(&bytes),
            Err(ProtocolError::InvalidField {
                field: "position",
                value: -1
            })
        ));
    }

    #[test]
    fn test_negative_id_fails() {
        let mut bytes = Command::default().encode().unwrap();
        bytes[28..32].copy_from_slice(&(-7i32).to_le_bytes());

        assert!(matches!(
            Command::decode(&bytes),
            Err(ProtocolError::InvalidField { field: "fire", .. })
        ));
    }

    #[test]
    fn test_sentinel_scalar_rejected() {
        let mut command = Command::for_tank(0);
        command.speed = Some(i32::MAX);
        assert!(matches!(
            command.encode(),
            Err(ProtocolError::InvalidField { field: "speed", .. })
        ));
    }

    #[test]
    fn test_oversized_id_rejected() {
        let command = Command::for_tank(u32::MAX);
        assert!(matches!(
            command.encode(),
            Err(ProtocolError::OutOfRange {
                field: "tank_id",
                ..
            })
        ));
    }

    #[test]
    fn test_left_command() {
        let command = Command::left(4);
        assert!(command.is_left());
        assert_eq!(command.tank_id, Some(4));
        assert!(command.position.is_none());
        assert!(!Command::for_tank(4).is_left());
    }
}
