//! Error type shared by the codec, the framing layer and both binaries

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Failures of the record codec and of the connection carrying records.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The peer closed the stream or a write made no progress.
    #[error("connection broken")]
    ConnectionBroken,

    /// Only -1, 0, 1 and 2 are ever written to the state field.
    #[error("unknown tank state value {0}")]
    UnknownState(i32),

    #[error("invalid value {value} for field `{field}`")]
    InvalidField { field: &'static str, value: i32 },

    #[error("value {value} for field `{field}` does not fit the wire format")]
    OutOfRange { field: &'static str, value: u32 },

    #[error("record codec failure: {0}")]
    Codec(#[from] bincode::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
