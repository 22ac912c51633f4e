//! # Tank Relay Server Library
//!
//! The relay is the hub of the tank game's star topology. It does not
//! simulate anything: every client runs its own tank and publishes state
//! updates, and the relay fans those updates out to everybody else.
//!
//! ## Session Lifecycle
//!
//! Each TCP connection moves through `Connecting -> Active -> Closed`:
//!
//! - On accept the connection becomes active and receives the smallest
//!   tank id not held by another active session. Vacated ids are handed
//!   out again, which keeps ids dense.
//! - The first record written to a new session is its id assignment,
//!   followed by the last record seen from every other active session so
//!   the newcomer can place remote tanks immediately.
//! - While active, each complete record read from the session is
//!   remembered as its latest and forwarded byte-for-byte to every other
//!   session. Records are never echoed back to their sender.
//! - When the peer disconnects or a write to it fails, the session's last
//!   record is forgotten and a `Left` record carrying its id is sent to the
//!   remaining sessions.
//!
//! ## Architecture
//!
//! One reader task and one writer task per connection feed a single relay
//! loop over channels. Only the relay loop touches [`relay::RelayState`],
//! so no locks are needed anywhere.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::RelayServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = RelayServer::bind("127.0.0.1:8888").await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod network;
pub mod relay;

pub use network::{RelayServer, ServerMessage};
pub use relay::{ConnectionSerial, RelayState};
