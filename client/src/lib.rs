//! # Tank Client Library
//!
//! Client side of the tank battle: the local simulation and the session that
//! keeps it in step with every other participant through the relay.
//!
//! ## Architecture Overview
//!
//! Every tank is simulated independently on the machine that owns it. The
//! owner flies its tank optimistically and publishes the outcome of each tick
//! as a [`shared::Command`]; everyone else simply replays those commands. There
//! is no authoritative server state, no rollback and no interpolation.
//!
//! ### Optimistic Local Simulation
//! The local tank moves, collides with walls and fires without waiting for
//! anyone. When a foreign projectile hits it, the local client decides that on
//! its own and announces the destruction, naming the projectile so peers can
//! show it detonating.
//!
//! ### Remote Replay
//! Commands received for a remote tank are queued per tank and replayed one
//! per tick, oldest first. Each command is a field-level patch: only the
//! fields it carries overwrite the remote tank's attributes.
//!
//! ## Module Organization
//!
//! ### Session (`network`)
//! Handshake with the relay, non-blocking framing of the inbound byte stream,
//! and whole-record writes for outbound commands.
//!
//! ### Remote Registry (`registry`)
//! Remote tanks keyed by id, created on first sight and removed when their
//! owner leaves.
//!
//! ### Simulation (`game`, `tank`, `projectile`, `pilot`, `battlefield`)
//! The per-tick loop, the tank and projectile entities, the two pilot kinds
//! (input-driven for the local tank, network-driven for remote ones) and the
//! static battlefield layout.
//!
//! ### Input (`input`)
//! Control intents and the sources that produce them. Keyboard mapping is left
//! to the embedding frontend; the headless binary uses a seeded patrol bot.
//!
//! ## Usage Example
//!
//! ```no_run
//! use client::game::Game;
//! use client::input::{InputSource, PatrolInput};
//! use client::network::SessionClient;
//!
//! # async fn run() -> shared::Result<()> {
//! let mut session = SessionClient::connect("127.0.0.1:8888").await?;
//! let mut game = Game::new(session.tank_id());
//! let mut input = PatrolInput::new(1);
//!
//! loop {
//!     session.poll()?;
//!     let sample = input.sample();
//!     if let Some(command) = game.tick(&sample, session.remotes_mut()) {
//!         session.send_command(&command).await?;
//!     }
//! }
//! # }
//! ```

pub mod battlefield;
pub mod game;
pub mod input;
pub mod network;
pub mod pilot;
pub mod projectile;
pub mod registry;
pub mod tank;
