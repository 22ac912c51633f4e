//! Integration tests for the relay and the client session
//!
//! These tests run a real relay on a loopback port and talk to it through
//! real TCP connections.

use client::game::Game;
use client::input::InputState;
use client::network::SessionClient;
use server::RelayServer;
use shared::{Command, Position, TankState, COMMAND_LEN};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::sleep;

async fn start_relay() -> String {
    let server = RelayServer::bind("127.0.0.1:0").await.unwrap();
    let addr = server.local_addr().unwrap().to_string();
    tokio::spawn(server.run());
    addr
}

async fn poll_until<F>(session: &mut SessionClient, done: F)
where
    F: Fn(&SessionClient) -> bool,
{
    for _ in 0..200 {
        session.poll().unwrap();
        if done(session) {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached for tank {}", session.tank_id());
}

/// Polls for a while and returns how many records arrived.
async fn drain_for(session: &mut SessionClient, millis: u64) -> u64 {
    let before = session.records_received();
    for _ in 0..millis / 10 {
        session.poll().unwrap();
        sleep(Duration::from_millis(10)).await;
    }
    session.records_received() - before
}

fn moved(id: u32, x: i32, y: i32) -> Command {
    let mut command = Command::for_tank(id).with_state(TankState::Operational);
    command.position = Some(Position::new(x, y));
    command.angle = Some(90);
    command
}

/// SESSION LIFECYCLE TESTS
mod lifecycle_tests {
    use super::*;

    /// Vacated ids are handed out again before new ones
    #[tokio::test]
    async fn vacated_id_is_reused() {
        let addr = start_relay().await;

        let a = SessionClient::connect(&addr).await.unwrap();
        let mut b = SessionClient::connect(&addr).await.unwrap();
        assert_eq!(a.tank_id(), 0);
        assert_eq!(b.tank_id(), 1);

        drop(a);
        poll_until(&mut b, |b| b.records_received() >= 1).await;

        let c = SessionClient::connect(&addr).await.unwrap();
        assert_eq!(c.tank_id(), 0);
    }

    /// A newcomer is sent the last record of every active session
    #[tokio::test]
    async fn late_joiner_catches_up() {
        let addr = start_relay().await;

        let mut a = SessionClient::connect(&addr).await.unwrap();
        a.send_command(&moved(0, 100, 200)).await.unwrap();
        a.send_command(&moved(0, 110, 200)).await.unwrap();
        sleep(Duration::from_millis(100)).await;

        let mut b = SessionClient::connect(&addr).await.unwrap();
        assert_eq!(b.tank_id(), 1);
        poll_until(&mut b, |b| b.remotes().len() == 1).await;

        assert_eq!(b.recv_command(0), Some(moved(0, 110, 200)));
        assert_eq!(b.recv_command(0), None);
        assert_eq!(drain_for(&mut a, 100).await, 0);
    }

    /// A departure removes the remote tank on every other client
    #[tokio::test]
    async fn departure_removes_remote_tank() {
        let addr = start_relay().await;

        let mut a = SessionClient::connect(&addr).await.unwrap();
        let mut b = SessionClient::connect(&addr).await.unwrap();

        a.send_command(&moved(0, 40, 40)).await.unwrap();
        poll_until(&mut b, |b| b.remotes().get(0).is_some()).await;

        drop(a);
        poll_until(&mut b, |b| b.remotes().is_empty()).await;
    }
}

/// BROADCAST TESTS
mod broadcast_tests {
    use super::*;

    /// Records reach every other session and are never echoed to the sender
    #[tokio::test]
    async fn broadcast_excludes_sender() {
        let addr = start_relay().await;

        let mut a = SessionClient::connect(&addr).await.unwrap();
        let mut b = SessionClient::connect(&addr).await.unwrap();
        let mut c = SessionClient::connect(&addr).await.unwrap();

        b.send_command(&moved(1, 300, 300)).await.unwrap();

        poll_until(&mut a, |a| a.remotes().get(1).is_some()).await;
        poll_until(&mut c, |c| c.remotes().get(1).is_some()).await;
        assert_eq!(a.recv_command(1), Some(moved(1, 300, 300)));
        assert_eq!(c.recv_command(1), Some(moved(1, 300, 300)));
        assert_eq!(drain_for(&mut b, 100).await, 0);
    }

    /// Records split across TCP segments are forwarded whole and in order
    #[tokio::test]
    async fn split_records_forwarded_whole() {
        let addr = start_relay().await;

        let mut raw = TcpStream::connect(&addr).await.unwrap();
        let mut assignment = [0u8; COMMAND_LEN];
        tokio::io::AsyncReadExt::read_exact(&mut raw, &mut assignment)
            .await
            .unwrap();
        assert_eq!(Command::decode(&assignment).unwrap(), Command::assignment(0));

        let mut b = SessionClient::connect(&addr).await.unwrap();

        let stream: Vec<u8> = (0..3)
            .flat_map(|i| moved(0, 10 * i, 5).encode().unwrap())
            .collect();
        for chunk in stream.chunks(7) {
            raw.write_all(chunk).await.unwrap();
            raw.flush().await.unwrap();
            sleep(Duration::from_millis(2)).await;
        }

        poll_until(&mut b, |b| b.records_received() >= 3).await;
        for i in 0..3 {
            assert_eq!(b.recv_command(0), Some(moved(0, 10 * i, 5)));
        }
    }
}

/// GAME OVER THE WIRE TESTS
mod game_tests {
    use super::*;

    /// A shot fired on one client appears on the other
    #[tokio::test]
    async fn fire_reaches_peer() {
        let addr = start_relay().await;

        let mut a = SessionClient::connect(&addr).await.unwrap();
        let mut b = SessionClient::connect(&addr).await.unwrap();
        let mut game_a = Game::new(a.tank_id());
        let mut game_b = Game::new(b.tank_id());

        let release = InputState {
            fire_released: true,
            ..InputState::default()
        };
        let command = game_a.tick(&release, a.remotes_mut()).unwrap();
        let fire = command.fire.unwrap();
        a.send_command(&command).await.unwrap();

        poll_until(&mut b, |b| b.remotes().get(0).is_some()).await;
        game_b.tick(&InputState::default(), b.remotes_mut());

        let projectile = game_b
            .projectiles()
            .iter()
            .find(|p| p.owner == 0)
            .expect("peer projectile missing");
        assert_eq!(projectile.id, fire);
        assert_eq!(
            b.remotes().get(0).unwrap().tank.position,
            game_a.tank().position
        );
    }

    /// Raw record layout is nine little-endian i32 values
    #[test]
    fn wire_layout() {
        let bytes = moved(2, 799, 0).encode().unwrap();
        let words: [i32; 9] = bincode::deserialize(&bytes).unwrap();
        assert_eq!(words, [2, 0, 90, i32::MAX, 799, 0, i32::MAX, -1, -1]);
    }
}
