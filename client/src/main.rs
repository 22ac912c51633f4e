use clap::Parser;
use client::game::Game;
use client::input::{InputSource, PatrolInput};
use client::network::SessionClient;
use log::{debug, error, info};
use shared::FPS;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Relay address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8888")]
    server: String,

    /// Number of ticks to play, 0 to play until the connection breaks
    #[arg(short = 't', long, default_value = "0")]
    ticks: u64,

    /// Seed for the patrol bot driving the local tank
    #[arg(long, default_value = "0")]
    seed: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client...");
    info!("Connecting to: {}", args.server);

    let mut session = SessionClient::connect(&args.server).await?;
    let mut game = Game::new(session.tank_id());
    let mut input = PatrolInput::new(args.seed);

    if let Err(e) = run_game_loop(&mut session, &mut game, &mut input, args.ticks).await {
        error!("Session with relay broke: {}", e);
        return Err(e.into());
    }

    info!("Played {} ticks, bye", game.current_tick());
    Ok(())
}

async fn run_game_loop(
    session: &mut SessionClient,
    game: &mut Game,
    input: &mut impl InputSource,
    ticks: u64,
) -> shared::Result<()> {
    let mut frame = interval(Duration::from_secs(1) / FPS);
    frame.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while ticks == 0 || game.current_tick() < ticks {
        frame.tick().await;

        session.poll()?;
        let sample = input.sample();
        if let Some(command) = game.tick(&sample, session.remotes_mut()) {
            session.send_command(&command).await?;
        }

        if game.current_tick() % u64::from(FPS) == 0 {
            let tank = game.tank();
            debug!(
                "Tick {}: at ({}, {}) angle {}, {} remote tanks, {} projectiles, {} records received",
                game.current_tick(),
                tank.position.x,
                tank.position.y,
                tank.angle,
                session.remotes().len(),
                game.projectiles().len(),
                session.records_received()
            );
        }
    }

    Ok(())
}
