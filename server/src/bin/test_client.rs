//! Minimal test client for exercising a running relay by hand.
//!
//! Connects, prints the assigned id, publishes a couple of position records
//! and then prints everything the relay forwards until the timeout expires.

use clap::Parser;
use shared::framing::read_into;
use shared::{write_record, Command, Position, RecordReassembler, TankState};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{timeout, Instant};

#[derive(Parser, Debug)]
struct Args {
    /// Relay address
    #[arg(short, long, default_value = "127.0.0.1:8888")]
    server: String,

    /// Seconds to keep listening after sending
    #[arg(short, long, default_value = "5")]
    listen_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut stream = TcpStream::connect(&args.server).await?;
    println!("Connected to {}", args.server);

    let mut reassembler = RecordReassembler::new();
    while !reassembler.has_record() {
        read_into(&mut stream, &mut reassembler).await?;
    }
    let assignment = match reassembler.next_record() {
        Some(record) => Command::decode(&record)?,
        None => return Err("handshake record missing".into()),
    };
    let id = assignment.tank_id.ok_or("assignment without tank id")?;
    println!("Assigned tank id: {}", id);

    let messages = [(100, 100, 0), (105, 100, 6)];
    for (x, y, angle) in messages {
        let mut command = Command::for_tank(id).with_state(TankState::Operational);
        command.position = Some(Position::new(x, y));
        command.angle = Some(angle);
        write_record(&mut stream, &command.encode()?).await?;
        println!("Sent: {:?}", command);
    }

    let deadline = Instant::now() + Duration::from_secs(args.listen_secs);
    loop {
        for record in reassembler.drain_records() {
            println!("Received: {:?}", Command::decode(&record)?);
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match timeout(remaining, read_into(&mut stream, &mut reassembler)).await {
            Ok(result) => {
                result?;
            }
            Err(_) => break,
        }
    }

    println!("Done");
    Ok(())
}
