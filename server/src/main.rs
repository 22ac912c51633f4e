use clap::Parser;
use log::{error, info};
use server::RelayServer;

#[derive(Parser, Debug)]
#[command(author, version, about = "Relay server for the networked tank game", long_about = None)]
struct Args {
    /// IP:port to listen on
    #[arg(short, long, default_value = "127.0.0.1:8888")]
    listen: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let server = RelayServer::bind(&args.listen).await?;

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Relay stopped: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
