use clap::Parser;
use client::app::App;
use client::game::ClientGameProxy;
use client::network::{NetworkClient, NetworkConfig};
use log::{error, info};
use macroquad::window::Conf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Milliseconds to wait for a server reply
    #[arg(short = 't', long, default_value = "3000")]
    request_timeout: u64,

    /// Simulate network latency in milliseconds
    #[arg(short = 'l', long, default_value = "0")]
    fake_ping: u64,

    /// Window width
    #[arg(short = 'w', long, default_value = "800")]
    width: i32,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value = "600")]
    height: i32,
}

fn window_conf() -> Conf {
    let args = Args::parse();
    Conf {
        window_title: "Hangman".to_owned(),
        window_width: args.width,
        window_height: args.height,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    if let Err(e) = run(Args::parse()).await {
        error!("Client stopped with error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting client...");
    info!("Connecting to: {}", args.server);
    if args.fake_ping > 0 {
        info!("Simulating {}ms latency", args.fake_ping);
    }

    let config = NetworkConfig {
        request_timeout: Duration::from_millis(args.request_timeout),
        fake_ping_ms: args.fake_ping,
    };

    // The socket lives on its own runtime; the window thread only polls
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;

    let network = runtime.block_on(NetworkClient::connect(&args.server, config))?;
    let (handle, network_task) = {
        let _guard = runtime.enter();
        network.spawn()
    };

    let mut app = App::new(
        ClientGameProxy::new(handle),
        args.width as f32,
        args.height as f32,
    )?;
    app.run().await;

    // Dropping the last handle lets the driver say goodbye to the server
    drop(app);
    runtime.block_on(network_task)?;

    Ok(())
}
