use clap::Parser;
use log::{error, info};
use server::game::RepeatGuessPolicy;
use server::network::{Server, ServerConfig};
use server::words::{Vocabulary, WordSource};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Maximum number of concurrent sessions
    #[arg(short, long, default_value = "256")]
    max_sessions: usize,

    /// Seconds of inactivity before a session is dropped
    #[arg(short = 't', long, default_value = "1800")]
    session_timeout: u64,

    /// Newline separated word list (defaults to the built-in country list)
    #[arg(short, long)]
    words: Option<PathBuf>,

    /// How a letter that was already tried is treated
    #[arg(short, long, value_enum, default_value_t = RepeatGuessPolicy::Ignore)]
    repeat_guesses: RepeatGuessPolicy,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();

    // An unusable vocabulary is a startup failure, never a per-request one
    let vocabulary = match &args.words {
        Some(path) => Vocabulary::from_file(path)?,
        None => Vocabulary::builtin(),
    };
    info!("Vocabulary ready with {} words", vocabulary.len());
    let words: Arc<dyn WordSource> = Arc::new(vocabulary);

    let config = ServerConfig {
        max_sessions: args.max_sessions,
        session_timeout: Duration::from_secs(args.session_timeout),
        policy: args.repeat_guesses,
    };
    info!("Repeat guess policy: {:?}", config.policy);

    let address = format!("{}:{}", args.host, args.port);
    let mut server = Server::new(&address, config, words).await?;

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server stopped with error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
