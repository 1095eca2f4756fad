//! # Hangman Server Library
//!
//! The authoritative side of the game. Every player session owns exactly one
//! game; the server draws the secret word, judges guesses and decides win or
//! loss. Clients only ever see the masked word until the answer may be
//! disclosed.
//!
//! ## Module Organization
//!
//! ### Words (`words`)
//! Validated secret words, the `WordSource` trait and the built-in or
//! file-backed vocabulary.
//!
//! ### Reveal (`reveal`)
//! Masking and per-letter unmasking of the active word.
//!
//! ### Judge (`judge`)
//! Pure rules: is a guess correct, is the game won, is it lost.
//!
//! ### Game (`game`)
//! The per-session state machine `NoGame → InProgress → {Won, Lost}` and the
//! repeat guess policy.
//!
//! ### Session Manager (`session_manager`)
//! Session identities, capacity, idle expiry and the per-session game locks.
//!
//! ### Dispatch (`dispatch`)
//! Turns protocol requests into game operations and response records.
//!
//! ### Network (`network`)
//! UDP socket tasks and the main server loop.
//!
//! ## Concurrency
//!
//! Packets are decoded on a receiver task and handled in order by the main
//! loop. Each request then runs on its own task holding its session's game
//! lock, so two guesses for one session can never interleave while separate
//! sessions proceed in parallel.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::{Server, ServerConfig};
//! use server::words::Vocabulary;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let words = Arc::new(Vocabulary::builtin());
//!     let mut server = Server::new("127.0.0.1:8080", ServerConfig::default(), words).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod dispatch;
pub mod game;
pub mod judge;
pub mod network;
pub mod reveal;
pub mod session_manager;
pub mod words;
