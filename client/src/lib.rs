//! # Hangman Client Library
//!
//! The player-facing side of the game. The server owns the secret word and
//! every verdict; the client only sends the player's intent and redraws from
//! what comes back.
//!
//! ## Module Organization
//!
//! ### Network (`network`)
//! The `Transport` trait and its UDP implementation: session handshake,
//! request IDs, response matching and request timeouts on a background task.
//!
//! ### Game (`game`)
//! `ClientGameProxy`, which mirrors the three game operations, keeps a small
//! copy of the server's verdicts and broadcasts one `Notification` per
//! completed operation.
//!
//! ### Views (`views`)
//! Independent observers (options button, word, alphabet, gallows, answer
//! panel, result banner) that only react to notifications.
//!
//! ### Tasks (`tasks`)
//! A frame-driven executor so operations can await the network while the
//! window keeps drawing.
//!
//! ### Input and Rendering (`input`, `rendering`)
//! macroquad input mapped to game actions and the drawing of every view.
//!
//! ### App (`app`)
//! The frame loop tying everything together.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::game::{ClientGameProxy, Notification, NotificationKind};
//! use client::network::{NetworkClient, NetworkConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let network = NetworkClient::connect("127.0.0.1:8080", NetworkConfig::default()).await?;
//!     let (handle, _task) = network.spawn();
//!
//!     let proxy = ClientGameProxy::new(handle);
//!     proxy.subscribe(NotificationKind::GuessChecked, |notification| {
//!         if let Notification::GuessChecked { word, .. } = notification {
//!             println!("{}", shared::MaskedWord(word));
//!         }
//!     });
//!
//!     proxy.start().await?;
//!     proxy.check('E').await?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
pub mod tasks;
pub mod views;
