//! Plays a few games against a running server using raw packets, guessing
//! letters in English frequency order. Handy for checking a deployment.

use bincode::{deserialize, serialize};
use clap::Parser;
use shared::{MaskedWord, Packet, Request, Response, MAX_PACKET_SIZE, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

const LETTERS_BY_FREQUENCY: &str = "EARIOTNSLCUDPMHGBFYWKVXZJQ";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Number of games to play
    #[arg(short, long, default_value = "3")]
    games: u32,
}

struct Probe {
    socket: UdpSocket,
    server_addr: SocketAddr,
    next_request_id: u32,
}

impl Probe {
    async fn exchange(&self, packet: &Packet) -> Result<Packet, Box<dyn std::error::Error>> {
        self.socket.send_to(&serialize(packet)?, self.server_addr).await?;

        let mut buf = [0u8; MAX_PACKET_SIZE];
        let (len, _) = timeout(Duration::from_secs(2), self.socket.recv_from(&mut buf)).await??;
        Ok(deserialize(&buf[..len])?)
    }

    async fn request(&mut self, request: Request) -> Result<Response, Box<dyn std::error::Error>> {
        self.next_request_id += 1;
        let packet = Packet::Request {
            request_id: self.next_request_id,
            request,
        };

        match self.exchange(&packet).await? {
            Packet::Response { response, .. } => Ok(response),
            other => Err(format!("Expected a response but got: {:?}", other).into()),
        }
    }

    async fn play(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let Response::GameStarted { word } = self.request(Request::StartGame).await? {
            println!("New game: {}", MaskedWord(&word));
        }

        for letter in LETTERS_BY_FREQUENCY.chars() {
            let response = self
                .request(Request::CheckGuess {
                    char_clicked: letter,
                })
                .await?;

            match response {
                Response::GuessChecked {
                    word,
                    correct_guess,
                    incorrect_guesses,
                    win,
                    lost,
                    ..
                } => {
                    println!(
                        "  {} -> {} ({}, {} wrong)",
                        letter,
                        MaskedWord(&word),
                        if correct_guess { "hit" } else { "miss" },
                        incorrect_guesses
                    );
                    if win {
                        println!("  Won!");
                        return Ok(());
                    }
                    if lost {
                        break;
                    }
                }
                Response::Rejected { message, .. } => {
                    println!("  Rejected: {}", message);
                    break;
                }
                other => println!("  Unexpected response: {:?}", other),
            }
        }

        match self.request(Request::RevealAnswer).await? {
            Response::AnswerFetched(outcome) => println!("  Lost, answer: {:?}", outcome),
            other => println!("  Unexpected response: {:?}", other),
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    println!("Client socket bound to {}", socket.local_addr()?);

    let mut probe = Probe {
        socket,
        server_addr: args.server.parse()?,
        next_request_id: 0,
    };

    match probe
        .exchange(&Packet::Connect {
            client_version: PROTOCOL_VERSION,
        })
        .await?
    {
        Packet::Connected { session_id } => println!("Connected with session ID: {}", session_id),
        other => return Err(format!("Expected Connected but got: {:?}", other).into()),
    }

    for _ in 0..args.games {
        probe.play().await?;
    }

    probe.socket.send_to(&serialize(&Packet::Disconnect)?, probe.server_addr).await?;
    println!("Smoke client finished");

    Ok(())
}
