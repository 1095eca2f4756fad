//! Performance benchmarks for critical game systems

use server::dispatch::handle_request;
use server::game::{GameSession, RepeatGuessPolicy};
use server::reveal::RevealedState;
use server::session_manager::SessionManager;
use server::words::{FixedWord, Vocabulary, Word, WordSource};
use shared::{Request, Response};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

const LETTER_ORDER: &str = "EARIOTNSLCUDPMHGBFYWKVXZJQ";

/// Plays one game to completion and returns true if it was won.
fn play(game: &mut GameSession, words: &dyn WordSource) -> bool {
    handle_request(game, words, Request::StartGame);

    for letter in LETTER_ORDER.chars() {
        match handle_request(game, words, Request::CheckGuess { char_clicked: letter }) {
            Response::GuessChecked { win: true, .. } => return true,
            Response::GuessChecked { lost: true, .. } => return false,
            Response::GuessChecked { .. } => {}
            other => panic!("Unexpected response: {:?}", other),
        }
    }

    false
}

/// Benchmarks masking and revealing a long word
#[test]
fn benchmark_reveal() {
    let word = Word::parse("BOSNIA AND HERZEGOVINA").unwrap();

    let iterations = 100_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let mut state = RevealedState::mask(&word);
        for letter in ['A', 'N', 'O', 'Z'] {
            state = state.reveal(&word, letter);
        }
        assert!(state.remaining() > 0);
    }

    let duration = start.elapsed();
    println!(
        "Reveal: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks whole games through request dispatch
#[test]
fn benchmark_full_games() {
    let words = Vocabulary::builtin();
    let mut game = GameSession::new(RepeatGuessPolicy::Ignore);

    let iterations = 10_000;
    let start = Instant::now();
    let mut won = 0;

    for _ in 0..iterations {
        if play(&mut game, &words) {
            won += 1;
        }
    }

    let duration = start.elapsed();
    println!(
        "Full games: {} games ({} won) in {:?} ({:.2} μs/game)",
        iterations,
        won,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 3 seconds
    assert!(duration.as_millis() < 3000);
}

/// Stress tests many sessions each playing their own game
#[tokio::test]
async fn stress_test_many_sessions() {
    let words = FixedWord(Word::parse("ESTONIA").unwrap());
    let mut manager = SessionManager::new(1000, Duration::from_secs(60), RepeatGuessPolicy::Ignore);

    let addrs: Vec<SocketAddr> = (0..1000u16)
        .map(|port| SocketAddr::from(([127, 0, 0, 1], 10_000 + port)))
        .collect();

    let start = Instant::now();

    for addr in &addrs {
        assert!(manager.add_session(*addr).is_some());
    }

    for addr in &addrs {
        let session = manager.touch_by_addr(*addr).unwrap();
        let mut game = session.game.lock().await;
        assert!(play(&mut game, &words));
    }

    let duration = start.elapsed();
    println!("Session stress: {} sessions in {:?}", manager.len(), duration);

    assert_eq!(manager.len(), 1000);
    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks session lookup by address as the table grows
#[test]
fn benchmark_session_lookup() {
    let mut manager = SessionManager::new(500, Duration::from_secs(60), RepeatGuessPolicy::Ignore);
    let addrs: Vec<SocketAddr> = (0..500u16)
        .map(|port| SocketAddr::from(([127, 0, 0, 1], 20_000 + port)))
        .collect();
    for addr in &addrs {
        manager.add_session(*addr);
    }

    let iterations = 100_000;
    let start = Instant::now();

    for i in 0..iterations {
        let addr = addrs[i % addrs.len()];
        assert!(manager.touch_by_addr(addr).is_some());
    }

    let duration = start.elapsed();
    println!(
        "Session lookup: {} lookups in {:?} ({:.2} ns/lookup)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Linear scan over 500 sessions; should stay under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks packet serialization for the largest response
#[test]
fn benchmark_packet_serialization() {
    use bincode::{deserialize, serialize};
    use shared::{Cell, Packet};

    let packet = Packet::Response {
        request_id: 12345,
        response: Response::GuessChecked {
            word: "UNITED ARAB EMIRATES".chars().map(Cell::Shown).collect(),
            correct_guess: true,
            incorrect_guesses: 3,
            win: false,
            lost: false,
            repeated: false,
        },
    };

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let serialized = serialize(&packet).unwrap();
        let _deserialized: Packet = deserialize(&serialized).unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Packet serialization: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}
