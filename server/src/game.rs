//! Authoritative per-session game state machine

use crate::judge::{has_lost, has_won, is_correct};
use crate::reveal::RevealedState;
use crate::words::{Word, WordSource};
use log::{debug, info};
use shared::{Cell, RejectReason, INCORRECT_GUESS_THRESHOLD};
use std::collections::BTreeSet;
use thiserror::Error;

/// How a letter that was already attempted is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum RepeatGuessPolicy {
    /// The attempted set is authoritative: a repeated letter changes nothing.
    #[default]
    Ignore,
    /// Every wrong attempt counts, even for a letter already tried.
    Count,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("No game in progress, start a new game first")]
    NoGame,
    #[error("This game is already finished, start a new game")]
    GameFinished,
    #[error("You can only see the answer once the game is over")]
    GameUnfinished,
    #[error("{0:?} is not a letter")]
    InvalidGuess(char),
}

impl GameError {
    pub fn reason(&self) -> RejectReason {
        match self {
            GameError::NoGame => RejectReason::NoGame,
            GameError::GameFinished => RejectReason::GameFinished,
            GameError::GameUnfinished => RejectReason::GameUnfinished,
            GameError::InvalidGuess(_) => RejectReason::InvalidGuess,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InProgress,
    Won,
    Lost,
}

/// Letters tried so far and how many of them missed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuessLedger {
    attempted: BTreeSet<char>,
    incorrect: u32,
}

impl GuessLedger {
    pub fn has_attempted(&self, guess: char) -> bool {
        self.attempted.contains(&guess)
    }

    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    pub fn attempted(&self) -> impl Iterator<Item = char> + '_ {
        self.attempted.iter().copied()
    }
}

#[derive(Debug, Clone)]
struct ActiveGame {
    word: Word,
    revealed: RevealedState,
    ledger: GuessLedger,
    phase: Phase,
}

/// Result of one accepted guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessOutcome {
    pub word: Vec<Cell>,
    pub correct_guess: bool,
    pub incorrect_guesses: u32,
    pub win: bool,
    pub lost: bool,
    pub repeated: bool,
}

/// One player's game. Replaced wholesale by every `start`.
#[derive(Debug, Clone)]
pub struct GameSession {
    game: Option<ActiveGame>,
    threshold: u32,
    policy: RepeatGuessPolicy,
}

impl GameSession {
    pub fn new(policy: RepeatGuessPolicy) -> Self {
        Self {
            game: None,
            threshold: INCORRECT_GUESS_THRESHOLD,
            policy,
        }
    }

    /// Draws a fresh word and abandons whatever game was running.
    pub fn start(&mut self, words: &dyn WordSource) -> Vec<Cell> {
        let word = words.next_word();
        let revealed = RevealedState::mask(&word);
        debug!("New game with {} letters to find", revealed.remaining());

        let cells = revealed.to_cells();
        self.game = Some(ActiveGame {
            word,
            revealed,
            ledger: GuessLedger::default(),
            phase: Phase::InProgress,
        });
        cells
    }

    pub fn check_guess(&mut self, guess: char) -> Result<GuessOutcome, GameError> {
        let threshold = self.threshold;
        let policy = self.policy;
        let game = self.game.as_mut().ok_or(GameError::NoGame)?;

        if game.phase != Phase::InProgress {
            return Err(GameError::GameFinished);
        }

        let guess = guess.to_ascii_uppercase();
        if !guess.is_ascii_uppercase() {
            return Err(GameError::InvalidGuess(guess));
        }

        let correct = is_correct(guess, &game.word);
        let repeated = !game.ledger.attempted.insert(guess);

        if correct {
            game.revealed = game.revealed.reveal(&game.word, guess);
        } else if !repeated || policy == RepeatGuessPolicy::Count {
            game.ledger.incorrect += 1;
        }

        let remaining = game.revealed.remaining();
        let incorrect = game.ledger.incorrect;
        let win = has_won(remaining, incorrect, threshold);
        let lost = has_lost(incorrect, threshold);

        if win {
            game.phase = Phase::Won;
            info!("Game won with {} incorrect guesses", incorrect);
        } else if lost {
            game.phase = Phase::Lost;
            info!("Game lost after {} incorrect guesses", incorrect);
        }

        Ok(GuessOutcome {
            word: game.revealed.to_cells(),
            correct_guess: correct,
            incorrect_guesses: incorrect,
            win,
            lost,
            repeated,
        })
    }

    /// The word, but only once nothing is left to play for.
    pub fn reveal_answer(&self) -> Result<String, GameError> {
        let game = self.game.as_ref().ok_or(GameError::NoGame)?;

        if game.ledger.incorrect >= self.threshold || game.revealed.remaining() == 0 {
            Ok(game.word.to_string())
        } else {
            Err(GameError::GameUnfinished)
        }
    }

    pub fn phase(&self) -> Option<Phase> {
        self.game.as_ref().map(|game| game.phase)
    }

    pub fn ledger(&self) -> Option<&GuessLedger> {
        self.game.as_ref().map(|game| &game.ledger)
    }

    pub fn remaining(&self) -> Option<usize> {
        self.game.as_ref().map(|game| game.revealed.remaining())
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn policy(&self) -> RepeatGuessPolicy {
        self.policy
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(RepeatGuessPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::FixedWord;
    use shared::MaskedWord;
    use tokio_test::{assert_err, assert_ok};

    fn source(raw: &str) -> FixedWord {
        FixedWord(Word::parse(raw).unwrap())
    }

    fn started(raw: &str, policy: RepeatGuessPolicy) -> GameSession {
        let mut session = GameSession::new(policy);
        session.start(&source(raw));
        session
    }

    #[test]
    fn test_start_returns_mask_only() {
        let mut session = GameSession::default();
        let cells = session.start(&source("FRANCE"));
        assert_eq!(MaskedWord(&cells).to_string(), "______");
        assert_eq!(session.phase(), Some(Phase::InProgress));
        assert_eq!(session.ledger().unwrap().incorrect(), 0);
    }

    #[test]
    fn test_guess_before_start_is_rejected() {
        let mut session = GameSession::default();
        assert_eq!(session.check_guess('A'), Err(GameError::NoGame));
        assert_eq!(session.reveal_answer(), Err(GameError::NoGame));
        assert_eq!(session.phase(), None);
    }

    #[test]
    fn test_france_scenario_counting_repeats() {
        let mut session = started("FRANCE", RepeatGuessPolicy::Count);

        let outcome = session.check_guess('F').unwrap();
        assert!(outcome.correct_guess);
        assert_eq!(MaskedWord(&outcome.word).to_string(), "F_____");
        assert_eq!(session.remaining(), Some(5));
        assert_eq!(outcome.incorrect_guesses, 0);
        assert!(!outcome.win);

        for expected in 1..=5 {
            let outcome = session.check_guess('Z').unwrap();
            assert!(!outcome.correct_guess);
            assert_eq!(outcome.incorrect_guesses, expected);
            assert!(!outcome.win);
            assert!(!outcome.lost);
        }

        let outcome = session.check_guess('Z').unwrap();
        assert_eq!(outcome.incorrect_guesses, 6);
        assert!(outcome.lost);
        assert!(!outcome.win);
        assert_eq!(session.phase(), Some(Phase::Lost));
        assert_eq!(session.reveal_answer(), Ok("FRANCE".to_string()));
    }

    #[test]
    fn test_france_scenario_distinct_letters() {
        let mut session = started("FRANCE", RepeatGuessPolicy::Ignore);

        session.check_guess('F').unwrap();
        for (index, letter) in "ZQXWV".chars().enumerate() {
            let outcome = session.check_guess(letter).unwrap();
            assert_eq!(outcome.incorrect_guesses, index as u32 + 1);
            assert!(!outcome.lost);
        }

        let outcome = session.check_guess('K').unwrap();
        assert_eq!(outcome.incorrect_guesses, 6);
        assert!(outcome.lost);
        assert_eq!(session.reveal_answer(), Ok("FRANCE".to_string()));
    }

    #[test]
    fn test_repeated_wrong_guess_is_ignored() {
        let mut session = started("FRANCE", RepeatGuessPolicy::Ignore);

        let first = session.check_guess('Z').unwrap();
        assert_eq!(first.incorrect_guesses, 1);
        assert!(!first.repeated);

        for _ in 0..10 {
            let again = session.check_guess('z').unwrap();
            assert!(again.repeated);
            assert!(!again.correct_guess);
            assert_eq!(again.incorrect_guesses, 1);
            assert!(!again.lost);
        }
        assert_eq!(session.phase(), Some(Phase::InProgress));
    }

    #[test]
    fn test_repeated_correct_guess_is_noop() {
        for policy in [RepeatGuessPolicy::Ignore, RepeatGuessPolicy::Count] {
            let mut session = started("FRANCE", policy);
            let first = session.check_guess('A').unwrap();
            let second = session.check_guess('A').unwrap();

            assert!(second.correct_guess);
            assert!(second.repeated);
            assert_eq!(first.word, second.word);
            assert_eq!(second.incorrect_guesses, 0);
        }
    }

    #[test]
    fn test_win_by_revealing_everything() {
        let mut session = started("A B", RepeatGuessPolicy::Ignore);
        assert_eq!(session.remaining(), Some(2));

        let outcome = session.check_guess('A').unwrap();
        assert!(!outcome.win);
        let outcome = session.check_guess('b').unwrap();
        assert!(outcome.win);
        assert!(!outcome.lost);
        assert_eq!(MaskedWord(&outcome.word).to_string(), "A B");
        assert_eq!(session.phase(), Some(Phase::Won));
        assert_eq!(session.reveal_answer(), Ok("A B".to_string()));
    }

    #[test]
    fn test_guess_after_finish_is_rejected_without_mutation() {
        let mut session = started("PERU", RepeatGuessPolicy::Count);
        for _ in 0..6 {
            assert_ok!(session.check_guess('Z'));
        }
        let ledger_before = session.ledger().cloned();

        assert_eq!(session.check_guess('P'), Err(GameError::GameFinished));
        assert_eq!(session.check_guess('Z'), Err(GameError::GameFinished));
        assert_eq!(session.ledger().cloned(), ledger_before);
        assert_eq!(session.remaining(), Some(4));
        assert_eq!(session.ledger().unwrap().incorrect(), 6);
    }

    #[test]
    fn test_early_reveal_does_not_leak_word() {
        let session = started("FRANCE", RepeatGuessPolicy::Ignore);
        let error = assert_err!(session.reveal_answer());
        assert_eq!(error, GameError::GameUnfinished);
        assert_eq!(error.reason(), RejectReason::GameUnfinished);
        assert!(!error.to_string().contains("FRANCE"));
    }

    #[test]
    fn test_invalid_guess_is_rejected() {
        let mut session = started("FRANCE", RepeatGuessPolicy::Ignore);
        assert_eq!(session.check_guess('7'), Err(GameError::InvalidGuess('7')));
        assert_eq!(session.check_guess(' '), Err(GameError::InvalidGuess(' ')));
        assert_eq!(session.ledger().unwrap().incorrect(), 0);
        assert_eq!(session.ledger().unwrap().attempted().count(), 0);
    }

    #[test]
    fn test_start_replaces_previous_game() {
        let mut session = started("PERU", RepeatGuessPolicy::Count);
        for _ in 0..6 {
            session.check_guess('Z').unwrap();
        }
        assert_eq!(session.phase(), Some(Phase::Lost));

        let cells = session.start(&source("CHILE"));
        assert_eq!(cells.len(), 5);
        assert_eq!(session.phase(), Some(Phase::InProgress));
        assert_eq!(session.ledger().unwrap().incorrect(), 0);
        assert!(!session.ledger().unwrap().has_attempted('Z'));
        assert_eq!(session.reveal_answer(), Err(GameError::GameUnfinished));
    }
}
