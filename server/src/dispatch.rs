//! Maps protocol requests onto a session's game

use crate::game::{GameError, GameSession};
use crate::words::WordSource;
use log::debug;
use shared::{AnswerOutcome, MaskedWord, Request, Response};

/// Applies one request to `game` and builds the response record.
///
/// Ordinary gameplay never fails; only misuse of the state machine turns into
/// `Response::Rejected` (or a failed `AnswerFetched` for early reveals).
pub fn handle_request(game: &mut GameSession, words: &dyn WordSource, request: Request) -> Response {
    match request {
        Request::StartGame => {
            let word = game.start(words);
            Response::GameStarted { word }
        }

        Request::CheckGuess { char_clicked } => match game.check_guess(char_clicked) {
            Ok(outcome) => {
                debug!(
                    "Guess {:?}: correct={} incorrect={} word={}",
                    char_clicked,
                    outcome.correct_guess,
                    outcome.incorrect_guesses,
                    MaskedWord(&outcome.word)
                );
                Response::GuessChecked {
                    word: outcome.word,
                    correct_guess: outcome.correct_guess,
                    incorrect_guesses: outcome.incorrect_guesses,
                    win: outcome.win,
                    lost: outcome.lost,
                    repeated: outcome.repeated,
                }
            }
            Err(error) => rejected(error),
        },

        Request::RevealAnswer => match game.reveal_answer() {
            Ok(answer) => Response::AnswerFetched(AnswerOutcome::Success { answer }),
            Err(error @ GameError::GameUnfinished) => {
                Response::AnswerFetched(AnswerOutcome::Failure {
                    reason: error.reason(),
                    message: error.to_string(),
                })
            }
            Err(error) => rejected(error),
        },
    }
}

pub fn rejected(error: GameError) -> Response {
    Response::Rejected {
        reason: error.reason(),
        message: error.to_string(),
    }
}
