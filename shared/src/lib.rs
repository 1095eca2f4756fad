use serde::{Deserialize, Serialize};
use std::fmt;

pub const PROTOCOL_VERSION: u32 = 1;
pub const INCORRECT_GUESS_THRESHOLD: u32 = 6;
pub const PLACEHOLDER: char = '_';
pub const MAX_PACKET_SIZE: usize = 2048;

/// Encoded size of one revealed cell: variant tag plus a one-byte ASCII char.
const SHOWN_CELL_SIZE: usize = 5;
/// Room for the packet, response and length headers around the cells.
const RESPONSE_HEADROOM: usize = 64;

/// Longest secret word whose fully revealed response still fits in one
/// datagram.
pub const MAX_WORD_LEN: usize = (MAX_PACKET_SIZE - RESPONSE_HEADROOM) / SHOWN_CELL_SIZE;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Packet {
    Connect {
        client_version: u32,
    },
    Request {
        request_id: u32,
        request: Request,
    },
    Disconnect,

    Connected {
        session_id: u32,
    },
    Response {
        request_id: u32,
        response: Response,
    },
    Disconnected {
        reason: String,
    },
}

/// The three operations a session can ask of its game.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    StartGame,
    CheckGuess { char_clicked: char },
    RevealAnswer,
}

/// One record type per operation, plus the shared rejection payload.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum Response {
    GameStarted {
        word: Vec<Cell>,
    },
    GuessChecked {
        word: Vec<Cell>,
        correct_guess: bool,
        incorrect_guesses: u32,
        win: bool,
        lost: bool,
        repeated: bool,
    },
    AnswerFetched(AnswerOutcome),
    Rejected {
        reason: RejectReason,
        message: String,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    Success { answer: String },
    Failure { reason: RejectReason, message: String },
}

impl AnswerOutcome {
    /// Legacy status code: 1 when the answer was disclosed, -1 otherwise.
    pub fn success(&self) -> i8 {
        match self {
            AnswerOutcome::Success { .. } => 1,
            AnswerOutcome::Failure { .. } => -1,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    NoSession,
    NoGame,
    GameFinished,
    GameUnfinished,
    InvalidGuess,
}

/// One position of the masked word.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Hidden,
    Shown(char),
}

impl Cell {
    pub fn is_hidden(&self) -> bool {
        matches!(self, Cell::Hidden)
    }

    pub fn as_char(&self) -> char {
        match self {
            Cell::Hidden => PLACEHOLDER,
            Cell::Shown(c) => *c,
        }
    }
}

/// Display adapter rendering cells as e.g. `F_____`.
pub struct MaskedWord<'a>(pub &'a [Cell]);

impl fmt::Display for MaskedWord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in self.0 {
            write!(f, "{}", cell.as_char())?;
        }
        Ok(())
    }
}

pub fn hidden_count(cells: &[Cell]) -> usize {
    cells.iter().filter(|cell| cell.is_hidden()).count()
}
