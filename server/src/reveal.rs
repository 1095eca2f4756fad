//! Per-character disclosure state for the active word

use crate::words::Word;
use shared::Cell;

/// One cell per character of the secret word. Spaces start out shown and a
/// shown cell is never hidden again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealedState {
    cells: Vec<Cell>,
}

impl RevealedState {
    pub fn mask(word: &Word) -> Self {
        let cells = word
            .chars()
            .map(|c| if c == ' ' { Cell::Shown(' ') } else { Cell::Hidden })
            .collect();
        Self { cells }
    }

    /// Returns a copy with every hidden occurrence of `guess` shown.
    /// Letters not in the word, or already shown, leave the state unchanged.
    pub fn reveal(&self, word: &Word, guess: char) -> Self {
        let guess = guess.to_ascii_uppercase();
        debug_assert_eq!(self.cells.len(), word.len());

        let cells = self
            .cells
            .iter()
            .zip(word.chars())
            .map(|(cell, actual)| match cell {
                Cell::Hidden if actual == guess => Cell::Shown(actual),
                _ => *cell,
            })
            .collect();
        Self { cells }
    }

    pub fn remaining(&self) -> usize {
        shared::hidden_count(&self.cells)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn to_cells(&self) -> Vec<Cell> {
        self.cells.clone()
    }
}
