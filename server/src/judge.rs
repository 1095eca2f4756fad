//! Pure decisions about guesses and game outcome

use crate::words::Word;

pub fn is_correct(guess: char, word: &Word) -> bool {
    let guess = guess.to_ascii_uppercase();
    guess != ' ' && word.chars().any(|c| c == guess)
}

/// Every letter shown while still under the threshold.
pub fn has_won(remaining: usize, incorrect: u32, threshold: u32) -> bool {
    remaining == 0 && incorrect < threshold
}

pub fn has_lost(incorrect: u32, threshold: u32) -> bool {
    incorrect >= threshold
}
