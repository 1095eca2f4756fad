//! Secret word validation and the vocabulary the server draws from

use log::info;
use rand::Rng;
use shared::MAX_WORD_LEN;
use std::fmt;
use std::path::Path;
use thiserror::Error;

const BUILTIN_WORDS: &[&str] = &[
    "ARGENTINA",
    "AUSTRALIA",
    "AUSTRIA",
    "BELGIUM",
    "BRAZIL",
    "CANADA",
    "CHILE",
    "COLOMBIA",
    "COSTA RICA",
    "CROATIA",
    "DENMARK",
    "EGYPT",
    "FINLAND",
    "FRANCE",
    "GERMANY",
    "GREECE",
    "ICELAND",
    "INDIA",
    "IRELAND",
    "ITALY",
    "JAPAN",
    "KENYA",
    "MEXICO",
    "MOROCCO",
    "NEW ZEALAND",
    "NORWAY",
    "PERU",
    "POLAND",
    "PORTUGAL",
    "SAUDI ARABIA",
    "SOUTH AFRICA",
    "SOUTH KOREA",
    "SPAIN",
    "SRI LANKA",
    "SWEDEN",
    "SWITZERLAND",
    "THAILAND",
    "UNITED KINGDOM",
    "URUGUAY",
    "VIETNAM",
];

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("vocabulary is empty")]
    Empty,
    #[error(
        "invalid word {word:?} on line {line}: only letters and spaces are allowed, at most {max} characters",
        max = MAX_WORD_LEN
    )]
    InvalidWord { line: usize, word: String },
    #[error("failed to read word list: {0}")]
    Io(#[from] std::io::Error),
}

/// A secret word: uppercase ASCII letters and spaces, at least one letter and
/// no longer than `MAX_WORD_LEN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Word(String);

impl Word {
    /// Uppercases `raw` and validates it. Returns None for anything that is
    /// not a playable word.
    pub fn parse(raw: &str) -> Option<Self> {
        let word = raw.trim().to_ascii_uppercase();
        let valid_chars = word.chars().all(|c| c.is_ascii_uppercase() || c == ' ');
        let has_letter = word.chars().any(|c| c.is_ascii_uppercase());
        let fits = word.len() <= MAX_WORD_LEN;

        if valid_chars && has_letter && fits {
            Some(Word(word))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.0.chars()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Supplies one secret word per game.
pub trait WordSource: Send + Sync {
    fn next_word(&self) -> Word;
}

/// A fixed, non-empty list of words drawn uniformly at random.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    first: Word,
    rest: Vec<Word>,
}

impl Vocabulary {
    pub fn new<I, S>(words: I) -> Result<Self, VocabularyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                Word::parse(raw.as_ref()).ok_or_else(|| VocabularyError::InvalidWord {
                    line: index + 1,
                    word: raw.as_ref().to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_words(words)
    }

    pub fn builtin() -> Self {
        Self {
            first: Word(BUILTIN_WORDS[0].to_string()),
            rest: BUILTIN_WORDS[1..]
                .iter()
                .filter_map(|raw| Word::parse(raw))
                .collect(),
        }
    }

    /// Parses a newline separated word list. Blank lines and lines starting
    /// with `#` are skipped; line numbers in errors refer to the file.
    pub fn parse_list(contents: &str) -> Result<Self, VocabularyError> {
        let mut words = Vec::new();

        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let word = Word::parse(line).ok_or_else(|| VocabularyError::InvalidWord {
                line: index + 1,
                word: line.to_string(),
            })?;
            words.push(word);
        }

        Self::from_words(words)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, VocabularyError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let vocabulary = Self::parse_list(&contents)?;
        info!(
            "Loaded {} words from {}",
            vocabulary.len(),
            path.as_ref().display()
        );
        Ok(vocabulary)
    }

    fn from_words(words: Vec<Word>) -> Result<Self, VocabularyError> {
        let mut words = words.into_iter();
        let first = words.next().ok_or(VocabularyError::Empty)?;
        Ok(Self {
            first,
            rest: words.collect(),
        })
    }

    pub fn len(&self) -> usize {
        1 + self.rest.len()
    }

    /// Always false: a vocabulary holds at least one word.
    pub fn is_empty(&self) -> bool {
        false
    }

    fn get(&self, index: usize) -> &Word {
        match index.checked_sub(1) {
            None => &self.first,
            Some(i) => &self.rest[i],
        }
    }
}

impl WordSource for Vocabulary {
    fn next_word(&self) -> Word {
        let index = rand::thread_rng().gen_range(0..self.len());
        self.get(index).clone()
    }
}

/// Always hands out the same word. Used to script games in tests and tools.
#[derive(Debug, Clone)]
pub struct FixedWord(pub Word);

impl WordSource for FixedWord {
    fn next_word(&self) -> Word {
        self.0.clone()
    }
}
