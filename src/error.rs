use thiserror::Error;

use crate::dictionary::WORD_LENGTH;

/// Errors raised while building words, word lists and sessions.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("dictionary contains no valid {WORD_LENGTH}-letter words")]
    EmptyDictionary,

    #[error("expected a {WORD_LENGTH}-letter word, got {len} letters in {word:?}")]
    WrongLength { word: String, len: usize },

    #[error("{word:?} contains {letter:?}, which is not a letter from A to Z")]
    InvalidLetter { word: String, letter: char },

    #[error("word list {0:?} not found")]
    UnknownWordList(String),

    #[error("unable to parse word list: {0}")]
    WordList(#[from] serde_json::Error),
}

/// Errors raised by a ledger store. Callers treat these as best-effort failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("stored value {value:?} for key {key:?} is not a valid count")]
    Corrupt { key: &'static str, value: String },

    #[error("ledger store rejected the write")]
    Unavailable,
}
