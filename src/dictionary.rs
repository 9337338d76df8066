use std::collections::BTreeSet;
use std::fmt;

use include_dir::{include_dir, Dir};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;

use crate::error::GameError;

/// Number of letters in every target word and guess.
pub const WORD_LENGTH: usize = 5;

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

/// A normalized five-letter word: uppercase ASCII letters only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Word([u8; WORD_LENGTH]);

impl Word {
    /// Parses a word, trimming surrounding whitespace and uppercasing it.
    pub fn parse(text: &str) -> Result<Self, GameError> {
        let trimmed = text.trim();
        let len = trimmed.chars().count();
        if len != WORD_LENGTH {
            return Err(GameError::WrongLength {
                word: trimmed.to_string(),
                len,
            });
        }

        let mut letters = [0u8; WORD_LENGTH];
        for (slot, c) in letters.iter_mut().zip(trimmed.chars()) {
            if !c.is_ascii_alphabetic() {
                return Err(GameError::InvalidLetter {
                    word: trimmed.to_string(),
                    letter: c,
                });
            }
            *slot = c.to_ascii_uppercase() as u8;
        }

        Ok(Self(letters))
    }

    pub(crate) fn from_letters(letters: [u8; WORD_LENGTH]) -> Self {
        Self(letters)
    }

    pub fn letters(&self) -> &[u8; WORD_LENGTH] {
        &self.0
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().map(|&b| b as char)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.chars() {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl TryFrom<&str> for Word {
    type Error = GameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Word::parse(value)
    }
}

#[derive(Deserialize, Debug)]
struct WordListFile {
    name: String,
    #[allow(dead_code)]
    size: u32,
    words: Vec<String>,
}

/// Immutable set of candidate target words.
#[derive(Debug, Clone)]
pub struct Dictionary {
    name: String,
    words: Vec<Word>,
}

impl Dictionary {
    /// Builds a dictionary, keeping only entries that normalize to a valid [`Word`].
    ///
    /// Fails with [`GameError::EmptyDictionary`] when nothing usable remains, since no
    /// session could ever draw a target from it.
    pub fn from_words<I, S>(name: impl Into<String>, words: I) -> Result<Self, GameError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<Word> = words
            .into_iter()
            .filter_map(|w| Word::parse(w.as_ref()).ok())
            .collect();

        if unique.is_empty() {
            return Err(GameError::EmptyDictionary);
        }

        let name = name.into();
        debug!("dictionary {name} loaded with {} words", unique.len());
        Ok(Self {
            name,
            words: unique.into_iter().collect(),
        })
    }

    /// Parses a `{ "name", "size", "words" }` word list document.
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let file: WordListFile = serde_json::from_str(json)?;
        Self::from_words(file.name, file.words)
    }

    /// Loads one of the word lists bundled with the binary.
    pub fn embedded(name: &str) -> Result<Self, GameError> {
        let file = LANG_DIR
            .get_file(format!("{name}.json"))
            .and_then(|f| f.contents_utf8())
            .ok_or_else(|| GameError::UnknownWordList(name.to_string()))?;
        Self::from_json(file)
    }

    pub fn english() -> Result<Self, GameError> {
        Self::embedded("english")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn contains(&self, word: &Word) -> bool {
        self.words.binary_search(word).is_ok()
    }

    /// Uniformly draws a word. `None` only for an empty dictionary.
    pub fn random_word<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Word> {
        self.words.choose(rng).copied()
    }

    /// Uniformly draws a word other than `current` when there is any alternative.
    pub fn random_word_except<R: Rng + ?Sized>(&self, rng: &mut R, current: &Word) -> Option<Word> {
        if self.words.len() < 2 || !self.contains(current) {
            return self.random_word(rng);
        }
        let index = rng.gen_range(0..self.words.len() - 1);
        let skip = self.words.binary_search(current).unwrap_or(self.words.len());
        let index = if index >= skip { index + 1 } else { index };
        self.words.get(index).copied()
    }
}
