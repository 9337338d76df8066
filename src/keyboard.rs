use crate::dictionary::Word;
use crate::evaluator::{Verdict, Verdicts};

const ALPHABET_LEN: usize = 26;

/// Best known verdict per letter across the rows scored against the current target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardHints {
    letters: [Option<Verdict>; ALPHABET_LEN],
}

fn slot(letter: char) -> Option<usize> {
    letter
        .is_ascii_alphabetic()
        .then(|| (letter.to_ascii_uppercase() as u8 - b'A') as usize)
}

impl KeyboardHints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one scored row in. A letter only ever moves up
    /// absent -> misplaced -> correct.
    pub fn merge(&mut self, guess: &Word, verdicts: &Verdicts) {
        for (letter, verdict) in guess.chars().zip(verdicts.iter().copied()) {
            if let Some(i) = slot(letter) {
                self.letters[i] = Some(self.letters[i].map_or(verdict, |known| known.max(verdict)));
            }
        }
    }

    /// Recomputes hints from scratch over a sequence of scored rows.
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (&'a Word, &'a Verdicts)>,
    {
        let mut hints = Self::new();
        for (guess, verdicts) in rows {
            hints.merge(guess, verdicts);
        }
        hints
    }

    pub fn get(&self, letter: char) -> Option<Verdict> {
        slot(letter).and_then(|i| self.letters[i])
    }

    /// True when every appearance of `letter` so far scored absent.
    pub fn is_ruled_out(&self, letter: char) -> bool {
        self.get(letter) == Some(Verdict::Absent)
    }

    pub fn clear(&mut self) {
        self.letters = [None; ALPHABET_LEN];
    }

    pub fn is_empty(&self) -> bool {
        self.letters.iter().all(Option::is_none)
    }

    /// All 26 letters A..=Z with their current verdict.
    pub fn iter(&self) -> impl Iterator<Item = (char, Option<Verdict>)> + '_ {
        ('A'..='Z').zip(self.letters.iter().copied())
    }
}
