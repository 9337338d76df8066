use crate::dictionary::{Word, WORD_LENGTH};
use crate::evaluator::{Verdict, Verdicts};

/// Number of guesses allowed per game.
pub const MAX_ATTEMPTS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellState {
    #[default]
    Empty,
    Filled,
    Correct,
    Misplaced,
    Absent,
}

impl CellState {
    pub fn is_resolved(self) -> bool {
        !matches!(self, CellState::Empty | CellState::Filled)
    }
}

impl From<Verdict> for CellState {
    fn from(v: Verdict) -> Self {
        match v {
            Verdict::Correct => CellState::Correct,
            Verdict::Misplaced => CellState::Misplaced,
            Verdict::Absent => CellState::Absent,
        }
    }
}

/// One grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub letter: Option<char>,
    pub state: CellState,
}

/// The 6x5 board of attempts, row-major. Only the session mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grid {
    rows: [[Cell; WORD_LENGTH]; MAX_ATTEMPTS],
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn row(&self, row: usize) -> Option<&[Cell; WORD_LENGTH]> {
        self.rows.get(row)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell; WORD_LENGTH]> {
        self.rows.iter()
    }

    pub fn is_row_resolved(&self, row: usize) -> bool {
        self.row(row)
            .is_some_and(|cells| cells.iter().all(|c| c.state.is_resolved()))
    }

    pub(crate) fn fill(&mut self, row: usize, col: usize, letter: char) {
        self.rows[row][col] = Cell {
            letter: Some(letter),
            state: CellState::Filled,
        };
    }

    pub(crate) fn clear(&mut self, row: usize, col: usize) {
        self.rows[row][col] = Cell::default();
    }

    /// The typed word in `row`, if all five cells hold a letter.
    pub(crate) fn word(&self, row: usize) -> Option<Word> {
        let cells = self.rows.get(row)?;
        let mut letters = [0u8; WORD_LENGTH];
        for (slot, cell) in letters.iter_mut().zip(cells.iter()) {
            *slot = cell.letter? as u8;
        }
        Some(Word::from_letters(letters))
    }

    pub(crate) fn resolve(&mut self, row: usize, verdicts: &Verdicts) {
        for (cell, verdict) in self.rows[row].iter_mut().zip(verdicts.iter()) {
            cell.state = (*verdict).into();
        }
    }
}
