use std::rc::Rc;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::dictionary::{Dictionary, Word, WORD_LENGTH};
use crate::error::GameError;
use crate::evaluator::score;
use crate::grid::{Grid, MAX_ATTEMPTS};
use crate::keyboard::KeyboardHints;
use crate::runtime::Timer;
use crate::stats::GameRecorder;

pub const DEFAULT_TIME_LIMIT_SECS: u32 = 60;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// No timer, one target for the whole game
    #[default]
    Classic,
    /// Countdown; running out of time loses the game
    Timed,
    /// The target is replaced after every second attempt
    Mosaic,
}

impl GameMode {
    pub fn next(self) -> Self {
        match self {
            GameMode::Classic => GameMode::Timed,
            GameMode::Timed => GameMode::Mosaic,
            GameMode::Mosaic => GameMode::Classic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossReason {
    OutOfAttempts,
    TimeUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Active,
    Won,
    Lost(LossReason),
}

/// Options applied when a session is created.
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    dictionary: Rc<Dictionary>,
    time_limit_secs: u32,
    seed: Option<u64>,
}

impl SessionBuilder {
    pub fn new(dictionary: Rc<Dictionary>) -> Self {
        Self {
            dictionary,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            seed: None,
        }
    }

    /// Countdown length for timed games. Clamped to at least one second.
    pub fn time_limit(mut self, secs: u32) -> Self {
        self.time_limit_secs = secs.max(1);
        self
    }

    /// Makes word draws reproducible.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn start<R: GameRecorder>(
        self,
        mode: GameMode,
        recorder: R,
        timer: Box<dyn Timer>,
    ) -> Result<Session<R>, GameError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let target = self
            .dictionary
            .random_word(&mut rng)
            .ok_or(GameError::EmptyDictionary)?;

        let mut session = Session {
            grid: Grid::new(),
            current_row: 0,
            current_col: 0,
            target,
            mode,
            status: Status::Active,
            time_limit: self.time_limit_secs,
            time_remaining: self.time_limit_secs,
            attempts: 0,
            keyboard: KeyboardHints::new(),
            swaps: 0,
            dictionary: self.dictionary,
            recorder,
            timer,
            rng,
        };
        session.begin(mode, target);
        Ok(session)
    }
}

/// One game from first letter to win, loss or timeout.
///
/// Every input is a silent no-op when its precondition does not hold, and nothing
/// mutates the session once it is over. The recorder hears about each game exactly once.
pub struct Session<R: GameRecorder> {
    grid: Grid,
    current_row: usize,
    current_col: usize,
    target: Word,
    mode: GameMode,
    status: Status,
    time_limit: u32,
    time_remaining: u32,
    attempts: u32,
    keyboard: KeyboardHints,
    swaps: u32,
    dictionary: Rc<Dictionary>,
    recorder: R,
    timer: Box<dyn Timer>,
    rng: StdRng,
}

impl<R: GameRecorder> Session<R> {
    pub fn new(
        mode: GameMode,
        dictionary: Rc<Dictionary>,
        recorder: R,
        timer: Box<dyn Timer>,
    ) -> Result<Self, GameError> {
        SessionBuilder::new(dictionary).start(mode, recorder, timer)
    }

    /// Abandons whatever is in progress and begins a fresh game with a new target.
    pub fn start(&mut self, mode: GameMode) -> Result<(), GameError> {
        let target = self
            .dictionary
            .random_word(&mut self.rng)
            .ok_or(GameError::EmptyDictionary)?;
        self.begin(mode, target);
        Ok(())
    }

    fn begin(&mut self, mode: GameMode, target: Word) {
        self.timer.stop();

        self.grid = Grid::new();
        self.current_row = 0;
        self.current_col = 0;
        self.target = target;
        self.mode = mode;
        self.status = Status::Active;
        self.time_remaining = self.time_limit;
        self.attempts = 0;
        self.keyboard.clear();
        self.swaps = 0;

        if mode == GameMode::Timed {
            self.timer.start();
        }
        debug!(
            "started {mode} game from {} ({} words)",
            self.dictionary.name(),
            self.dictionary.len()
        );
    }

    pub fn add_letter(&mut self, letter: char) {
        if self.is_over() || self.current_col >= WORD_LENGTH || !letter.is_ascii_alphabetic() {
            return;
        }
        self.grid
            .fill(self.current_row, self.current_col, letter.to_ascii_uppercase());
        self.current_col += 1;
    }

    pub fn delete_letter(&mut self) {
        if self.is_over() || self.current_col == 0 {
            return;
        }
        self.current_col -= 1;
        self.grid.clear(self.current_row, self.current_col);
    }

    pub fn submit(&mut self) {
        if self.is_over() || self.current_col < WORD_LENGTH {
            return;
        }
        let Some(guess) = self.grid.word(self.current_row) else {
            return;
        };

        let verdicts = score(&guess, &self.target);
        self.grid.resolve(self.current_row, &verdicts);
        self.keyboard.merge(&guess, &verdicts);
        self.attempts += 1;

        if guess == self.target {
            self.finish(Status::Won);
        } else if self.current_row == MAX_ATTEMPTS - 1 {
            self.finish(Status::Lost(LossReason::OutOfAttempts));
        } else {
            self.current_row += 1;
            self.current_col = 0;
            if self.mode == GameMode::Mosaic && self.attempts % 2 == 0 {
                self.swap_target();
            }
        }
    }

    /// One countdown second. Ignored unless a timed game is running.
    pub fn on_timer_tick(&mut self) {
        if self.is_over() || self.mode != GameMode::Timed || !self.timer.is_running() {
            return;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.finish(Status::Lost(LossReason::TimeUp));
        }
    }

    /// Stops the countdown without ending the game, e.g. when the front-end shuts down.
    pub fn suspend_timer(&mut self) {
        self.timer.stop();
    }

    fn swap_target(&mut self) {
        if let Some(next) = self.dictionary.random_word_except(&mut self.rng, &self.target) {
            self.target = next;
        }
        // Hints about the old target say nothing about the new one.
        self.keyboard.clear();
        self.swaps += 1;
        debug!("mosaic swap #{} after attempt {}", self.swaps, self.attempts);
    }

    fn finish(&mut self, status: Status) {
        self.status = status;
        self.timer.stop();
        match status {
            Status::Won => self.recorder.record_win(),
            Status::Lost(_) => self.recorder.record_loss(),
            Status::Active => {}
        }
        info!(
            "{} game over: {status:?} after {} attempts",
            self.mode, self.attempts
        );
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn current_row(&self) -> usize {
        self.current_row
    }

    pub fn current_col(&self) -> usize {
        self.current_col
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status != Status::Active
    }

    pub fn has_won(&self) -> bool {
        self.status == Status::Won
    }

    pub fn loss_reason(&self) -> Option<LossReason> {
        match self.status {
            Status::Lost(reason) => Some(reason),
            _ => None,
        }
    }

    /// Seconds left, only in timed mode.
    pub fn time_remaining(&self) -> Option<u32> {
        (self.mode == GameMode::Timed).then_some(self.time_remaining)
    }

    pub fn time_limit(&self) -> u32 {
        self.time_limit
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn keyboard(&self) -> &KeyboardHints {
        &self.keyboard
    }

    /// Letters every guess so far has shown to be absent.
    pub fn is_ruled_out(&self, letter: char) -> bool {
        self.keyboard.is_ruled_out(letter)
    }

    /// Number of mosaic target swaps so far in this game.
    pub fn swaps(&self) -> u32 {
        self.swaps
    }

    /// The target, shown only once the game has been lost.
    pub fn revealed_target(&self) -> Option<Word> {
        matches!(self.status, Status::Lost(_)).then_some(self.target)
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    #[cfg(test)]
    fn target(&self) -> Word {
        self.target
    }
}
