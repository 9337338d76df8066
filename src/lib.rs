// Game engine shared by the TUI binary and the integration tests.
// Rendering and key bindings stay in main.rs/ui.rs.
pub mod app_dirs;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod evaluator;
pub mod grid;
pub mod keyboard;
pub mod runtime;
pub mod session;
pub mod stats;

pub use dictionary::{Dictionary, Word, WORD_LENGTH};
pub use error::{GameError, StoreError};
pub use evaluator::{evaluate, Verdict};
pub use grid::{Cell, CellState, Grid, MAX_ATTEMPTS};
pub use keyboard::KeyboardHints;
pub use session::{GameMode, LossReason, Session, SessionBuilder, Status};
pub use stats::{GameRecorder, SharedLedger, StatsLedger};
