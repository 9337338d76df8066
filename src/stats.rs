use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::warn;
use rusqlite::{params, Connection, OptionalExtension};

use crate::app_dirs::AppDirs;
use crate::error::StoreError;

const KEY_NICKNAME: &str = "nickname";
const KEY_GAMES_PLAYED: &str = "gamesPlayed";
const KEY_WINS: &str = "wins";
const KEY_LOSSES: &str = "losses";

/// The persisted fields of the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerRecord {
    pub nickname: String,
    pub total_games: u64,
    pub wins: u64,
    pub losses: u64,
}

/// Where a ledger record lives between runs.
pub trait LedgerStore {
    fn load(&self) -> Result<LedgerRecord, StoreError>;
    /// Persists all four fields together.
    fn save(&mut self, record: &LedgerRecord) -> Result<(), StoreError>;
}

/// SQLite-backed key/value store for the ledger.
#[derive(Debug)]
pub struct SqliteLedgerStore {
    conn: Connection,
}

impl SqliteLedgerStore {
    /// Open (or create) the store at the default state path.
    pub fn open_default() -> Result<Self, StoreError> {
        let db_path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("cipherword_stats.db"));
        Self::open(db_path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS ledger (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
            [],
        )?;
        Ok(Self { conn })
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM ledger WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn get_count(&self, key: &'static str) -> Result<u64, StoreError> {
        match self.get(key)? {
            None => Ok(0),
            Some(value) => value
                .parse()
                .map_err(|_| StoreError::Corrupt { key, value }),
        }
    }
}

impl LedgerStore for SqliteLedgerStore {
    fn load(&self) -> Result<LedgerRecord, StoreError> {
        Ok(LedgerRecord {
            nickname: self.get(KEY_NICKNAME)?.unwrap_or_default(),
            total_games: self.get_count(KEY_GAMES_PLAYED)?,
            wins: self.get_count(KEY_WINS)?,
            losses: self.get_count(KEY_LOSSES)?,
        })
    }

    fn save(&mut self, record: &LedgerRecord) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let entries = [
            (KEY_NICKNAME, record.nickname.clone()),
            (KEY_GAMES_PLAYED, record.total_games.to_string()),
            (KEY_WINS, record.wins.to_string()),
            (KEY_LOSSES, record.losses.to_string()),
        ];
        for (key, value) in entries {
            tx.execute(
                "INSERT OR REPLACE INTO ledger (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// In-process store. Clones share the same record, so tests can inspect what was saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerStore {
    record: Rc<RefCell<LedgerRecord>>,
    saves: Rc<RefCell<u32>>,
    reject_writes: bool,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: LedgerRecord) -> Self {
        Self {
            record: Rc::new(RefCell::new(record)),
            ..Self::default()
        }
    }

    /// A store whose every save fails.
    pub fn rejecting() -> Self {
        Self {
            reject_writes: true,
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> LedgerRecord {
        self.record.borrow().clone()
    }

    pub fn save_count(&self) -> u32 {
        *self.saves.borrow()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self) -> Result<LedgerRecord, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&mut self, record: &LedgerRecord) -> Result<(), StoreError> {
        if self.reject_writes {
            return Err(StoreError::Unavailable);
        }
        *self.record.borrow_mut() = record.clone();
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

/// Receives the single outcome of each finished game.
pub trait GameRecorder {
    fn record_win(&mut self);
    fn record_loss(&mut self);
}

/// Win/loss counters that survive restarts.
///
/// Loaded once from its store, then written through after every mutation. The in-memory
/// record is authoritative: a failed write is logged and never rolled back.
pub struct StatsLedger {
    record: LedgerRecord,
    store: Box<dyn LedgerStore>,
}

/// Ledger handle shared by the session and the stats screen.
pub type SharedLedger = Rc<RefCell<StatsLedger>>;

impl StatsLedger {
    pub fn load(store: Box<dyn LedgerStore>) -> Self {
        let record = store.load().unwrap_or_else(|e| {
            warn!("unable to load stats, starting from zero: {e}");
            LedgerRecord::default()
        });
        Self { record, store }
    }

    /// Opens the on-disk ledger, falling back to an in-memory one when the state
    /// directory is unusable.
    pub fn open_default() -> Self {
        match SqliteLedgerStore::open_default() {
            Ok(store) => Self::load(Box::new(store)),
            Err(e) => {
                warn!("stats database unavailable, stats will not persist: {e}");
                Self::load(Box::new(MemoryLedgerStore::new()))
            }
        }
    }

    pub fn shared(self) -> SharedLedger {
        Rc::new(RefCell::new(self))
    }

    pub fn record(&self) -> &LedgerRecord {
        &self.record
    }

    pub fn nickname(&self) -> &str {
        &self.record.nickname
    }

    pub fn total_games(&self) -> u64 {
        self.record.total_games
    }

    pub fn wins(&self) -> u64 {
        self.record.wins
    }

    pub fn losses(&self) -> u64 {
        self.record.losses
    }

    pub fn win_percentage(&self) -> f64 {
        win_percentage(self.record.wins, self.record.total_games)
    }

    pub fn set_nickname(&mut self, nickname: impl Into<String>) {
        self.record.nickname = nickname.into();
        self.persist();
    }

    pub fn record_win(&mut self) {
        self.record.total_games += 1;
        self.record.wins += 1;
        self.persist();
    }

    pub fn record_loss(&mut self) {
        self.record.total_games += 1;
        self.record.losses += 1;
        self.persist();
    }

    /// Zeroes every counter and clears the nickname.
    pub fn reset_stats(&mut self) {
        self.record = LedgerRecord::default();
        self.persist();
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.record) {
            warn!("failed to persist stats: {e}");
        }
    }
}

impl GameRecorder for StatsLedger {
    fn record_win(&mut self) {
        StatsLedger::record_win(self);
    }

    fn record_loss(&mut self) {
        StatsLedger::record_loss(self);
    }
}

impl<R: GameRecorder + ?Sized> GameRecorder for Rc<RefCell<R>> {
    fn record_win(&mut self) {
        self.borrow_mut().record_win();
    }

    fn record_loss(&mut self) {
        self.borrow_mut().record_loss();
    }
}

/// `wins / total * 100`, or 0 when no games were played.
pub fn win_percentage(wins: u64, total_games: u64) -> f64 {
    if total_games == 0 {
        return 0.0;
    }
    (wins as f64 / total_games as f64) * 100.0
}
