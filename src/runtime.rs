use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Resize,
    /// One countdown second elapsed for the given timer subscription.
    Tick(u64),
    /// Nothing arrived within the redraw interval.
    Idle,
}

/// Source of game events (keyboard, resize, countdown ticks)
pub trait EventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// Production event source using crossterm.
///
/// Timer ticks are posted onto the same channel through [`CrosstermEventSource::sender`],
/// so key input and countdown ticks reach the session strictly one at a time.
pub struct CrosstermEventSource {
    tx: Sender<GameEvent>,
    rx: Receiver<GameEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let key_tx = tx.clone();

        thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if key_tx.send(GameEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if key_tx.send(GameEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<GameEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<GameEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: EventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: EventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to the redraw interval and returns the next event, or Idle on timeout
    pub fn step(&self) -> GameEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => GameEvent::Idle,
        }
    }

    pub fn event_source(&self) -> &E {
        &self.event_source
    }
}

/// Countdown driver owned by a session.
///
/// After `stop` returns, no tick from the stopped subscription may be acted on.
pub trait Timer {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// Shared view of the current timer subscription, used to drop stale ticks.
#[derive(Clone, Debug, Default)]
pub struct TickGate {
    current: Arc<AtomicU64>,
}

impl TickGate {
    pub fn is_current(&self, subscription: u64) -> bool {
        subscription != 0 && self.current.load(Ordering::SeqCst) == subscription
    }
}

/// Posts `GameEvent::Tick` onto an event channel once per interval from a worker thread.
pub struct SecondTimer {
    tx: Sender<GameEvent>,
    interval: Duration,
    gate: TickGate,
    next_subscription: u64,
    cancel: Option<Arc<AtomicBool>>,
}

impl SecondTimer {
    pub fn new(tx: Sender<GameEvent>) -> Self {
        Self::with_interval(tx, Duration::from_secs(1))
    }

    pub fn with_interval(tx: Sender<GameEvent>, interval: Duration) -> Self {
        Self {
            tx,
            interval,
            gate: TickGate::default(),
            next_subscription: 0,
            cancel: None,
        }
    }

    pub fn gate(&self) -> TickGate {
        self.gate.clone()
    }
}

impl Timer for SecondTimer {
    fn start(&mut self) {
        self.stop();

        self.next_subscription += 1;
        let subscription = self.next_subscription;
        self.gate.current.store(subscription, Ordering::SeqCst);

        let cancel = Arc::new(AtomicBool::new(false));
        self.cancel = Some(cancel.clone());
        let tx = self.tx.clone();
        let interval = self.interval;

        thread::spawn(move || loop {
            thread::sleep(interval);
            if cancel.load(Ordering::SeqCst) {
                break;
            }
            if tx.send(GameEvent::Tick(subscription)).is_err() {
                break;
            }
        });
    }

    fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.store(true, Ordering::SeqCst);
        }
        // Ticks already queued on the channel now fail the gate check.
        self.gate.current.store(0, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.cancel.is_some()
    }
}

impl Drop for SecondTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Timer that records calls instead of spawning threads. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct ManualTimer {
    running: Rc<Cell<bool>>,
    starts: Rc<Cell<u32>>,
    stops: Rc<Cell<u32>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starts(&self) -> u32 {
        self.starts.get()
    }

    pub fn stops(&self) -> u32 {
        self.stops.get()
    }
}

impl Timer for ManualTimer {
    fn start(&mut self) {
        self.running.set(true);
        self.starts.set(self.starts.get() + 1);
    }

    fn stop(&mut self) {
        self.running.set(false);
        self.stops.set(self.stops.get() + 1);
    }

    fn is_running(&self) -> bool {
        self.running.get()
    }
}
