use std::rc::Rc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use assert_matches::assert_matches;
use cipherword::runtime::{
    FixedTicker, GameEvent, ManualTimer, Runner, SecondTimer, TestEventSource, TickGate,
};
use cipherword::stats::MemoryLedgerStore;
use cipherword::{
    Dictionary, GameMode, LossReason, Session, SessionBuilder, SharedLedger, StatsLedger, Status,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

fn dictionary() -> Rc<Dictionary> {
    Rc::new(Dictionary::from_words("test", ["water"]).unwrap())
}

fn ledger() -> SharedLedger {
    StatsLedger::load(Box::new(MemoryLedgerStore::new())).shared()
}

fn send_key(tx: &mpsc::Sender<GameEvent>, code: KeyCode) {
    tx.send(GameEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
        .unwrap();
}

/// Minimal stand-in for the binary's loop: keys edit the board, gated ticks drive the clock.
fn pump(
    runner: &Runner<TestEventSource, FixedTicker>,
    session: &mut Session<SharedLedger>,
    gate: &TickGate,
) {
    for _ in 0..1000u32 {
        match runner.step() {
            GameEvent::Key(key) => match key.code {
                KeyCode::Char(c) => session.add_letter(c),
                KeyCode::Backspace => session.delete_letter(),
                KeyCode::Enter => session.submit(),
                _ => {}
            },
            GameEvent::Tick(subscription) => {
                if gate.is_current(subscription) {
                    session.on_timer_tick();
                }
            }
            GameEvent::Resize => {}
            GameEvent::Idle => break,
        }
        if session.is_over() {
            break;
        }
    }
}

// Headless classic game driven entirely through the Runner/TestEventSource channel.
#[test]
fn headless_classic_game_is_won_from_key_events() {
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(20)),
    );
    let ledger = ledger();
    let mut session = SessionBuilder::new(dictionary())
        .start(GameMode::Classic, ledger.clone(), Box::new(ManualTimer::new()))
        .unwrap();

    for c in "lowxr".chars() {
        send_key(&tx, KeyCode::Char(c));
    }
    send_key(&tx, KeyCode::Backspace);
    send_key(&tx, KeyCode::Backspace);
    send_key(&tx, KeyCode::Char('e'));
    send_key(&tx, KeyCode::Char('r'));
    send_key(&tx, KeyCode::Enter);
    for c in "water".chars() {
        send_key(&tx, KeyCode::Char(c));
    }
    send_key(&tx, KeyCode::Enter);

    pump(&runner, &mut session, &TickGate::default());

    assert_eq!(session.status(), Status::Won);
    assert_eq!(session.attempts(), 2);
    let first_row: String = session
        .grid()
        .row(0)
        .unwrap()
        .iter()
        .filter_map(|cell| cell.letter)
        .collect();
    assert_eq!(first_row, "LOWER");
    assert_eq!(ledger.borrow().wins(), 1);
}

// A real SecondTimer on a short interval runs a timed game out.
#[test]
fn headless_timed_game_runs_out_of_time() {
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(500)),
    );
    let timer = SecondTimer::with_interval(tx.clone(), Duration::from_millis(5));
    let gate = timer.gate();
    let ledger = ledger();
    let mut session = SessionBuilder::new(dictionary())
        .time_limit(3)
        .start(GameMode::Timed, ledger.clone(), Box::new(timer))
        .unwrap();

    pump(&runner, &mut session, &gate);

    assert_matches!(session.status(), Status::Lost(LossReason::TimeUp));
    assert_eq!(session.time_remaining(), Some(0));
    assert_eq!(
        session.revealed_target().map(|w| w.to_string()),
        Some("WATER".to_string())
    );
    assert_eq!(ledger.borrow().losses(), 1);
    assert_eq!(ledger.borrow().total_games(), 1);
}

// Ticks already queued when the game is restarted must not touch the new game.
#[test]
fn headless_restart_drops_queued_ticks() {
    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(20)),
    );
    let timer = SecondTimer::with_interval(tx.clone(), Duration::from_millis(5));
    let gate = timer.gate();
    let ledger = ledger();
    let mut session = SessionBuilder::new(dictionary())
        .time_limit(60)
        .start(GameMode::Timed, ledger.clone(), Box::new(timer))
        .unwrap();

    // let the worker queue a few ticks for the first subscription
    thread::sleep(Duration::from_millis(40));
    session.start(GameMode::Classic).unwrap();

    pump(&runner, &mut session, &gate);

    assert_eq!(session.mode(), GameMode::Classic);
    assert_eq!(session.status(), Status::Active);
    assert_eq!(session.time_remaining(), None);
    assert_eq!(ledger.borrow().total_games(), 0);
}
