mod ui;

use cipherword::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{
        CrosstermEventSource, EventSource, FixedTicker, GameEvent, Runner, SecondTimer, TickGate,
        Ticker,
    },
    Dictionary, GameError, GameMode, Session, SessionBuilder, SharedLedger, StatsLedger,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{debug, warn};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    rc::Rc,
    time::Duration,
};

const REDRAW_INTERVAL_MS: u64 = 250;
const MAX_NICKNAME_LEN: usize = 20;

/// five letters, six attempts, three ways to play
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal word-guessing game: find the hidden five-letter word in six attempts. Play classic, race a countdown in timed mode, or chase a target that changes every second attempt in mosaic mode."
)]
pub struct Cli {
    /// game mode to start in (defaults to the last mode played)
    #[clap(short = 'm', long, value_enum)]
    mode: Option<GameMode>,

    /// number of seconds on the clock in timed mode
    #[clap(short = 't', long)]
    time_limit: Option<u32>,

    /// bundled word list to draw targets from
    #[clap(short = 'w', long)]
    word_list: Option<String>,

    /// set the nickname shown on the stats screen
    #[clap(long)]
    nickname: Option<String>,

    /// print stats and exit
    #[clap(long)]
    stats: bool,

    /// clear stats and nickname, then exit
    #[clap(long)]
    reset_stats: bool,
}

impl Cli {
    /// Layer the command line over the stored config
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(secs) = self.time_limit {
            config.time_limit_secs = secs.max(1);
        }
        if let Some(word_list) = &self.word_list {
            config.word_list = word_list.clone();
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Playing,
    Results,
    Stats,
}

#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub session: Session<SharedLedger>,
    pub ledger: SharedLedger,
    pub state: AppState,
    pub confirm_reset: bool,
    pub nickname_draft: Option<String>,
}

impl App {
    pub fn new(session: Session<SharedLedger>, ledger: SharedLedger) -> Self {
        let state = if session.is_over() {
            AppState::Results
        } else {
            AppState::Playing
        };
        Self {
            session,
            ledger,
            state,
            confirm_reset: false,
            nickname_draft: None,
        }
    }

    pub fn new_game(&mut self, mode: GameMode) -> Result<(), GameError> {
        self.session.start(mode)?;
        self.state = AppState::Playing;
        self.confirm_reset = false;
        self.nickname_draft = None;
        Ok(())
    }

    pub fn handle_tick(&mut self) {
        self.session.on_timer_tick();
        self.sync_state();
    }

    fn sync_state(&mut self) {
        if self.state == AppState::Playing && self.session.is_over() {
            self.state = AppState::Results;
        }
    }

    fn leave_stats(&mut self) {
        self.state = if self.session.is_over() {
            AppState::Results
        } else {
            AppState::Playing
        };
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<Flow, GameError> {
        if key.kind != KeyEventKind::Press {
            return Ok(Flow::Continue);
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Ok(Flow::Quit);
        }
        if self.nickname_draft.is_some() {
            self.edit_nickname(key);
            return Ok(Flow::Continue);
        }
        if key.code == KeyCode::Esc {
            return Ok(Flow::Quit);
        }

        match self.state {
            AppState::Playing => {
                match key.code {
                    KeyCode::Char(c) => self.session.add_letter(c),
                    KeyCode::Backspace => self.session.delete_letter(),
                    KeyCode::Enter => self.session.submit(),
                    KeyCode::Tab => self.new_game(self.session.mode().next())?,
                    _ => {}
                }
                self.sync_state();
            }
            AppState::Results => match key.code {
                KeyCode::Char('n') | KeyCode::Enter => self.new_game(self.session.mode())?,
                KeyCode::Char('m') | KeyCode::Tab => self.new_game(self.session.mode().next())?,
                KeyCode::Char('s') => self.state = AppState::Stats,
                KeyCode::Char('q') => return Ok(Flow::Quit),
                _ => {}
            },
            AppState::Stats => {
                if self.confirm_reset {
                    if key.code == KeyCode::Char('y') {
                        self.ledger.borrow_mut().reset_stats();
                    }
                    self.confirm_reset = false;
                    return Ok(Flow::Continue);
                }
                match key.code {
                    KeyCode::Char('r') => self.confirm_reset = true,
                    KeyCode::Char('e') => {
                        self.nickname_draft = Some(self.ledger.borrow().nickname().to_string())
                    }
                    KeyCode::Char('n') => self.new_game(self.session.mode())?,
                    KeyCode::Char('b') | KeyCode::Backspace => self.leave_stats(),
                    _ => {}
                }
            }
        }

        Ok(Flow::Continue)
    }

    fn edit_nickname(&mut self, key: KeyEvent) {
        let Some(draft) = self.nickname_draft.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Char(c) if !c.is_control() && draft.chars().count() < MAX_NICKNAME_LEN => {
                draft.push(c)
            }
            KeyCode::Backspace => {
                draft.pop();
            }
            KeyCode::Enter => {
                let nickname = draft.trim().to_string();
                self.ledger.borrow_mut().set_nickname(nickname);
                self.nickname_draft = None;
            }
            KeyCode::Esc => self.nickname_draft = None,
            _ => {}
        }
    }
}

fn stats_report(ledger: &StatsLedger) -> String {
    let nickname = if ledger.nickname().is_empty() {
        "-"
    } else {
        ledger.nickname()
    };
    format!(
        "Nickname:       {}\nGames Played:   {}\nWins:           {}\nLosses:         {}\nWin Percentage: {:.1}%\n",
        nickname,
        ledger.total_games(),
        ledger.wins(),
        ledger.losses(),
        ledger.win_percentage()
    )
}

/// Send log output to a file so it never lands on the TUI's terminal
fn init_logging() {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging();

    let config_store = FileConfigStore::new();
    let config = cli.apply_to(config_store.load());
    let ledger = StatsLedger::open_default().shared();

    if let Some(nickname) = &cli.nickname {
        ledger.borrow_mut().set_nickname(nickname.trim());
    }
    if cli.reset_stats {
        ledger.borrow_mut().reset_stats();
        println!("Statistics and nickname cleared.");
        return Ok(());
    }
    if cli.stats {
        print!("{}", stats_report(&ledger.borrow()));
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let dictionary = match Dictionary::embedded(&config.word_list) {
        Ok(dictionary) => Rc::new(dictionary),
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, e.to_string()).exit();
        }
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    let timer = SecondTimer::new(events.sender());
    let gate = timer.gate();
    let session = SessionBuilder::new(dictionary)
        .time_limit(config.time_limit_secs)
        .start(config.mode, ledger.clone(), Box::new(timer))?;
    let mut app = App::new(session, ledger);
    let runner = Runner::new(
        events,
        FixedTicker::new(Duration::from_millis(REDRAW_INTERVAL_MS)),
    );

    let result = start_tui(&mut terminal, &mut app, &runner, &gate);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    let config = Config {
        mode: app.session.mode(),
        ..config
    };
    if let Err(e) = config_store.save(&config) {
        warn!(
            "could not save config to {}: {e}",
            config_store.path().display()
        );
    }

    result
}

fn start_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
    gate: &TickGate,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.step() {
            GameEvent::Key(key) => {
                if app.handle_key(key)? == Flow::Quit {
                    break;
                }
            }
            GameEvent::Tick(subscription) => {
                if gate.is_current(subscription) {
                    app.handle_tick();
                } else {
                    debug!("dropping stale tick from subscription {subscription}");
                }
            }
            GameEvent::Resize | GameEvent::Idle => {}
        }
    }

    app.session.suspend_timer();
    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    let screen = ui::screen::current_screen(&app.state);
    screen.render(app, f);
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use cipherword::{
        runtime::{ManualTimer, TestEventSource, Timer},
        stats::MemoryLedgerStore,
        LossReason, Status,
    };
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;

    fn test_app(mode: GameMode) -> (App, ManualTimer) {
        let dictionary = Rc::new(Dictionary::from_words("test", ["water"]).unwrap());
        let ledger = StatsLedger::load(Box::new(MemoryLedgerStore::new())).shared();
        let timer = ManualTimer::new();
        let session = SessionBuilder::new(dictionary)
            .time_limit(3)
            .seed(7)
            .start(mode, ledger.clone(), Box::new(timer.clone()))
            .unwrap();
        (App::new(session, ledger), timer)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_word(app: &mut App, word: &str) {
        for c in word.chars() {
            app.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        app.handle_key(key(KeyCode::Enter)).unwrap();
    }

    fn render(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| ui(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["cipherword"]);

        assert_eq!(cli.mode, None);
        assert_eq!(cli.time_limit, None);
        assert_eq!(cli.word_list, None);
        assert_eq!(cli.nickname, None);
        assert!(!cli.stats);
        assert!(!cli.reset_stats);
    }

    #[test]
    fn test_cli_mode() {
        let cli = Cli::parse_from(["cipherword", "-m", "timed"]);
        assert_eq!(cli.mode, Some(GameMode::Timed));

        let cli = Cli::parse_from(["cipherword", "--mode", "mosaic"]);
        assert_eq!(cli.mode, Some(GameMode::Mosaic));

        assert!(Cli::try_parse_from(["cipherword", "--mode", "blitz"]).is_err());
    }

    #[test]
    fn test_cli_time_limit_and_word_list() {
        let cli = Cli::parse_from(["cipherword", "-t", "90", "-w", "english"]);
        assert_eq!(cli.time_limit, Some(90));
        assert_eq!(cli.word_list, Some("english".to_string()));

        assert!(Cli::try_parse_from(["cipherword", "--time-limit", "-5"]).is_err());
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["cipherword", "--stats", "--nickname", "ada"]);
        assert!(cli.stats);
        assert_eq!(cli.nickname, Some("ada".to_string()));

        let cli = Cli::parse_from(["cipherword", "--reset-stats"]);
        assert!(cli.reset_stats);
    }

    #[test]
    fn test_cli_overrides_config() {
        let stored = Config {
            mode: GameMode::Mosaic,
            time_limit_secs: 45,
            word_list: "english".to_string(),
        };

        let untouched = Cli::parse_from(["cipherword"]).apply_to(stored.clone());
        assert_eq!(untouched, stored);

        let merged = Cli::parse_from(["cipherword", "-m", "timed", "-t", "0"]).apply_to(stored);
        assert_eq!(merged.mode, GameMode::Timed);
        assert_eq!(merged.time_limit_secs, 1);
        assert_eq!(merged.word_list, "english");
    }

    #[test]
    fn test_app_win_moves_to_results() {
        let (mut app, _) = test_app(GameMode::Classic);
        assert_eq!(app.state, AppState::Playing);

        type_word(&mut app, "lower");
        assert_eq!(app.state, AppState::Playing);
        assert_eq!(app.session.current_row(), 1);

        type_word(&mut app, "water");
        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.session.status(), Status::Won);
        assert_eq!(app.ledger.borrow().wins(), 1);
        assert_eq!(app.ledger.borrow().total_games(), 1);
    }

    #[test]
    fn test_app_filters_and_edits_input() {
        let (mut app, _) = test_app(GameMode::Classic);

        app.handle_key(key(KeyCode::Char('w'))).unwrap();
        app.handle_key(key(KeyCode::Char('1'))).unwrap();
        app.handle_key(key(KeyCode::Char('é'))).unwrap();
        assert_eq!(app.session.current_col(), 1);

        app.handle_key(key(KeyCode::Backspace)).unwrap();
        assert_eq!(app.session.current_col(), 0);

        // an incomplete row is not submitted
        app.handle_key(key(KeyCode::Char('a'))).unwrap();
        app.handle_key(key(KeyCode::Enter)).unwrap();
        assert_eq!(app.session.current_row(), 0);
        assert_eq!(app.session.attempts(), 0);
    }

    #[test]
    fn test_app_timed_loss_from_ticks() {
        let (mut app, timer) = test_app(GameMode::Timed);
        assert_eq!(timer.starts(), 1);
        assert_eq!(app.session.time_remaining(), Some(3));

        app.handle_tick();
        app.handle_tick();
        assert_eq!(app.state, AppState::Playing);
        app.handle_tick();

        assert_eq!(app.state, AppState::Results);
        assert_matches!(app.session.status(), Status::Lost(LossReason::TimeUp));
        assert_eq!(app.ledger.borrow().losses(), 1);

        // further ticks change nothing
        app.handle_tick();
        assert_eq!(app.ledger.borrow().total_games(), 1);
    }

    #[test]
    fn test_app_tab_cycles_mode_without_recording() {
        let (mut app, timer) = test_app(GameMode::Classic);
        type_word(&mut app, "lower");

        app.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(app.session.mode(), GameMode::Timed);
        assert_eq!(app.session.current_row(), 0);
        assert_eq!(timer.starts(), 1);

        app.handle_key(key(KeyCode::Tab)).unwrap();
        assert_eq!(app.session.mode(), GameMode::Mosaic);
        assert!(!timer.is_running());
        assert_eq!(app.ledger.borrow().total_games(), 0);
    }

    #[test]
    fn test_app_results_navigation() {
        let (mut app, _) = test_app(GameMode::Classic);
        type_word(&mut app, "water");
        assert_eq!(app.state, AppState::Results);

        app.handle_key(key(KeyCode::Char('s'))).unwrap();
        assert_eq!(app.state, AppState::Stats);

        app.handle_key(key(KeyCode::Char('b'))).unwrap();
        assert_eq!(app.state, AppState::Results);

        app.handle_key(key(KeyCode::Char('m'))).unwrap();
        assert_eq!(app.state, AppState::Playing);
        assert_eq!(app.session.mode(), GameMode::Timed);

        assert_eq!(app.handle_key(key(KeyCode::Esc)).unwrap(), Flow::Quit);
    }

    #[test]
    fn test_app_reset_requires_confirmation() {
        let (mut app, _) = test_app(GameMode::Classic);
        type_word(&mut app, "water");
        app.handle_key(key(KeyCode::Char('s'))).unwrap();

        app.handle_key(key(KeyCode::Char('r'))).unwrap();
        assert!(app.confirm_reset);
        app.handle_key(key(KeyCode::Char('x'))).unwrap();
        assert!(!app.confirm_reset);
        assert_eq!(app.ledger.borrow().wins(), 1);

        app.handle_key(key(KeyCode::Char('r'))).unwrap();
        app.handle_key(key(KeyCode::Char('y'))).unwrap();
        assert_eq!(app.ledger.borrow().total_games(), 0);
        assert_eq!(app.state, AppState::Stats);
    }

    #[test]
    fn test_app_nickname_editing() {
        let (mut app, _) = test_app(GameMode::Classic);
        app.state = AppState::Stats;

        app.handle_key(key(KeyCode::Char('e'))).unwrap();
        assert_eq!(app.nickname_draft.as_deref(), Some(""));
        for c in "ada x".chars() {
            app.handle_key(key(KeyCode::Char(c))).unwrap();
        }
        app.handle_key(key(KeyCode::Backspace)).unwrap();
        // letters typed while editing never reach the quit binding
        assert_eq!(app.handle_key(key(KeyCode::Char('q'))).unwrap(), Flow::Continue);
        app.handle_key(key(KeyCode::Backspace)).unwrap();
        app.handle_key(key(KeyCode::Enter)).unwrap();

        assert_eq!(app.nickname_draft, None);
        assert_eq!(app.ledger.borrow().nickname(), "ada");

        app.handle_key(key(KeyCode::Char('e'))).unwrap();
        app.handle_key(key(KeyCode::Char('!'))).unwrap();
        assert_eq!(app.handle_key(key(KeyCode::Esc)).unwrap(), Flow::Continue);
        assert_eq!(app.ledger.borrow().nickname(), "ada");
    }

    #[test]
    fn test_ctrl_c_quits_from_any_state() {
        let (mut app, _) = test_app(GameMode::Classic);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);

        assert_eq!(app.handle_key(ctrl_c).unwrap(), Flow::Quit);
        assert_eq!(app.session.current_col(), 0);

        app.state = AppState::Stats;
        app.nickname_draft = Some(String::new());
        assert_eq!(app.handle_key(ctrl_c).unwrap(), Flow::Quit);
    }

    #[test]
    fn test_stats_report() {
        let mut ledger = StatsLedger::load(Box::new(MemoryLedgerStore::new()));
        assert!(stats_report(&ledger).contains("Nickname:       -"));

        ledger.set_nickname("ada");
        ledger.record_win();
        ledger.record_loss();
        let report = stats_report(&ledger);
        assert!(report.contains("Nickname:       ada"));
        assert!(report.contains("Games Played:   2"));
        assert!(report.contains("Win Percentage: 50.0%"));
    }

    #[test]
    fn test_ui_playing_state() {
        let (mut app, _) = test_app(GameMode::Timed);
        app.handle_key(key(KeyCode::Char('w'))).unwrap();

        let content = render(&mut app);
        assert!(content.contains("CIPHERWORD"));
        assert!(content.contains("Attempt 1/6"));
        assert!(content.contains("Time: 3 sec"));
        assert!(content.contains(" W "));
        assert!(content.contains(" Q "));
    }

    #[test]
    fn test_ui_results_reveal_target_only_on_loss() {
        let (mut app, _) = test_app(GameMode::Classic);
        type_word(&mut app, "water");
        let content = render(&mut app);
        assert!(content.contains("Solved in 1 attempts!"));
        assert!(!content.contains("Target word"));

        let (mut app, _) = test_app(GameMode::Classic);
        for _ in 0..6 {
            type_word(&mut app, "lower");
        }
        assert_eq!(app.state, AppState::Results);
        let content = render(&mut app);
        assert!(content.contains("Out of attempts"));
        assert!(content.contains("Target word: WATER"));
    }

    #[test]
    fn test_ui_stats_state() {
        let (mut app, _) = test_app(GameMode::Classic);
        app.ledger.borrow_mut().set_nickname("ada");
        app.state = AppState::Stats;

        let content = render(&mut app);
        assert!(content.contains("Statistics for ada"));
        assert!(content.contains("Games Played"));
        assert!(content.contains("(r)eset data"));

        app.handle_key(key(KeyCode::Char('r'))).unwrap();
        let content = render(&mut app);
        assert!(content.contains("This will delete all statistics"));
    }

    #[test]
    fn test_start_tui_drops_stale_ticks_and_quits() {
        let (mut app, _) = test_app(GameMode::Timed);
        let (tx, rx) = mpsc::channel();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(10)),
        );
        let gate = TickGate::default();

        for _ in 0..5 {
            tx.send(GameEvent::Tick(1)).unwrap();
        }
        for c in "water".chars() {
            tx.send(GameEvent::Key(key(KeyCode::Char(c)))).unwrap();
        }
        tx.send(GameEvent::Key(key(KeyCode::Enter))).unwrap();
        tx.send(GameEvent::Key(key(KeyCode::Esc))).unwrap();

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        start_tui(&mut terminal, &mut app, &runner, &gate).unwrap();

        assert_eq!(app.session.status(), Status::Won);
        assert_eq!(app.session.time_remaining(), Some(3));
        assert_eq!(app.state, AppState::Results);
    }
}
