use ratatui::Frame;

use crate::{ui::stats_screen::render_stats, App, AppState};

/// A UI Screen boundary: responsible for rendering
pub trait Screen {
    fn render(&self, app: &mut App, f: &mut Frame);
}

/// Board screen - grid, keyboard hints and the in-game footer
pub struct PlayingScreen;

impl Screen for PlayingScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        f.render_widget(&*app, f.area());
    }
}

/// Results screen - the final board plus the outcome footer
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        f.render_widget(&*app, f.area());
    }
}

/// Stats screen - uses dedicated renderer
pub struct StatsScreen;

impl Screen for StatsScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_stats(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Playing => Box::new(PlayingScreen),
        AppState::Results => Box::new(ResultsScreen),
        AppState::Stats => Box::new(StatsScreen),
    }
}
