pub mod screen;
pub mod stats_screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use cipherword::{CellState, GameMode, LossReason, Status, Verdict, MAX_ATTEMPTS};

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 2;
const KEYBOARD_ROWS: [&str; 3] = ["QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM"];

fn cell_style(state: CellState) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match state {
        CellState::Correct => bold.fg(Color::Black).bg(Color::Green),
        CellState::Misplaced => bold.fg(Color::Black).bg(Color::Yellow),
        CellState::Absent => bold.fg(Color::White).bg(Color::DarkGray),
        CellState::Filled => bold.fg(Color::White),
        CellState::Empty => Style::default().add_modifier(Modifier::DIM),
    }
}

fn key_style(verdict: Option<Verdict>) -> Style {
    match verdict {
        Some(v) => cell_style(v.into()),
        None => Style::default().add_modifier(Modifier::BOLD),
    }
}

fn header_line(app: &App) -> Line<'static> {
    let session = &app.session;
    let attempt = (session.current_row() + 1).min(MAX_ATTEMPTS);
    let mut spans = vec![
        Span::styled(
            "CIPHERWORD",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  {}  ", session.mode())),
        Span::raw(format!("Attempt {attempt}/{MAX_ATTEMPTS}")),
    ];

    if let Some(secs) = session.time_remaining() {
        let style = if secs <= 10 {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Magenta)
        };
        spans.push(Span::styled(format!("  Time: {secs} sec"), style));
    }

    if session.mode() == GameMode::Mosaic {
        spans.push(Span::styled(
            format!("  Word #{}", session.swaps() + 1),
            Style::default().add_modifier(Modifier::ITALIC),
        ));
    }

    Line::from(spans)
}

fn grid_lines(app: &App) -> Vec<Line<'static>> {
    let session = &app.session;
    let mut lines = Vec::with_capacity(MAX_ATTEMPTS * 2);

    for (r, row) in session.grid().rows().enumerate() {
        let spans = row
            .iter()
            .enumerate()
            .flat_map(|(c, cell)| {
                let letter = cell.letter.unwrap_or('·');
                let mut style = cell_style(cell.state);
                if !session.is_over() && r == session.current_row() && c == session.current_col() {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                [Span::styled(format!(" {letter} "), style), Span::raw(" ")]
            })
            .collect::<Vec<Span>>();
        lines.push(Line::from(spans));
        lines.push(Line::default());
    }

    lines
}

fn keyboard_lines(app: &App) -> Vec<Line<'static>> {
    let hints = app.session.keyboard();
    KEYBOARD_ROWS
        .iter()
        .map(|row| {
            Line::from(
                row.chars()
                    .flat_map(|c| {
                        [
                            Span::styled(format!(" {c} "), key_style(hints.get(c))),
                            Span::raw(" "),
                        ]
                    })
                    .collect::<Vec<Span>>(),
            )
        })
        .collect()
}

fn footer_lines(app: &App) -> Vec<Line<'static>> {
    let session = &app.session;
    let dim_italic = Style::default()
        .add_modifier(Modifier::DIM)
        .add_modifier(Modifier::ITALIC);

    match (&app.state, session.status()) {
        (AppState::Results, Status::Won) => vec![
            Line::from(Span::styled(
                format!("Solved in {} attempts!", session.attempts()),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            stats_line(app),
            Line::from(Span::styled(
                "(n)ew game / (m)ode switch / (s)tats / (esc)ape",
                dim_italic,
            )),
        ],
        (AppState::Results, Status::Lost(reason)) => {
            let headline = match reason {
                LossReason::TimeUp => "Time's up!",
                LossReason::OutOfAttempts => "Out of attempts",
            };
            let target = session
                .revealed_target()
                .map(|w| w.to_string())
                .unwrap_or_default();
            vec![
                Line::from(vec![
                    Span::styled(
                        headline,
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(format!("  Target word: {target}")),
                ]),
                stats_line(app),
                Line::from(Span::styled(
                    "(n)ew game / (m)ode switch / (s)tats / (esc)ape",
                    dim_italic,
                )),
            ]
        }
        _ => vec![Line::from(Span::styled(
            "type letters / (enter) submit / (backspace) delete / (tab) next mode / (esc)ape",
            dim_italic,
        ))],
    }
}

fn stats_line(app: &App) -> Line<'static> {
    let ledger = app.ledger.borrow();
    Line::from(format!(
        "Played {}  Wins {}  Losses {}  Win {:.1}%",
        ledger.total_games(),
        ledger.wins(),
        ledger.losses(),
        ledger.win_percentage()
    ))
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let grid = grid_lines(self);
        let keyboard = keyboard_lines(self);
        let footer = footer_lines(self);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(2),
                Constraint::Length(grid.len() as u16),
                Constraint::Length(keyboard.len() as u16 + 1),
                Constraint::Min(footer.len() as u16),
            ])
            .split(area);

        Paragraph::new(header_line(self))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);
        Paragraph::new(grid)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
        Paragraph::new(keyboard)
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
        Paragraph::new(footer)
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }
}
