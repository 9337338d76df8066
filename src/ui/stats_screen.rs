use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::App;

pub fn render_stats(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Stats table
            Constraint::Length(4), // Instructions
        ])
        .split(area);

    let ledger = app.ledger.borrow();
    let title_text = if ledger.nickname().is_empty() {
        "Statistics".to_string()
    } else {
        format!("Statistics for {}", ledger.nickname())
    };

    let title = Paragraph::new(title_text)
        .block(Block::default().borders(Borders::ALL).title("Stats"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let win_rate = ledger.win_percentage();
    let win_color = if ledger.total_games() == 0 {
        Color::Gray
    } else if win_rate >= 50.0 {
        Color::Green
    } else {
        Color::Yellow
    };

    let rows = vec![
        Row::new(vec![
            Cell::from("Games Played"),
            Cell::from(ledger.total_games().to_string()),
        ]),
        Row::new(vec![
            Cell::from("Wins"),
            Cell::from(ledger.wins().to_string()).style(Style::default().fg(Color::Green)),
        ]),
        Row::new(vec![
            Cell::from("Losses"),
            Cell::from(ledger.losses().to_string()).style(Style::default().fg(Color::Red)),
        ]),
        Row::new(vec![
            Cell::from("Win Percentage"),
            Cell::from(format!("{win_rate:.1}%")).style(Style::default().fg(win_color)),
        ]),
    ];

    let header = Row::new(vec![Cell::from("Stat"), Cell::from("Value")]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let table = Table::new(rows, &[Constraint::Length(18), Constraint::Length(12)])
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("All games"));
    f.render_widget(table, chunks[1]);

    let (text, color) = if let Some(draft) = &app.nickname_draft {
        (
            format!("Nickname: {draft}_\n(enter) save / (esc) cancel"),
            Color::Cyan,
        )
    } else if app.confirm_reset {
        (
            "This will delete all statistics and nickname.\n(y) reset / any other key to cancel"
                .to_string(),
            Color::Red,
        )
    } else {
        (
            "(e)dit nickname / (r)eset data / (n)ew game / (b)ack / (esc)ape".to_string(),
            Color::Gray,
        )
    };
    let instructions = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(color).add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[2]);
}
