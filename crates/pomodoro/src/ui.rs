//! UI rendering

use pomodoro::session::SessionType;
use pomodoro::timer::TimerStatus;
use pomodoro_core::format;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Clear, Gauge, Paragraph},
    Frame,
};

use crate::app::{App, View};

/// Colour used for a session type
fn session_color(session_type: SessionType) -> Color {
    match session_type {
        SessionType::Focus => Color::Red,
        SessionType::ShortBreak => Color::Green,
        SessionType::LongBreak => Color::Blue,
    }
}

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    match app.view {
        View::Timer => draw_timer(f, app, chunks[1]),
        View::Stats => draw_stats(f, app, chunks[1]),
    }
    draw_footer(f, app, chunks[2]);

    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let session_type = app.timer.session_type();
    let status = match app.timer.status() {
        TimerStatus::Running => Span::styled("running", Style::default().fg(Color::Green)),
        TimerStatus::Paused => Span::styled("paused", Style::default().fg(Color::Yellow)),
        TimerStatus::Idle => Span::styled("idle", Style::default().fg(Color::DarkGray)),
    };
    let view = match app.view {
        View::Timer => "Timer",
        View::Stats => "Stats",
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" Pomodoro ", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" - "),
        Span::styled(session_type.label(), Style::default().fg(session_color(session_type)).bold()),
        Span::raw(" ["),
        status,
        Span::raw("]  "),
        Span::styled(view, Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn draw_timer(f: &mut Frame, app: &App, area: Rect) {
    let snapshot = app.timer.snapshot();
    let color = session_color(snapshot.session_type);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(3), // Clock
            Constraint::Length(3), // Progress
            Constraint::Length(3), // Cycle and goal
            Constraint::Length(1), // Message
            Constraint::Min(0),
        ])
        .split(area);

    let clock = Paragraph::new(vec![
        Line::from(Span::styled(
            format::clock(snapshot.remaining_seconds),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(snapshot.session_type.label(), Style::default().fg(color))),
    ])
    .alignment(Alignment::Center);
    f.render_widget(clock, rows[1]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color)))
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .ratio(snapshot.progress.clamp(0.0, 1.0))
        .label(format!("{:.0}%", snapshot.progress * 100.0));
    f.render_widget(gauge, centered_columns(rows[2], 60));

    let today = app.summary().today;
    let info = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Session ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!(
                "{} / {}",
                snapshot.focus_count, snapshot.settings.sessions_until_long_break
            )),
        ]),
        Line::from(vec![
            Span::styled("Today ", Style::default().fg(Color::DarkGray)),
            Span::raw(format!(
                "{} / {}",
                today.sessions_completed, snapshot.settings.daily_goal
            )),
        ]),
    ])
    .alignment(Alignment::Center);
    f.render_widget(info, rows[3]);

    if let Some(message) = &app.message {
        let line = Paragraph::new(Span::styled(message.as_str(), Style::default().fg(Color::Yellow)))
            .alignment(Alignment::Center);
        f.render_widget(line, rows[4]);
    }
}

fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let summary = app.summary();

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(0)])
        .split(area);

    let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::Cyan));
    let totals = Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            label("  Today:          "),
            Span::raw(format!("{} / {}", summary.today.sessions_completed, summary.daily_goal)),
        ]),
        Line::from(vec![
            label("  Focus today:    "),
            Span::raw(format::minutes(summary.today.focus_minutes)),
        ]),
        Line::from(vec![
            label("  Breaks today:   "),
            Span::raw(format::minutes(summary.today.break_minutes)),
        ]),
        Line::from(""),
        Line::from(vec![
            label("  Total sessions: "),
            Span::raw(summary.total_sessions.to_string()),
        ]),
        Line::from(vec![
            label("  Total focus:    "),
            Span::raw(format::minutes(summary.total_focus_minutes)),
        ]),
        Line::from(vec![
            label("  Streak:         "),
            Span::raw(format!("{}d", summary.streak)),
        ]),
    ])
    .block(
        Block::default()
            .title(" Summary ")
            .title_style(Style::default().fg(Color::Blue).bold())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)),
    );
    f.render_widget(totals, cols[0]);

    let labels: Vec<String> = summary.week.iter().map(|d| d.date.format("%m-%d").to_string()).collect();
    let data: Vec<(&str, u64)> = labels
        .iter()
        .zip(&summary.week)
        .map(|(label, day)| (label.as_str(), day.focus_minutes as u64))
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(" Focus minutes - last 7 days ")
                .title_style(Style::default().fg(Color::Red).bold())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .data(data.as_slice())
        .bar_width(5)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Red))
        .value_style(Style::default().fg(Color::Black).bg(Color::Red));
    f.render_widget(chart, cols[1]);
}

fn draw_footer(f: &mut Frame, _app: &App, area: Rect) {
    let help = Line::from(vec![
        Span::styled(" space", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" start/pause  "),
        Span::styled("r", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" reset  "),
        Span::styled("s", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" skip  "),
        Span::styled("Tab", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" stats  "),
        Span::styled("?", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" help  "),
        Span::styled("q", Style::default().fg(Color::Cyan).bold()),
        Span::raw(" quit"),
    ]);

    let footer = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    f.render_widget(footer, area);
}

fn draw_help_overlay(f: &mut Frame) {
    let area = f.area();

    let popup_width = 46;
    let popup_height = 13;
    let x = (area.width.saturating_sub(popup_width)) / 2;
    let y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(x, y, popup_width.min(area.width), popup_height.min(area.height));

    f.render_widget(Clear, popup_area);

    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Cyan));
    let help_text = vec![
        Line::from(""),
        Line::from(vec![key("  space    "), Span::raw("Start / pause / resume")]),
        Line::from(vec![key("  r        "), Span::raw("Reset current session")]),
        Line::from(vec![key("  s        "), Span::raw("Skip to next session")]),
        Line::from(vec![key("  + / -    "), Span::raw("Lengthen / shorten by 1 min")]),
        Line::from(vec![key("  Tab      "), Span::raw("Switch timer / stats")]),
        Line::from(vec![key("  ?        "), Span::raw("Toggle this help")]),
        Line::from(vec![key("  q / Esc  "), Span::raw("Quit")]),
        Line::from(""),
        Line::from(Span::styled("Press ? to close", Style::default().fg(Color::DarkGray))).centered(),
    ];

    let help_popup = Paragraph::new(help_text).block(
        Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(Style::default().fg(Color::Yellow).bold())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );

    f.render_widget(help_popup, popup_area);
}

/// A horizontally centred strip of at most `width` columns
fn centered_columns(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect::new(area.x + (area.width - width) / 2, area.y, width, area.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomodoro::settings::Settings;
    use pomodoro::store::MemoryStore;
    use pomodoro::timer::Timer;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App {
        App::new(Timer::new(Settings::default(), Vec::new(), Box::new(MemoryStore::new())))
    }

    #[test]
    fn test_timer_view_shows_clock() {
        let screen = render(&app());
        assert!(screen.contains("25:00"));
        assert!(screen.contains("Focus"));
        assert!(screen.contains("Session 0 / 4"));
        assert!(screen.contains("Today 0 / 8"));
    }

    #[test]
    fn test_stats_view_and_help() {
        let mut app = app();
        app.view = View::Stats;
        app.show_help = true;
        let screen = render(&app);
        assert!(screen.contains("Total sessions"));
        assert!(screen.contains("Keyboard Shortcuts"));
    }

    #[test]
    fn test_centered_columns() {
        let area = Rect::new(0, 0, 100, 3);
        assert_eq!(centered_columns(area, 60), Rect::new(20, 0, 60, 3));
        assert_eq!(centered_columns(Rect::new(5, 1, 10, 3), 60), Rect::new(5, 1, 10, 3));
    }
}
