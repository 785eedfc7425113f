//! Screen rendering. One function per page, dispatched from `draw`.

mod chat;
mod dashboard;
mod history;
mod insights;
mod login;
mod upload;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use ratatui::Frame;

use crate::app::{App, Screen};
use crate::theme;

pub fn draw(frame: &mut Frame, app: &App) {
    if app.screen == Screen::Login {
        login::draw(frame, app, frame.area());
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_tabs(frame, app, chunks[0]);

    match app.screen {
        Screen::Login => unreachable!(),
        Screen::Dashboard => dashboard::draw(frame, app, chunks[1]),
        Screen::History => history::draw(frame, app, chunks[1]),
        Screen::Upload => upload::draw(frame, app, chunks[1]),
        Screen::Insights => insights::draw(frame, app, chunks[1]),
        Screen::Chat => chat::draw(frame, app, chunks[1]),
    }

    draw_status(frame, app, chunks[2]);
}

fn draw_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles = [
        "F1 Dashboard",
        "F2 Historial",
        "F3 Nuevo Registro",
        "F4 Análisis IA",
        "F5 Asistente",
    ];
    let selected = match app.screen {
        Screen::Dashboard => 0,
        Screen::History => 1,
        Screen::Upload => 2,
        Screen::Insights => 3,
        Screen::Chat => 4,
        Screen::Login => 0,
    };
    let tabs = Tabs::new(titles.iter().map(|t| Line::from(*t)))
        .select(selected)
        .style(Style::default().fg(theme::TEXT_MUTED))
        .highlight_style(
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::BORDER))
                .title(Span::styled(
                    " FinScope AI ",
                    Style::default()
                        .fg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )),
        );
    frame.render_widget(tabs, area);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            format!(" {} ", app.full_name()),
            Style::default().fg(theme::ACCENT),
        ),
        Span::styled(
            app.user_email().unwrap_or("").to_string(),
            Style::default().fg(theme::TEXT_MUTED),
        ),
    ];
    if app.records_loading {
        spans.push(Span::styled(
            "  Actualizando...",
            Style::default().fg(theme::WARNING),
        ));
    }
    spans.push(Span::styled(
        "  F10 cerrar sesión · q salir",
        Style::default().fg(theme::TEXT_MUTED),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Centers a box of the given width/height inside `area`.
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
