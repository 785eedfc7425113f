use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use models::ChatRole;

use crate::app::App;
use crate::theme;

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(3)])
        .split(area);

    draw_transcript(frame, app, rows[0]);
    draw_input(frame, app, rows[1]);
}

fn draw_transcript(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    if app.chat.is_empty() && !app.chat_loading {
        lines.push(Line::from(Span::styled(
            "Comienza tu conversación financiera.",
            Style::default().fg(theme::TEXT_MUTED),
        )));
    }

    for message in &app.chat {
        let (tag, color) = match message.role {
            ChatRole::User => ("Tú", theme::ACCENT),
            ChatRole::Ai => ("IA", theme::SAVINGS),
        };
        lines.push(Line::from(Span::styled(
            format!("{tag}:"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for part in message.text.lines() {
            lines.push(Line::from(format!("  {part}")));
        }
        lines.push(Line::from(""));
    }

    if app.chat_loading {
        lines.push(Line::from(Span::styled(
            "FinScope AI está analizando tus finanzas...",
            Style::default().fg(theme::WARNING),
        )));
    }

    // Stick to the bottom of the conversation unless the user scrolled up.
    let height = area.height.saturating_sub(2);
    let overflow = (lines.len() as u16).saturating_sub(height);
    let scroll = overflow.saturating_sub(app.chat_scroll);

    let transcript = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .style(Style::default().fg(theme::TEXT))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::BORDER))
                .title(" Asistente Financiero IA — Ctrl+K limpiar chat "),
        );
    frame.render_widget(transcript, area);
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let input = Paragraph::new(format!("{}▏", app.chat_input)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .title("Haz una pregunta financiera..."),
    );
    frame.render_widget(input, area);
}
