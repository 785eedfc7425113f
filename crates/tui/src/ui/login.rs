use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::theme;

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let form = super::centered_rect(48, 14, area);

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER))
        .title(Span::styled(
            " FinScope AI — Iniciar Sesión ",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = outer.inner(form);
    frame.render_widget(outer, form);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "Accede a tu panel de control inteligente",
            Style::default().fg(theme::TEXT_MUTED),
        ))),
        rows[0],
    );

    draw_field(
        frame,
        rows[1],
        "Correo electrónico",
        &app.login.email,
        !app.login.focus_password,
        false,
    );
    draw_field(
        frame,
        rows[2],
        "Contraseña",
        &app.login.password,
        app.login.focus_password,
        true,
    );

    let hint = if app.login.loading {
        Span::styled("Verificando...", Style::default().fg(theme::WARNING))
    } else {
        Span::styled(
            "Tab cambia de campo · Enter ingresar · Esc salir",
            Style::default().fg(theme::TEXT_MUTED),
        )
    };
    frame.render_widget(Paragraph::new(Line::from(hint)), rows[3]);

    if let Some(message) = &app.login.message {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                message.as_str(),
                Style::default().fg(theme::EXPENSES),
            ))),
            rows[4],
        );
    }
}

fn draw_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    mask: bool,
) {
    let border = if focused { theme::ACCENT } else { theme::BORDER };
    let shown = if mask {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let cursor = if focused { "▏" } else { "" };
    let field = Paragraph::new(format!("{shown}{cursor}")).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(label.to_string()),
    );
    frame.render_widget(field, area);
}
