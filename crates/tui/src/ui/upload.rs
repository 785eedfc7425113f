use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{App, MsgKind, UploadFocus, CATEGORIES};
use crate::theme;

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let form = super::centered_rect(60, 22, area);

    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER))
        .title(" Nuevo Registro ");
    let inner = outer.inner(form);
    frame.render_widget(outer, form);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    field(
        frame,
        rows[0],
        "Ingresos",
        &app.upload.income_input,
        app.upload.focus == UploadFocus::Income,
    );
    field(
        frame,
        rows[1],
        "Gastos",
        &app.upload.expenses_input,
        app.upload.focus == UploadFocus::Expenses,
    );
    field(
        frame,
        rows[2],
        "Ahorros",
        &app.upload.savings_input,
        app.upload.focus == UploadFocus::Savings,
    );
    field(
        frame,
        rows[3],
        "Mes (AAAA-MM)",
        &app.upload.month_input,
        app.upload.focus == UploadFocus::Month,
    );
    category_field(frame, app, rows[4]);
    field(
        frame,
        rows[5],
        "Observaciones (opcional)",
        &app.upload.description,
        app.upload.focus == UploadFocus::Description,
    );

    let hint = if app.upload.loading {
        Span::styled("Guardando...", Style::default().fg(theme::WARNING))
    } else {
        Span::styled(
            "Tab/↓ siguiente campo · Enter guardar",
            Style::default().fg(theme::TEXT_MUTED),
        )
    };
    frame.render_widget(Paragraph::new(Line::from(hint)), rows[6]);

    let mut lines: Vec<Line> = app
        .upload
        .errors
        .iter()
        .map(|e| {
            Line::from(Span::styled(
                e.message,
                Style::default().fg(theme::EXPENSES),
            ))
        })
        .collect();
    if let Some((kind, text)) = &app.upload.toast {
        let color = match kind {
            MsgKind::Success => theme::INCOME,
            MsgKind::Error => theme::EXPENSES,
            MsgKind::Info => theme::SAVINGS,
        };
        lines.push(Line::from(Span::styled(
            text.as_str(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
    }
    frame.render_widget(Paragraph::new(lines), rows[7]);
}

fn field(frame: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let border = if focused { theme::ACCENT } else { theme::BORDER };
    let cursor = if focused { "▏" } else { "" };
    let widget = Paragraph::new(format!("{value}{cursor}")).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(label.to_string()),
    );
    frame.render_widget(widget, area);
}

fn category_field(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.upload.focus == UploadFocus::Category;
    let border = if focused { theme::ACCENT } else { theme::BORDER };

    let mut spans: Vec<Span> = Vec::new();
    match app.upload.category_ix {
        None => spans.push(Span::styled(
            "Seleccione... (←/→)",
            Style::default().fg(theme::TEXT_MUTED),
        )),
        Some(selected) => {
            for (ix, category) in CATEGORIES.iter().enumerate() {
                if ix > 0 {
                    spans.push(Span::raw("  "));
                }
                let style = if ix == selected {
                    Style::default()
                        .fg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme::TEXT_MUTED)
                };
                spans.push(Span::styled(*category, style));
            }
        }
    }

    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title("Categoría"),
    );
    frame.render_widget(widget, area);
}
