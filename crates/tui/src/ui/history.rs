use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
};
use ratatui::Frame;

use dashboard_engine::{month_label, SortDirection, SortField};

use crate::app::{App, HistoryFocus, MsgKind};
use crate::theme;

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let constraints = if app.expanded {
        vec![
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Percentage(55),
            Constraint::Min(5),
        ]
    } else {
        vec![
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(5),
        ]
    };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    draw_filters(frame, app, rows[0]);
    draw_message(frame, app, rows[1]);
    draw_table(frame, app, rows[2]);
    if app.expanded {
        draw_records(frame, app, rows[3]);
    }

    if app.confirm_delete.is_some() {
        draw_confirm(frame, area);
    }
}

fn draw_filters(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(20),
            Constraint::Length(20),
            Constraint::Min(10),
        ])
        .split(area);

    filter_input(
        frame,
        columns[0],
        "Desde (AAAA-MM)",
        &app.start_month,
        app.history_focus == HistoryFocus::StartMonth,
    );
    filter_input(
        frame,
        columns[1],
        "Hasta (AAAA-MM)",
        &app.end_month,
        app.history_focus == HistoryFocus::EndMonth,
    );

    let help = Paragraph::new(Line::from(Span::styled(
        "f filtrar · m/i/g/a ordenar · Enter detalles · d eliminar",
        Style::default().fg(theme::TEXT_MUTED),
    )))
    .block(Block::default().borders(Borders::ALL).border_style(
        Style::default().fg(theme::BORDER),
    ));
    frame.render_widget(help, columns[2]);
}

fn filter_input(frame: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
    let border = if focused { theme::ACCENT } else { theme::BORDER };
    let cursor = if focused { "▏" } else { "" };
    let input = Paragraph::new(format!("{value}{cursor}")).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(label.to_string()),
    );
    frame.render_widget(input, area);
}

fn draw_message(frame: &mut Frame, app: &App, area: Rect) {
    let Some((kind, text)) = &app.history_message else {
        return;
    };
    let color = match kind {
        MsgKind::Error => theme::EXPENSES,
        MsgKind::Success => theme::INCOME,
        MsgKind::Info => theme::SAVINGS,
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            text.as_str(),
            Style::default().fg(color),
        ))),
        area,
    );
}

fn sort_marker(app: &App, field: SortField) -> &'static str {
    if app.sort.field != field {
        return "";
    }
    match app.sort.direction {
        SortDirection::Asc => " ▲",
        SortDirection::Desc => " ▼",
    }
}

fn draw_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        format!("Mes{}", sort_marker(app, SortField::Month)),
        format!("Ingresos{}", sort_marker(app, SortField::Income)),
        format!("Gastos{}", sort_marker(app, SortField::Expenses)),
        format!("Ahorros{}", sort_marker(app, SortField::Savings)),
        "Registros".to_string(),
    ])
    .style(
        Style::default()
            .fg(theme::ACCENT)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = app
        .history_rows
        .iter()
        .map(|agg| {
            Row::new(vec![
                month_label(&agg.month_key).unwrap_or_else(|| agg.month_key.clone()),
                format!("${:.2}", agg.income),
                format!("${:.2}", agg.expenses),
                format!("${:.2}", agg.savings),
                format!("{}", agg.records.len()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(18),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .row_highlight_style(
        Style::default()
            .bg(theme::PRIMARY)
            .add_modifier(Modifier::BOLD),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::BORDER))
            .title(" Historial Financiero (Mensual) "),
    );

    if app.history_rows.is_empty() {
        let empty = Paragraph::new("No hay datos disponibles.")
            .style(Style::default().fg(theme::TEXT_MUTED))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme::BORDER))
                    .title(" Historial Financiero (Mensual) "),
            );
        frame.render_widget(empty, area);
        return;
    }

    let mut state = TableState::default();
    state.select(Some(app.table_ix));
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_records(frame: &mut Frame, app: &App, area: Rect) {
    let Some(row) = app.history_rows.get(app.table_ix) else {
        return;
    };

    let items: Vec<ListItem> = row
        .records
        .iter()
        .map(|rec| {
            let category = rec.category.as_deref().unwrap_or("—");
            let description = rec.description.as_deref().unwrap_or("—");
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:12}", rec.record_date.chars().take(10).collect::<String>()),
                    Style::default().fg(theme::TEXT_MUTED),
                ),
                Span::raw(format!("{category:20}")),
                Span::styled(
                    format!("${:>10.2} ", rec.income),
                    Style::default().fg(theme::INCOME),
                ),
                Span::styled(
                    format!("${:>10.2} ", rec.expenses),
                    Style::default().fg(theme::EXPENSES),
                ),
                Span::styled(
                    format!("${:>10.2} ", rec.savings),
                    Style::default().fg(theme::SAVINGS),
                ),
                Span::raw(description.to_string()),
            ]))
        })
        .collect();

    let title = format!(
        " Registros de {} ",
        month_label(&row.month_key).unwrap_or_else(|| row.month_key.clone())
    );
    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(theme::PRIMARY)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::ACCENT))
                .title(title),
        );

    let mut state = ListState::default();
    state.select(Some(app.record_ix));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_confirm(frame: &mut Frame, area: Rect) {
    let modal = super::centered_rect(46, 5, area);
    frame.render_widget(Clear, modal);
    let text = vec![
        Line::from("¿Seguro que deseas eliminar este registro?"),
        Line::from(Span::styled(
            "y confirmar · n cancelar",
            Style::default().fg(theme::TEXT_MUTED),
        )),
    ];
    let dialog = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::EXPENSES))
            .title(" Eliminar registro "),
    );
    frame.render_widget(dialog, modal);
}
