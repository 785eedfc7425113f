use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap};
use ratatui::Frame;

use dashboard_engine::{month_label, month_label_short, totals, trend_series};

use crate::app::App;
use crate::theme;

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Min(8),
        ])
        .split(area);

    draw_totals(frame, app, rows[0]);
    draw_summary(frame, app, rows[1]);
    draw_trend(frame, app, rows[2]);
}

fn draw_totals(frame: &mut Frame, app: &App, area: Rect) {
    let t = totals(&app.records);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    let tiles = [
        ("Ingresos", t.income, theme::INCOME),
        ("Gastos", t.expenses, theme::EXPENSES),
        ("Ahorros", t.savings, theme::SAVINGS),
    ];
    for (ix, (label, value, color)) in tiles.iter().enumerate() {
        let tile = Paragraph::new(Line::from(vec![Span::styled(
            format!("${value:.2}"),
            Style::default().fg(*color).add_modifier(Modifier::BOLD),
        )]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::BORDER))
                .title(*label),
        );
        frame.render_widget(tile, columns[ix]);
    }
}

fn draw_summary(frame: &mut Frame, app: &App, area: Rect) {
    let text = if app.summary.loading {
        "Cargando resumen IA...".to_string()
    } else if let Some(error) = &app.summary.error {
        error.clone()
    } else {
        app.summary
            .data
            .as_ref()
            .and_then(|s| s.summary.clone())
            .unwrap_or_else(|| "Sin datos de resumen.".to_string())
    };
    let source = app
        .summary
        .data
        .as_ref()
        .and_then(|s| s.source.as_deref())
        .unwrap_or("gemini");

    let summary = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(theme::TEXT))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::BORDER))
                .title(format!(" Resumen IA ({source}) ")),
        );
    frame.render_widget(summary, area);
}

fn draw_trend(frame: &mut Frame, app: &App, area: Rect) {
    let months = trend_series(&app.records);
    if months.is_empty() {
        let empty = Paragraph::new("Sin datos suficientes para graficar.")
            .style(Style::default().fg(theme::TEXT_MUTED))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme::BORDER))
                    .title(" Tendencia Mensual "),
            );
        frame.render_widget(empty, area);
        return;
    }

    let income: Vec<(f64, f64)> = series(&months, |m| m.income);
    let expenses: Vec<(f64, f64)> = series(&months, |m| m.expenses);
    let savings: Vec<(f64, f64)> = series(&months, |m| m.savings);

    let max_y = months
        .iter()
        .flat_map(|m| [m.income, m.expenses, m.savings])
        .fold(0.0_f64, f64::max)
        .max(1.0);

    let mut datasets = vec![
        line_dataset("ingresos", &income, theme::INCOME),
        line_dataset("gastos", &expenses, theme::EXPENSES),
        line_dataset("ahorros", &savings, theme::SAVINGS),
    ];

    // Highlight the selected month's three points, the TUI stand-in for the
    // chart's reference line.
    let selected: Vec<(f64, f64)>;
    if let Some(ix) = app
        .selected_month
        .as_deref()
        .and_then(|sel| months.iter().position(|m| m.month_key == sel))
    {
        selected = vec![
            (ix as f64, months[ix].income),
            (ix as f64, months[ix].expenses),
            (ix as f64, months[ix].savings),
        ];
        datasets.push(
            Dataset::default()
                .name("mes seleccionado")
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(theme::WARNING))
                .data(&selected),
        );
    }

    let x_labels: Vec<Line> = [0, months.len() / 2, months.len() - 1]
        .iter()
        .map(|&ix| {
            Line::from(
                month_label_short(&months[ix].month_key).unwrap_or_else(|| "?".to_string()),
            )
        })
        .collect();
    let y_labels: Vec<Line> = [0.0, max_y / 2.0, max_y]
        .iter()
        .map(|v| Line::from(format!("{v:.0}")))
        .collect();

    let title = match app.selected_month.as_deref().and_then(month_label) {
        Some(label) => format!(" Tendencia Mensual — {label} "),
        None => " Tendencia Mensual ".to_string(),
    };

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::BORDER))
                .title(title),
        )
        .x_axis(
            Axis::default()
                .style(Style::default().fg(theme::TEXT_MUTED))
                .bounds([0.0, (months.len().max(2) - 1) as f64])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(theme::TEXT_MUTED))
                .bounds([0.0, max_y * 1.1])
                .labels(y_labels),
        );
    frame.render_widget(chart, area);
}

fn series(
    months: &[dashboard_engine::MonthlyAggregate],
    f: impl Fn(&dashboard_engine::MonthlyAggregate) -> f64,
) -> Vec<(f64, f64)> {
    months
        .iter()
        .enumerate()
        .map(|(ix, m)| (ix as f64, f(m)))
        .collect()
}

fn line_dataset<'a>(
    name: &'a str,
    data: &'a [(f64, f64)],
    color: ratatui::style::Color,
) -> Dataset<'a> {
    Dataset::default()
        .name(name)
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(data)
}
