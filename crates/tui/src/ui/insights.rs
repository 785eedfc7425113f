use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{App, DeltaType, Panel};
use crate::theme;

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[0]);

    draw_risk(frame, app, top[0]);
    draw_scenario(frame, app, top[1]);
    draw_forecast(frame, app, rows[1]);
}

fn panel_block(title: &str, border: ratatui::style::Color) -> Block {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title.to_string())
}

fn loading_or_error<T>(
    frame: &mut Frame,
    panel: &Panel<T>,
    title: &str,
    loading_text: &str,
    area: Rect,
) -> bool {
    if panel.loading {
        let widget = Paragraph::new(loading_text.to_string())
            .style(Style::default().fg(theme::WARNING))
            .block(panel_block(title, theme::BORDER));
        frame.render_widget(widget, area);
        return true;
    }
    if let Some(error) = &panel.error {
        let widget = Paragraph::new(error.clone())
            .style(Style::default().fg(theme::EXPENSES))
            .wrap(Wrap { trim: true })
            .block(panel_block(title, theme::BORDER));
        frame.render_widget(widget, area);
        return true;
    }
    false
}

fn draw_risk(frame: &mut Frame, app: &App, area: Rect) {
    let title = " Evaluación de Riesgo ";
    if loading_or_error(
        frame,
        &app.risk,
        title,
        "Evaluando tu perfil financiero...",
        area,
    ) {
        return;
    }
    let Some(risk) = &app.risk.data else {
        frame.render_widget(
            Paragraph::new("Sin evaluación todavía. r para actualizar.")
                .style(Style::default().fg(theme::TEXT_MUTED))
                .block(panel_block(title, theme::BORDER)),
            area,
        );
        return;
    };

    let level = risk.risk_level.as_deref().unwrap_or("unknown");
    // Same gauge mapping as the radial chart: low 30, medium 60, high 90.
    let percent: u16 = match level {
        "low" => 30,
        "medium" => 60,
        "high" => 90,
        _ => 0,
    };

    let block = panel_block(title, theme::BORDER);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(inner);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme::risk_color(level)))
        .percent(percent)
        .label(Span::styled(
            format!("Nivel de riesgo: {level}"),
            Style::default()
                .fg(theme::TEXT)
                .add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(gauge, rows[0]);

    let mut lines = Vec::new();
    if let Some(ratio) = risk.avg_saving_ratio {
        lines.push(Line::from(format!("Tasa media de ahorro: {ratio:.2}%")));
    }
    if let Some(volatility) = risk.volatility {
        lines.push(Line::from(format!("Volatilidad de ahorros: {volatility:.2}")));
    }
    if let (Some(total), Some(ignored)) = (risk.total_records, risk.ignored_records) {
        lines.push(Line::from(Span::styled(
            format!("{total} registros evaluados, {ignored} ignorados"),
            Style::default().fg(theme::TEXT_MUTED),
        )));
    }
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().fg(theme::TEXT)),
        rows[1],
    );
}

fn draw_scenario(frame: &mut Frame, app: &App, area: Rect) {
    let title = " Escenario Hipotético ";
    if loading_or_error(frame, &app.scenario, title, "Simulando escenario...", area) {
        return;
    }

    let block = panel_block(title, theme::BORDER);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(inner);

    // Variable selector plus the ±200 controls.
    let mut spans: Vec<Span> = Vec::new();
    for delta in [DeltaType::Income, DeltaType::Expenses, DeltaType::Savings] {
        let style = if app.delta_type == delta {
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme::TEXT_MUTED)
        };
        spans.push(Span::styled(delta.label(), style));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(
        "(i/g/a elegir · + aumentar · - disminuir)",
        Style::default().fg(theme::TEXT_MUTED),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[0]);

    let Some(scenario) = &app.scenario.data else {
        return;
    };

    let trend = scenario.trend.as_deref().unwrap_or("—");
    let trend_color = if trend == "positiva" {
        theme::INCOME
    } else {
        theme::EXPENSES
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(
            format!("Tendencia {trend}"),
            Style::default().fg(trend_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "  · impacto {}",
                scenario.impact_level.as_deref().unwrap_or("—")
            ),
            Style::default().fg(theme::TEXT_MUTED),
        ),
    ])];
    if let Some(insight) = &scenario.insight {
        lines.push(Line::from(insight.as_str()));
    }
    if let Some(metrics) = &scenario.metrics {
        lines.push(Line::from(format!(
            "Simulado: ingresos ${:.2} · gastos ${:.2} · ahorros ${:.2}",
            metrics.income, metrics.expenses, metrics.savings
        )));
        lines.push(Line::from(Span::styled(
            format!(
                "Promedios: ${:.2} / ${:.2} / ${:.2} (Δ {:+.1}% / {:+.1}% / {:+.1}%)",
                metrics.avg_income,
                metrics.avg_expenses,
                metrics.avg_savings,
                metrics.change_income,
                metrics.change_expenses,
                metrics.change_savings
            ),
            Style::default().fg(theme::TEXT_MUTED),
        )));
    }
    for action in &scenario.actions {
        lines.push(Line::from(format!("• {action}")));
    }
    if let (Some(valid), Some(ignored)) = (scenario.valid_records, scenario.ignored_records) {
        lines.push(Line::from(Span::styled(
            format!("{valid} registros válidos, {ignored} ignorados"),
            Style::default().fg(theme::TEXT_MUTED),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(theme::TEXT)),
        rows[1],
    );
}

fn draw_forecast(frame: &mut Frame, app: &App, area: Rect) {
    let title = " Pronóstico de Ahorros ";
    if loading_or_error(
        frame,
        &app.forecast,
        title,
        "Analizando tendencia de ahorros...",
        area,
    ) {
        return;
    }
    let Some(forecast) = &app.forecast.data else {
        frame.render_widget(
            Paragraph::new("Sin pronóstico todavía. r para generar.")
                .style(Style::default().fg(theme::TEXT_MUTED))
                .block(panel_block(title, theme::BORDER)),
            area,
        );
        return;
    };

    let mut lines = Vec::new();

    // The backend's escape hatch when there is not enough data.
    if let Some(message) = &forecast.message {
        lines.push(Line::from(Span::styled(
            message.as_str(),
            Style::default().fg(theme::WARNING),
        )));
    }

    if let Some(estimate) = forecast.next_savings_estimate {
        lines.push(Line::from(vec![
            Span::raw("Próximo ahorro estimado: "),
            Span::styled(
                format!("${estimate:.2}"),
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
    }
    if let Some(trend) = &forecast.trend {
        let color = if trend == "positiva" {
            theme::INCOME
        } else {
            theme::EXPENSES
        };
        lines.push(Line::from(vec![
            Span::raw("Tendencia: "),
            Span::styled(trend.as_str(), Style::default().fg(color)),
        ]));
    }
    if let Some(slope) = forecast.slope {
        lines.push(Line::from(format!("Pendiente: {slope:.2}")));
    }
    let risk = forecast.risk_level.as_deref().unwrap_or("desconocido");
    lines.push(Line::from(Span::styled(
        format!("Nivel de riesgo: {risk}"),
        Style::default().fg(theme::risk_color(risk)),
    )));
    if let Some(insight) = &forecast.insight {
        lines.push(Line::from(insight.as_str()));
    }
    if !forecast.highlights.is_empty() {
        lines.push(Line::from(Span::styled(
            "Observaciones:",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for highlight in &forecast.highlights {
            lines.push(Line::from(format!("• {highlight}")));
        }
    }
    if !forecast.actions.is_empty() {
        lines.push(Line::from(Span::styled(
            "Recomendaciones:",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for action in &forecast.actions {
            lines.push(Line::from(format!("• {action}")));
        }
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(theme::TEXT))
            .block(panel_block(title, theme::BORDER)),
        area,
    );
}
