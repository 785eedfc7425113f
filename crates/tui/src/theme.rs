//! Color scheme for the terminal dashboard.
//!
//! Mirrors the product palette: deep green primary, lime accent, semantic
//! green/red/blue for income/expenses/savings.

use ratatui::style::Color;

pub const PRIMARY: Color = Color::Rgb(9, 52, 47);
pub const ACCENT: Color = Color::Rgb(217, 249, 157);

pub const TEXT: Color = Color::Rgb(229, 231, 235);
pub const TEXT_MUTED: Color = Color::Rgb(156, 163, 175);

pub const INCOME: Color = Color::Rgb(22, 163, 74);
pub const EXPENSES: Color = Color::Rgb(220, 38, 38);
pub const SAVINGS: Color = Color::Rgb(37, 99, 235);

pub const WARNING: Color = Color::Rgb(245, 158, 11);

pub const BORDER: Color = Color::Rgb(75, 85, 99);

/// Risk level to gauge color, the mapping used by the risk panel.
pub fn risk_color(level: &str) -> Color {
    match level {
        "low" => INCOME,
        "medium" => WARNING,
        "high" => EXPENSES,
        _ => TEXT_MUTED,
    }
}
