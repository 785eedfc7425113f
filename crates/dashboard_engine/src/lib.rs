//! Client-side dashboard computations.
//!
//! The backend owns every analytical result; what remains on the client is
//! bookkeeping for the views: grouping flat records into monthly buckets,
//! sorting those buckets for the history table, summing global totals, and
//! the upload form's three-way balance rule. All of it is pure functions so
//! the screens stay thin.

use std::collections::BTreeMap;

use models::FinancialRecordOut;

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// Monthly aggregation

/// One history-table row: every record sharing a calendar month, summed.
#[derive(Debug, Clone)]
pub struct MonthlyAggregate {
    /// "YYYY-MM"
    pub month_key: String,
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
    pub records: Vec<FinancialRecordOut>,
}

/// Global sums across every record, independent of grouping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
}

pub fn totals(records: &[FinancialRecordOut]) -> Totals {
    let mut t = Totals::default();
    for r in records {
        t.income += r.income;
        t.expenses += r.expenses;
        t.savings += r.savings;
    }
    t.income = round2(t.income);
    t.expenses = round2(t.expenses);
    t.savings = round2(t.savings);
    t
}

/// Groups records by month key and sums each bucket. The result comes back
/// in ascending month order; the table re-sorts it by its own sort state.
pub fn group_by_month(records: &[FinancialRecordOut]) -> Vec<MonthlyAggregate> {
    let mut buckets: BTreeMap<String, MonthlyAggregate> = BTreeMap::new();
    for record in records {
        let key = record.month_key().to_string();
        let bucket = buckets
            .entry(key.clone())
            .or_insert_with(|| MonthlyAggregate {
                month_key: key,
                income: 0.0,
                expenses: 0.0,
                savings: 0.0,
                records: Vec::new(),
            });
        bucket.income += record.income;
        bucket.expenses += record.expenses;
        bucket.savings += record.savings;
        bucket.records.push(record.clone());
    }
    buckets
        .into_values()
        .map(|mut b| {
            b.income = round2(b.income);
            b.expenses = round2(b.expenses);
            b.savings = round2(b.savings);
            b
        })
        .collect()
}

// Table sorting

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Month,
    Income,
    Expenses,
    Savings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        // The table opens on newest months first.
        Self {
            field: SortField::Month,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    /// Selecting the active column flips the direction; selecting another
    /// column activates it descending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = match self.direction {
                SortDirection::Asc => SortDirection::Desc,
                SortDirection::Desc => SortDirection::Asc,
            };
        } else {
            self.field = field;
            self.direction = SortDirection::Desc;
        }
    }
}

/// Stable sort, so months with equal sums keep their previous order.
pub fn sort_aggregates(aggregates: &mut [MonthlyAggregate], state: SortState) {
    aggregates.sort_by(|a, b| {
        let ord = match state.field {
            SortField::Month => a.month_key.cmp(&b.month_key),
            SortField::Income => a.income.total_cmp(&b.income),
            SortField::Expenses => a.expenses.total_cmp(&b.expenses),
            SortField::Savings => a.savings.total_cmp(&b.savings),
        };
        match state.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

// Trend chart data

/// Chronological per-month series for the trend chart.
pub fn trend_series(records: &[FinancialRecordOut]) -> Vec<MonthlyAggregate> {
    // group_by_month already yields ascending month order
    group_by_month(records)
}

const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// "2025-01" -> "enero de 2025". None for keys that are not YYYY-MM.
pub fn month_label(month_key: &str) -> Option<String> {
    let (year, month) = month_key.split_once('-')?;
    let month: usize = month.parse().ok()?;
    if !(1..=12).contains(&month) || year.len() != 4 {
        return None;
    }
    Some(format!("{} de {}", MONTH_NAMES[month - 1], year))
}

/// Short form for chart axes: "2025-01" -> "ene 25".
pub fn month_label_short(month_key: &str) -> Option<String> {
    let (year, month) = month_key.split_once('-')?;
    let month: usize = month.parse().ok()?;
    if !(1..=12).contains(&month) || year.len() != 4 {
        return None;
    }
    Some(format!("{} {}", &MONTH_NAMES[month - 1][..3], &year[2..]))
}

// Upload form balance rule

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceField {
    Income,
    Expenses,
    Savings,
}

/// The three linked amounts of the upload form. Editing any one of them
/// recomputes a counterpart so that income = expenses + savings, everything
/// clamped at zero. Which counterpart moves depends on the edited field;
/// editing income prefers adjusting savings when expenses are already set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BalanceForm {
    pub income: f64,
    pub expenses: f64,
    pub savings: f64,
}

impl BalanceForm {
    pub fn apply_edit(&mut self, field: BalanceField, value: f64) {
        let value = value.max(0.0);
        match field {
            BalanceField::Income => {
                self.income = value;
                if self.expenses > 0.0 {
                    self.savings = (self.income - self.expenses).max(0.0);
                } else if self.savings > 0.0 {
                    self.expenses = (self.income - self.savings).max(0.0);
                }
            }
            BalanceField::Expenses => {
                self.expenses = value;
                self.savings = (self.income - self.expenses).max(0.0);
            }
            BalanceField::Savings => {
                self.savings = value;
                self.expenses = (self.income - self.savings).max(0.0);
            }
        }
    }

    pub fn is_balanced(&self) -> bool {
        (self.income - (self.expenses + self.savings)).abs() <= 0.01
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Form-level validation. The balance invariant is a form check only, never
/// a stored guarantee.
pub fn validate_form(form: &BalanceForm, category: Option<&str>) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if form.income <= 0.0 {
        errors.push(ValidationError {
            field: "income",
            message: "El ingreso debe ser mayor a 0.",
        });
    }
    if form.expenses < 0.0 {
        errors.push(ValidationError {
            field: "expenses",
            message: "El gasto no puede ser negativo.",
        });
    }
    if form.savings < 0.0 {
        errors.push(ValidationError {
            field: "savings",
            message: "El ahorro no puede ser negativo.",
        });
    }
    if !form.is_balanced() {
        errors.push(ValidationError {
            field: "savings",
            message: "Ingresos = Gastos + Ahorros debe cumplirse.",
        });
    }
    if category.map_or(true, |c| c.trim().is_empty()) {
        errors.push(ValidationError {
            field: "category",
            message: "Seleccione una categoría.",
        });
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, income: f64, expenses: f64, savings: f64) -> FinancialRecordOut {
        FinancialRecordOut {
            id: None,
            user_email: "marcelo@demo.com".to_string(),
            income,
            expenses,
            savings,
            record_date: date.to_string(),
            category: None,
            description: None,
        }
    }

    #[test]
    fn test_group_by_month_sums_buckets() {
        // Worked example: two January records aggregate into one row.
        let records = vec![
            record("2025-01-05", 1000.0, 600.0, 400.0),
            record("2025-01-20", 500.0, 500.0, 0.0),
        ];
        let grouped = group_by_month(&records);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].month_key, "2025-01");
        assert_eq!(grouped[0].income, 1500.0);
        assert_eq!(grouped[0].expenses, 1100.0);
        assert_eq!(grouped[0].savings, 400.0);
        assert_eq!(grouped[0].records.len(), 2);
    }

    #[test]
    fn test_monthly_sums_equal_global_totals() {
        let records = vec![
            record("2025-01-05", 1000.0, 600.0, 400.0),
            record("2025-01-20", 500.0, 500.0, 0.0),
            record("2025-02-01", 2500.0, 1000.0, 1500.0),
            record("2025-03-11", 800.0, 790.5, 9.5),
        ];
        let grouped = group_by_month(&records);
        let global = totals(&records);

        let sum_income: f64 = grouped.iter().map(|g| g.income).sum();
        let sum_expenses: f64 = grouped.iter().map(|g| g.expenses).sum();
        let sum_savings: f64 = grouped.iter().map(|g| g.savings).sum();

        assert!((sum_income - global.income).abs() < 1e-9);
        assert!((sum_expenses - global.expenses).abs() < 1e-9);
        assert!((sum_savings - global.savings).abs() < 1e-9);
    }

    #[test]
    fn test_group_by_month_handles_datetime_dates() {
        let records = vec![
            record("2025-01-05T00:00:00", 100.0, 40.0, 60.0),
            record("2025-01-09", 50.0, 50.0, 0.0),
        ];
        let grouped = group_by_month(&records);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].income, 150.0);
    }

    #[test]
    fn test_sort_toggle() {
        let mut state = SortState::default();
        assert_eq!(state.field, SortField::Month);
        assert_eq!(state.direction, SortDirection::Desc);

        state.toggle(SortField::Month);
        assert_eq!(state.direction, SortDirection::Asc);
        state.toggle(SortField::Month);
        assert_eq!(state.direction, SortDirection::Desc);

        state.toggle(SortField::Income);
        assert_eq!(state.field, SortField::Income);
        assert_eq!(state.direction, SortDirection::Desc);
    }

    #[test]
    fn test_sort_aggregates_by_income_desc() {
        let records = vec![
            record("2025-01-05", 100.0, 50.0, 50.0),
            record("2025-02-05", 300.0, 100.0, 200.0),
            record("2025-03-05", 200.0, 150.0, 50.0),
        ];
        let mut grouped = group_by_month(&records);
        sort_aggregates(
            &mut grouped,
            SortState {
                field: SortField::Income,
                direction: SortDirection::Desc,
            },
        );
        let keys: Vec<&str> = grouped.iter().map(|g| g.month_key.as_str()).collect();
        assert_eq!(keys, vec!["2025-02", "2025-03", "2025-01"]);
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let records = vec![
            record("2025-01-05", 100.0, 50.0, 50.0),
            record("2025-02-05", 100.0, 60.0, 40.0),
            record("2025-03-05", 100.0, 70.0, 30.0),
        ];
        let mut grouped = group_by_month(&records);
        // Equal income everywhere: ascending month order must survive.
        sort_aggregates(
            &mut grouped,
            SortState {
                field: SortField::Income,
                direction: SortDirection::Asc,
            },
        );
        let keys: Vec<&str> = grouped.iter().map(|g| g.month_key.as_str()).collect();
        assert_eq!(keys, vec!["2025-01", "2025-02", "2025-03"]);
    }

    #[test]
    fn test_month_labels() {
        assert_eq!(month_label("2025-01").as_deref(), Some("enero de 2025"));
        assert_eq!(
            month_label("2024-12").as_deref(),
            Some("diciembre de 2024")
        );
        assert_eq!(month_label_short("2025-09").as_deref(), Some("sep 25"));
        assert!(month_label("2025-13").is_none());
        assert!(month_label("garbage").is_none());
    }

    #[test]
    fn test_balance_income_edit_moves_savings_when_expenses_set() {
        let mut form = BalanceForm {
            income: 0.0,
            expenses: 600.0,
            savings: 0.0,
        };
        form.apply_edit(BalanceField::Income, 1000.0);
        assert_eq!(form.savings, 400.0);
        assert_eq!(form.expenses, 600.0);
        assert!(form.is_balanced());
    }

    #[test]
    fn test_balance_income_edit_moves_expenses_when_only_savings_set() {
        let mut form = BalanceForm {
            income: 0.0,
            expenses: 0.0,
            savings: 300.0,
        };
        form.apply_edit(BalanceField::Income, 1000.0);
        assert_eq!(form.expenses, 700.0);
        assert_eq!(form.savings, 300.0);
        assert!(form.is_balanced());
    }

    #[test]
    fn test_balance_expenses_edit_recomputes_savings() {
        let mut form = BalanceForm {
            income: 1000.0,
            expenses: 0.0,
            savings: 0.0,
        };
        form.apply_edit(BalanceField::Expenses, 250.0);
        assert_eq!(form.savings, 750.0);
    }

    #[test]
    fn test_balance_savings_edit_recomputes_expenses() {
        let mut form = BalanceForm {
            income: 1000.0,
            expenses: 400.0,
            savings: 600.0,
        };
        form.apply_edit(BalanceField::Savings, 900.0);
        assert_eq!(form.expenses, 100.0);
        assert!(form.is_balanced());
    }

    #[test]
    fn test_balance_clamps_at_zero() {
        let mut form = BalanceForm {
            income: 100.0,
            expenses: 0.0,
            savings: 0.0,
        };
        // Expenses larger than income: savings floors at zero.
        form.apply_edit(BalanceField::Expenses, 500.0);
        assert_eq!(form.savings, 0.0);
        assert_eq!(form.expenses, 500.0);
        assert!(!form.is_balanced());

        // Negative input is clamped before applying.
        form.apply_edit(BalanceField::Income, -50.0);
        assert_eq!(form.income, 0.0);
    }

    #[test]
    fn test_validate_form() {
        let ok = BalanceForm {
            income: 1000.0,
            expenses: 600.0,
            savings: 400.0,
        };
        assert!(validate_form(&ok, Some("Salario")).is_empty());

        let errors = validate_form(&ok, None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "category");

        let unbalanced = BalanceForm {
            income: 1000.0,
            expenses: 600.0,
            savings: 500.0,
        };
        let errors = validate_form(&unbalanced, Some("Otros"));
        assert!(errors
            .iter()
            .any(|e| e.message == "Ingresos = Gastos + Ahorros debe cumplirse."));

        let zero = BalanceForm::default();
        let errors = validate_form(&zero, Some("Otros"));
        assert!(errors.iter().any(|e| e.field == "income"));
    }
}
