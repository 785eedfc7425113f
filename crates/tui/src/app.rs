//! Application state and event handling.
//!
//! One `App` owns everything the screens show: the session, the in-memory
//! record list shared across views, per-screen form state and the loading /
//! error strings each panel displays. Background fetches report back through
//! an mpsc channel drained once per tick; every mutation happens on the UI
//! thread.

use std::sync::mpsc::{Receiver, TryRecvError};
use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use api_client::{ApiClient, ApiError};
use dashboard_engine::{
    group_by_month, sort_aggregates, BalanceField, BalanceForm, MonthlyAggregate, SortField,
    SortState,
};
use models::{
    AssistantResponse, ChatMessage, ChatRole, FinancialRecord, FinancialRecordOut,
    ForecastResponse, HistoryRequest, RiskSummary, ScenarioRequest, ScenarioResponse, Session,
    SummaryResponse,
};
use session::SessionStore;

use crate::net::{FetchEvent, Fetcher};

pub const CATEGORIES: [&str; 5] = [
    "Salario",
    "Inversión",
    "Entretenimiento",
    "Gastos Fijos",
    "Otros",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dashboard,
    History,
    Upload,
    Insights,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MsgKind {
    Error,
    Success,
    Info,
}

/// A panel that fetches one remote result: the forecast, risk and scenario
/// views all look like this. One request, a loading overlay, an error string.
#[derive(Debug, Default)]
pub struct Panel<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Panel<T> {
    fn start(&mut self) {
        self.loading = true;
        self.error = None;
    }

    fn finish(&mut self, result: Result<T, String>) {
        self.loading = false;
        match result {
            Ok(data) => self.data = Some(data),
            Err(message) => self.error = Some(message),
        }
    }
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus_password: bool,
    pub loading: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFocus {
    Income,
    Expenses,
    Savings,
    Month,
    Category,
    Description,
}

pub struct UploadForm {
    pub balance: BalanceForm,
    pub income_input: String,
    pub expenses_input: String,
    pub savings_input: String,
    pub month_input: String,
    pub category_ix: Option<usize>,
    pub description: String,
    pub focus: UploadFocus,
    pub errors: Vec<dashboard_engine::ValidationError>,
    pub loading: bool,
    pub toast: Option<(MsgKind, String)>,
}

impl UploadForm {
    fn new() -> Self {
        Self {
            balance: BalanceForm::default(),
            income_input: "0".to_string(),
            expenses_input: "0".to_string(),
            savings_input: "0".to_string(),
            month_input: Local::now().format("%Y-%m").to_string(),
            category_ix: None,
            description: String::new(),
            focus: UploadFocus::Income,
            errors: Vec::new(),
            loading: false,
            toast: None,
        }
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    /// Re-applies the balance rule after a keystroke in one of the three
    /// amount fields, then refreshes the other two text buffers so the user
    /// sees the recomputed values immediately.
    fn amount_changed(&mut self, field: BalanceField) {
        let value = match field {
            BalanceField::Income => parse_amount(&self.income_input),
            BalanceField::Expenses => parse_amount(&self.expenses_input),
            BalanceField::Savings => parse_amount(&self.savings_input),
        };
        self.balance.apply_edit(field, value);
        if field != BalanceField::Income {
            self.income_input = format_amount(self.balance.income);
        }
        if field != BalanceField::Expenses {
            self.expenses_input = format_amount(self.balance.expenses);
        }
        if field != BalanceField::Savings {
            self.savings_input = format_amount(self.balance.savings);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryFocus {
    Table,
    StartMonth,
    EndMonth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeltaType {
    Income,
    #[default]
    Expenses,
    Savings,
}

impl DeltaType {
    pub fn label(self) -> &'static str {
        match self {
            DeltaType::Income => "Ingresos",
            DeltaType::Expenses => "Gastos",
            DeltaType::Savings => "Ahorros",
        }
    }
}

pub struct App {
    pub screen: Screen,
    pub should_quit: bool,
    pub session: Option<Session>,

    // Shared financial state (what the web app kept in its shared context)
    pub records: Vec<FinancialRecordOut>,
    pub records_loading: bool,
    refresh_records: bool,
    refresh_ai: bool,

    // Login
    pub login: LoginForm,

    // Dashboard
    pub summary: Panel<SummaryResponse>,
    pub selected_month: Option<String>,

    // History
    pub history_rows: Vec<MonthlyAggregate>,
    pub sort: SortState,
    pub history_focus: HistoryFocus,
    pub start_month: String,
    pub end_month: String,
    pub table_ix: usize,
    pub expanded: bool,
    pub record_ix: usize,
    pub confirm_delete: Option<String>,
    pub history_message: Option<(MsgKind, String)>,
    pub delete_loading: bool,

    // Upload
    pub upload: UploadForm,

    // Insights
    pub forecast: Panel<ForecastResponse>,
    pub risk: Panel<RiskSummary>,
    pub scenario: Panel<ScenarioResponse>,
    pub delta_type: DeltaType,

    // Chat
    pub chat: Vec<ChatMessage>,
    pub chat_input: String,
    pub chat_loading: bool,
    pub chat_scroll: u16,

    fetcher: Fetcher,
    events: Receiver<FetchEvent>,
    store: SessionStore,
}

impl App {
    pub fn new(api: Arc<ApiClient>, store: SessionStore) -> Self {
        let (fetcher, events) = Fetcher::new(api.clone());

        // Restore the stored session if its token is still usable.
        let session = store.load().filter(|s| {
            let ok = auth::token_is_valid(&s.token, Utc::now());
            if !ok {
                tracing::info!("stored session expired, discarding");
                let _ = store.clear();
            }
            ok
        });

        let (screen, refresh) = match &session {
            Some(s) => {
                api.set_token(s.token.clone());
                (Screen::Dashboard, true)
            }
            None => (Screen::Login, false),
        };

        let chat = store.load_chat();

        Self {
            screen,
            should_quit: false,
            session,
            records: Vec::new(),
            records_loading: false,
            refresh_records: refresh,
            refresh_ai: false,
            login: LoginForm::default(),
            summary: Panel::default(),
            selected_month: None,
            history_rows: Vec::new(),
            sort: SortState::default(),
            history_focus: HistoryFocus::Table,
            start_month: String::new(),
            end_month: String::new(),
            table_ix: 0,
            expanded: false,
            record_ix: 0,
            confirm_delete: None,
            history_message: None,
            delete_loading: false,
            upload: UploadForm::new(),
            forecast: Panel::default(),
            risk: Panel::default(),
            scenario: Panel::default(),
            delta_type: DeltaType::default(),
            chat,
            chat_input: String::new(),
            chat_loading: false,
            chat_scroll: 0,
            fetcher,
            events,
            store,
        }
    }

    pub fn user_email(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user_email.as_str())
    }

    pub fn full_name(&self) -> &str {
        self.session
            .as_ref()
            .map(|s| s.full_name.as_str())
            .unwrap_or("Usuario")
    }

    /// True while a text field owns the keyboard, so global shortcuts
    /// (quit, screen switching by letter) must stay out of the way.
    pub fn editing(&self) -> bool {
        match self.screen {
            Screen::Login => true,
            Screen::Upload => !matches!(self.upload.focus, UploadFocus::Category),
            Screen::Chat => true,
            Screen::History => self.history_focus != HistoryFocus::Table,
            _ => false,
        }
    }

    // Background events

    pub fn drain_fetch_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.on_fetch_event(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    /// Turns a request failure into the panel's message, or wipes the
    /// session when the failure means the token is no longer accepted.
    fn describe_failure(&mut self, err: &ApiError, fallback: &str) -> Option<String> {
        if err.is_unauthorized() {
            self.force_logout("Sesión expirada. Inicia sesión nuevamente.");
            None
        } else {
            tracing::warn!(error = %err, "request failed");
            Some(fallback.to_string())
        }
    }

    fn on_fetch_event(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::LoginDone(result) => {
                self.login.loading = false;
                match result {
                    Ok(session) => {
                        if let Err(e) = self.store.save(&session) {
                            tracing::warn!(error = %e, "could not persist session");
                        }
                        self.session = Some(session);
                        self.login = LoginForm::default();
                        self.screen = Screen::Dashboard;
                        self.refresh_records = true;
                    }
                    Err(_) => {
                        self.login.message =
                            Some("Credenciales inválidas o error en el servidor.".to_string());
                    }
                }
            }
            FetchEvent::HistoryLoaded(result) => {
                self.records_loading = false;
                match result {
                    Ok(records) => {
                        self.records = records;
                        self.rebuild_history_rows();
                        self.history_message = None;
                    }
                    Err(err) => {
                        if let Some(msg) =
                            self.describe_failure(&err, "Error al cargar el historial.")
                        {
                            self.history_message = Some((MsgKind::Error, msg));
                        }
                    }
                }
            }
            FetchEvent::SummaryLoaded(result) => match result {
                Ok(summary) => self.summary.finish(Ok(summary)),
                Err(err) => {
                    // Only an invalid session reaches here; other failures
                    // were already degraded into a summary string.
                    if let Some(msg) = self.describe_failure(&err, ai_client::SUMMARY_UNAVAILABLE) {
                        self.summary.finish(Err(msg));
                    } else {
                        self.summary.loading = false;
                    }
                }
            },
            FetchEvent::ForecastLoaded(result) => match result {
                Ok(forecast) => self.forecast.finish(Ok(forecast)),
                Err(err) => {
                    if let Some(msg) = self
                        .describe_failure(&err, "Error generando pronóstico. Intente nuevamente.")
                    {
                        self.forecast.finish(Err(msg));
                    } else {
                        self.forecast.loading = false;
                    }
                }
            },
            FetchEvent::RiskLoaded(result) => match result {
                Ok(risk) => self.risk.finish(Ok(risk)),
                Err(err) => {
                    if let Some(msg) = self.describe_failure(
                        &err,
                        "Error generando evaluación de riesgo. Intente nuevamente.",
                    ) {
                        self.risk.finish(Err(msg));
                    } else {
                        self.risk.loading = false;
                    }
                }
            },
            FetchEvent::ScenarioLoaded(result) => match result {
                Ok(scenario) => self.scenario.finish(Ok(scenario)),
                Err(err) => {
                    if let Some(msg) = self.describe_failure(&err, "Error generando el escenario.")
                    {
                        self.scenario.finish(Err(msg));
                    } else {
                        self.scenario.loading = false;
                    }
                }
            },
            FetchEvent::AssistantReplied(result) => {
                self.chat_loading = false;
                match result {
                    Ok(response) => {
                        let text = reply_text(&response);
                        self.push_chat(ChatRole::Ai, text);
                    }
                    Err(err) => {
                        if self
                            .describe_failure(&err, "Error al conectar con FinScope AI.")
                            .is_some()
                        {
                            self.push_chat(
                                ChatRole::Ai,
                                "Error al conectar con FinScope AI.".to_string(),
                            );
                        }
                    }
                }
            }
            FetchEvent::UploadDone(result) => {
                self.upload.loading = false;
                match result {
                    Ok(()) => {
                        self.upload.reset();
                        self.upload.toast =
                            Some((MsgKind::Success, "Registro guardado correctamente.".into()));
                        self.refresh_records = true;
                        self.refresh_ai = true;
                    }
                    Err(err) => {
                        if let Some(msg) =
                            self.describe_failure(&err, "Error al guardar el registro.")
                        {
                            self.upload.toast = Some((MsgKind::Error, msg));
                        }
                    }
                }
            }
            FetchEvent::DeleteDone(result) => {
                self.delete_loading = false;
                match result {
                    Ok(()) => {
                        self.history_message =
                            Some((MsgKind::Success, "Registro eliminado correctamente.".into()));
                        self.refresh_records = true;
                        self.refresh_ai = true;
                    }
                    Err(err) => {
                        if let Some(msg) =
                            self.describe_failure(&err, "Error al eliminar el registro.")
                        {
                            self.history_message = Some((MsgKind::Error, msg));
                        }
                    }
                }
            }
        }
    }

    /// Reacts to the shared refresh flags once per tick: record changes
    /// refetch the list, and re-trigger the AI panels when they are visible.
    pub fn process_refresh_flags(&mut self) {
        if self.session.is_none() {
            self.refresh_records = false;
            self.refresh_ai = false;
            return;
        }
        if self.refresh_records && !self.records_loading {
            self.refresh_records = false;
            self.spawn_history();
            self.spawn_summary();
        }
        if self.refresh_ai && self.screen == Screen::Insights {
            self.refresh_ai = false;
            self.fetch_insights();
        }
    }

    fn rebuild_history_rows(&mut self) {
        self.history_rows = group_by_month(&self.records);
        sort_aggregates(&mut self.history_rows, self.sort);
        if self.table_ix >= self.history_rows.len() {
            self.table_ix = self.history_rows.len().saturating_sub(1);
        }
        self.record_ix = 0;
        self.sync_selected_month();
    }

    fn sync_selected_month(&mut self) {
        self.selected_month = self
            .history_rows
            .get(self.table_ix)
            .map(|row| row.month_key.clone());
    }

    // Fetch triggers

    fn spawn_history(&mut self) {
        let email = match self.user_email() {
            Some(e) => e.to_string(),
            None => {
                self.history_message = Some((
                    MsgKind::Error,
                    "No hay usuario en sesión. Vuelve a iniciar sesión.".to_string(),
                ));
                return;
            }
        };
        // Range filter only applies when both ends are set.
        let (start, end) = match (
            parse_month_start(&self.start_month),
            parse_month_start(&self.end_month),
        ) {
            (Some(s), Some(e)) => (Some(s), Some(e)),
            _ => (None, None),
        };
        let request = HistoryRequest {
            user_email: email,
            start_date: start,
            end_date: end,
        };
        self.records_loading = true;
        self.fetcher.history(request);
    }

    fn spawn_summary(&mut self) {
        if self.summary.loading {
            return;
        }
        self.summary.start();
        self.fetcher.summary();
    }

    pub fn fetch_insights(&mut self) {
        // Three independent panels, fired together, no ordering between them.
        if !self.forecast.loading {
            self.forecast.start();
            self.fetcher.forecast();
        }
        if !self.risk.loading {
            self.risk.start();
            self.fetcher.risk_summary();
        }
        self.simulate_scenario(0.0);
    }

    fn simulate_scenario(&mut self, change: f64) {
        if self.scenario.loading {
            return;
        }
        let request = match self.delta_type {
            DeltaType::Income => ScenarioRequest {
                delta_income: Some(change),
                ..Default::default()
            },
            DeltaType::Expenses => ScenarioRequest {
                delta_expenses: Some(change),
                ..Default::default()
            },
            DeltaType::Savings => ScenarioRequest {
                delta_savings: Some(change),
                ..Default::default()
            },
        };
        self.scenario.start();
        self.fetcher.scenario(request);
    }

    fn submit_login(&mut self) {
        if self.login.loading {
            return;
        }
        let email = self.login.email.trim().to_string();
        let password = self.login.password.clone();
        if email.is_empty() || password.is_empty() {
            self.login.message = Some("Completa correo y contraseña.".to_string());
            return;
        }
        self.login.loading = true;
        self.login.message = None;
        self.fetcher.login(email, password);
    }

    fn submit_upload(&mut self) {
        if self.upload.loading {
            return;
        }
        let category = self
            .upload
            .category_ix
            .map(|ix| CATEGORIES[ix].to_string());
        self.upload.errors =
            dashboard_engine::validate_form(&self.upload.balance, category.as_deref());
        if !self.upload.errors.is_empty() {
            return;
        }
        let email = match self.user_email() {
            Some(e) => e.to_string(),
            None => return,
        };
        // The month input becomes a real first-of-month date.
        let Some(date) = parse_month_start(&self.upload.month_input) else {
            self.upload.toast = Some((MsgKind::Error, "Mes inválido (usa AAAA-MM).".into()));
            return;
        };
        let record = FinancialRecord {
            user_email: email,
            income: self.upload.balance.income,
            expenses: self.upload.balance.expenses,
            savings: self.upload.balance.savings,
            category,
            description: if self.upload.description.trim().is_empty() {
                None
            } else {
                Some(self.upload.description.trim().to_string())
            },
            date,
        };
        self.upload.loading = true;
        self.upload.toast = None;
        self.fetcher.upload(record);
    }

    fn send_chat_message(&mut self) {
        if self.chat_loading || self.chat_input.trim().is_empty() {
            return;
        }
        let text = self.chat_input.trim().to_string();
        self.chat_input.clear();
        self.push_chat(ChatRole::User, text.clone());
        self.chat_loading = true;
        self.fetcher.assistant(text);
    }

    fn push_chat(&mut self, role: ChatRole, text: String) {
        self.chat.push(ChatMessage { role, text });
        if let Err(e) = self.store.save_chat(&self.chat) {
            tracing::warn!(error = %e, "could not cache chat transcript");
        }
    }

    fn clear_chat(&mut self) {
        self.chat.clear();
        if let Err(e) = self.store.clear_chat() {
            tracing::warn!(error = %e, "could not clear chat transcript");
        }
    }

    pub fn logout(&mut self) {
        self.force_logout("");
    }

    fn force_logout(&mut self, message: &str) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "could not clear session store");
        }
        self.fetcher.clear_token();
        self.session = None;
        self.records.clear();
        self.history_rows.clear();
        self.summary = Panel::default();
        self.forecast = Panel::default();
        self.risk = Panel::default();
        self.scenario = Panel::default();
        self.chat.clear();
        self.history_message = None;
        self.confirm_delete = None;
        self.login = LoginForm::default();
        if !message.is_empty() {
            self.login.message = Some(message.to_string());
        }
        self.screen = Screen::Login;
    }

    fn switch_screen(&mut self, screen: Screen) {
        if self.session.is_none() {
            return;
        }
        let entering = self.screen != screen;
        self.screen = screen;
        if !entering {
            return;
        }
        match screen {
            Screen::Dashboard | Screen::History => {
                if self.records.is_empty() && !self.records_loading {
                    self.refresh_records = true;
                }
            }
            Screen::Insights => {
                if self.forecast.data.is_none() || self.refresh_ai {
                    self.refresh_ai = false;
                    self.fetch_insights();
                }
            }
            _ => {}
        }
    }

    // Keyboard

    pub fn on_key(&mut self, key: KeyEvent) {
        // Ctrl-C always quits, whatever owns the keyboard.
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.session.is_some() {
            match key.code {
                KeyCode::F(1) => return self.switch_screen(Screen::Dashboard),
                KeyCode::F(2) => return self.switch_screen(Screen::History),
                KeyCode::F(3) => return self.switch_screen(Screen::Upload),
                KeyCode::F(4) => return self.switch_screen(Screen::Insights),
                KeyCode::F(5) => return self.switch_screen(Screen::Chat),
                KeyCode::F(10) => return self.logout(),
                KeyCode::Char('q') if !self.editing() => {
                    self.should_quit = true;
                    return;
                }
                _ => {}
            }
        }

        match self.screen {
            Screen::Login => self.on_login_key(key),
            Screen::Dashboard => self.on_dashboard_key(key),
            Screen::History => self.on_history_key(key),
            Screen::Upload => self.on_upload_key(key),
            Screen::Insights => self.on_insights_key(key),
            Screen::Chat => self.on_chat_key(key),
        }
    }

    fn on_login_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab | KeyCode::Up | KeyCode::Down => {
                self.login.focus_password = !self.login.focus_password;
            }
            KeyCode::Enter => self.submit_login(),
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Backspace => {
                if self.login.focus_password {
                    self.login.password.pop();
                } else {
                    self.login.email.pop();
                }
            }
            KeyCode::Char(c) => {
                if self.login.focus_password {
                    self.login.password.push(c);
                } else {
                    self.login.email.push(c);
                }
            }
            _ => {}
        }
    }

    fn on_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') => self.refresh_records = true,
            KeyCode::Left => self.move_month_selection(-1),
            KeyCode::Right => self.move_month_selection(1),
            _ => {}
        }
    }

    fn move_month_selection(&mut self, delta: i64) {
        let months = dashboard_engine::trend_series(&self.records);
        if months.is_empty() {
            return;
        }
        let current = self
            .selected_month
            .as_deref()
            .and_then(|sel| months.iter().position(|m| m.month_key == sel))
            .unwrap_or(months.len() - 1);
        let next = (current as i64 + delta).clamp(0, months.len() as i64 - 1) as usize;
        self.selected_month = Some(months[next].month_key.clone());
    }

    fn on_history_key(&mut self, key: KeyEvent) {
        // A pending delete confirmation swallows the keyboard.
        if let Some(id) = self.confirm_delete.clone() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.confirm_delete = None;
                    self.delete_loading = true;
                    self.fetcher.delete(id);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_delete = None;
                }
                _ => {}
            }
            return;
        }

        match self.history_focus {
            HistoryFocus::Table => self.on_history_table_key(key),
            HistoryFocus::StartMonth | HistoryFocus::EndMonth => self.on_history_filter_key(key),
        }
    }

    fn on_history_table_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => {
                if self.expanded {
                    self.record_ix = self.record_ix.saturating_sub(1);
                } else if self.table_ix > 0 {
                    self.table_ix -= 1;
                    self.sync_selected_month();
                }
            }
            KeyCode::Down => {
                if self.expanded {
                    let len = self.current_row_record_count();
                    if self.record_ix + 1 < len {
                        self.record_ix += 1;
                    }
                } else if self.table_ix + 1 < self.history_rows.len() {
                    self.table_ix += 1;
                    self.sync_selected_month();
                }
            }
            KeyCode::Enter => {
                if !self.history_rows.is_empty() {
                    self.expanded = !self.expanded;
                    self.record_ix = 0;
                }
            }
            KeyCode::Esc if self.expanded => self.expanded = false,
            // Column sort shortcuts: repeated presses flip the direction.
            KeyCode::Char('m') => self.toggle_sort(SortField::Month),
            KeyCode::Char('i') => self.toggle_sort(SortField::Income),
            KeyCode::Char('g') => self.toggle_sort(SortField::Expenses),
            KeyCode::Char('a') => self.toggle_sort(SortField::Savings),
            KeyCode::Char('f') => self.history_focus = HistoryFocus::StartMonth,
            KeyCode::Char('r') => self.refresh_records = true,
            KeyCode::Char('d') if self.expanded => {
                if let Some(id) = self.selected_record_id() {
                    self.confirm_delete = Some(id);
                }
            }
            _ => {}
        }
    }

    fn on_history_filter_key(&mut self, key: KeyEvent) {
        let buffer = match self.history_focus {
            HistoryFocus::StartMonth => &mut self.start_month,
            HistoryFocus::EndMonth => &mut self.end_month,
            HistoryFocus::Table => unreachable!(),
        };
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => buffer.push(c),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Tab => {
                self.history_focus = match self.history_focus {
                    HistoryFocus::StartMonth => HistoryFocus::EndMonth,
                    _ => HistoryFocus::StartMonth,
                };
            }
            KeyCode::Enter => {
                self.history_focus = HistoryFocus::Table;
                self.refresh_records = true;
            }
            KeyCode::Esc => self.history_focus = HistoryFocus::Table,
            _ => {}
        }
    }

    fn toggle_sort(&mut self, field: SortField) {
        self.sort.toggle(field);
        sort_aggregates(&mut self.history_rows, self.sort);
        self.table_ix = 0;
        self.sync_selected_month();
    }

    fn current_row_record_count(&self) -> usize {
        self.history_rows
            .get(self.table_ix)
            .map(|row| row.records.len())
            .unwrap_or(0)
    }

    fn selected_record_id(&self) -> Option<String> {
        self.history_rows
            .get(self.table_ix)?
            .records
            .get(self.record_ix)?
            .id
            .clone()
    }

    fn on_upload_key(&mut self, key: KeyEvent) {
        use UploadFocus::*;
        match key.code {
            KeyCode::Up | KeyCode::BackTab => {
                self.upload.focus = match self.upload.focus {
                    Income => Description,
                    Expenses => Income,
                    Savings => Expenses,
                    Month => Savings,
                    Category => Month,
                    Description => Category,
                };
            }
            KeyCode::Down | KeyCode::Tab => {
                self.upload.focus = match self.upload.focus {
                    Income => Expenses,
                    Expenses => Savings,
                    Savings => Month,
                    Month => Category,
                    Category => Description,
                    Description => Income,
                };
            }
            KeyCode::Enter => self.submit_upload(),
            KeyCode::Left if self.upload.focus == Category => self.cycle_category(-1),
            KeyCode::Right if self.upload.focus == Category => self.cycle_category(1),
            KeyCode::Backspace => self.upload_backspace(),
            KeyCode::Char(c) => self.upload_char(c),
            _ => {}
        }
    }

    fn cycle_category(&mut self, delta: i64) {
        let len = CATEGORIES.len() as i64;
        let next = match self.upload.category_ix {
            Some(ix) => (ix as i64 + delta).rem_euclid(len),
            None => {
                if delta >= 0 {
                    0
                } else {
                    len - 1
                }
            }
        };
        self.upload.category_ix = Some(next as usize);
    }

    fn upload_char(&mut self, c: char) {
        use UploadFocus::*;
        match self.upload.focus {
            Income | Expenses | Savings => {
                if !(c.is_ascii_digit() || c == '.') {
                    return;
                }
                let (buffer, field) = match self.upload.focus {
                    Income => (&mut self.upload.income_input, BalanceField::Income),
                    Expenses => (&mut self.upload.expenses_input, BalanceField::Expenses),
                    Savings => (&mut self.upload.savings_input, BalanceField::Savings),
                    _ => unreachable!(),
                };
                if *buffer == "0" && c != '.' {
                    buffer.clear();
                }
                buffer.push(c);
                self.upload.amount_changed(field);
            }
            Month => {
                if c.is_ascii_digit() || c == '-' {
                    self.upload.month_input.push(c);
                }
            }
            Category => {}
            Description => self.upload.description.push(c),
        }
    }

    fn upload_backspace(&mut self) {
        use UploadFocus::*;
        match self.upload.focus {
            Income => {
                self.upload.income_input.pop();
                self.upload.amount_changed(BalanceField::Income);
            }
            Expenses => {
                self.upload.expenses_input.pop();
                self.upload.amount_changed(BalanceField::Expenses);
            }
            Savings => {
                self.upload.savings_input.pop();
                self.upload.amount_changed(BalanceField::Savings);
            }
            Month => {
                self.upload.month_input.pop();
            }
            Category => self.upload.category_ix = None,
            Description => {
                self.upload.description.pop();
            }
        }
    }

    fn on_insights_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('i') => self.delta_type = DeltaType::Income,
            KeyCode::Char('g') => self.delta_type = DeltaType::Expenses,
            KeyCode::Char('a') => self.delta_type = DeltaType::Savings,
            KeyCode::Char('+') => self.simulate_scenario(200.0),
            KeyCode::Char('-') => self.simulate_scenario(-200.0),
            KeyCode::Char('r') => self.fetch_insights(),
            _ => {}
        }
    }

    fn on_chat_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('k') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.clear_chat();
            return;
        }
        match key.code {
            KeyCode::Enter => self.send_chat_message(),
            KeyCode::Backspace => {
                self.chat_input.pop();
            }
            KeyCode::Up => self.chat_scroll = self.chat_scroll.saturating_add(1),
            KeyCode::Down => self.chat_scroll = self.chat_scroll.saturating_sub(1),
            KeyCode::Char(c) => self.chat_input.push(c),
            _ => {}
        }
    }
}

fn reply_text(response: &AssistantResponse) -> String {
    response
        .reply()
        .map(str::to_string)
        .unwrap_or_else(|| "No se pudo obtener una respuesta.".to_string())
}

/// `parseFloat(value) || 0`, clamped at zero.
fn parse_amount(input: &str) -> f64 {
    input.parse::<f64>().unwrap_or(0.0).max(0.0)
}

fn format_amount(value: f64) -> String {
    if (value - value.round()).abs() < f64::EPSILON {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

/// "2025-03" -> 2025-03-01. Anything else is rejected.
fn parse_month_start(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(&format!("{input}-01"), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> App {
        let api = Arc::new(
            ApiClient::new(api_client::ApiClientConfig {
                base_url: "http://localhost:8000".to_string(),
                timeout_secs: None,
            })
            .unwrap(),
        );
        let dir = tempfile::tempdir().unwrap();
        App::new(api, SessionStore::new(dir.path()))
    }

    #[test]
    fn test_starts_on_login_without_session() {
        let app = test_app();
        assert_eq!(app.screen, Screen::Login);
        assert!(app.session.is_none());
    }

    #[test]
    fn test_unauthorized_response_wipes_session_and_returns_to_login() {
        let mut app = test_app();
        app.session = Some(Session {
            token: "h.p.s".to_string(),
            user_email: "marcelo@demo.com".to_string(),
            full_name: "Marcelo Demo".to_string(),
        });
        app.screen = Screen::History;

        app.on_fetch_event(FetchEvent::HistoryLoaded(Err(ApiError::Unauthorized)));

        assert!(app.session.is_none());
        assert_eq!(app.screen, Screen::Login);
        assert!(app.login.message.is_some());
        assert!(app.history_message.is_none());
    }

    #[test]
    fn test_failed_login_shows_credentials_message() {
        let mut app = test_app();
        app.on_fetch_event(FetchEvent::LoginDone(Err(ApiError::Network(
            "connection refused".to_string(),
        ))));
        assert_eq!(
            app.login.message.as_deref(),
            Some("Credenciales inválidas o error en el servidor.")
        );
        assert_eq!(app.screen, Screen::Login);
    }

    #[test]
    fn test_parse_amount_clamps_and_defaults() {
        assert_eq!(parse_amount("125.5"), 125.5);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount("-20"), 0.0);
    }

    #[test]
    fn test_parse_month_start() {
        assert_eq!(
            parse_month_start("2025-03"),
            NaiveDate::from_ymd_opt(2025, 3, 1)
        );
        assert_eq!(parse_month_start(""), None);
        assert_eq!(parse_month_start("2025-13"), None);
        assert_eq!(parse_month_start("03-2025"), None);
    }

    #[test]
    fn test_upload_form_amount_sync() {
        let mut form = UploadForm::new();
        form.income_input = "1000".to_string();
        form.amount_changed(BalanceField::Income);
        form.expenses_input = "600".to_string();
        form.amount_changed(BalanceField::Expenses);

        assert_eq!(form.balance.savings, 400.0);
        assert_eq!(form.savings_input, "400");

        form.savings_input = "900".to_string();
        form.amount_changed(BalanceField::Savings);
        assert_eq!(form.balance.expenses, 100.0);
        assert_eq!(form.expenses_input, "100");
    }
}
