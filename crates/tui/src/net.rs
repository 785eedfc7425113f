//! Background requests.
//!
//! The UI thread never blocks on the network: each action spawns a short
//! lived worker thread that runs one blocking request and reports the result
//! over an mpsc channel. The receiver is drained once per tick. There is no
//! cancellation and no retry; a panel that fired a request simply waits for
//! its single answer.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use api_client::{ApiClient, ApiError};
use models::{
    AssistantResponse, FinancialRecord, FinancialRecordOut, ForecastResponse, HistoryRequest,
    RiskSummary, ScenarioRequest, ScenarioResponse, Session, SummaryResponse,
};

use ai_client::AiClient;

pub enum FetchEvent {
    LoginDone(Result<Session, ApiError>),
    HistoryLoaded(Result<Vec<FinancialRecordOut>, ApiError>),
    SummaryLoaded(Result<SummaryResponse, ApiError>),
    ForecastLoaded(Result<ForecastResponse, ApiError>),
    RiskLoaded(Result<RiskSummary, ApiError>),
    ScenarioLoaded(Result<ScenarioResponse, ApiError>),
    AssistantReplied(Result<AssistantResponse, ApiError>),
    UploadDone(Result<(), ApiError>),
    DeleteDone(Result<(), ApiError>),
}

pub struct Fetcher {
    api: Arc<ApiClient>,
    ai: AiClient,
    tx: Sender<FetchEvent>,
}

impl Fetcher {
    pub fn new(api: Arc<ApiClient>) -> (Self, Receiver<FetchEvent>) {
        let (tx, rx) = channel();
        let ai = AiClient::new(api.clone());
        (Self { api, ai, tx }, rx)
    }

    pub fn clear_token(&self) {
        self.api.clear_token();
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() -> FetchEvent + Send + 'static,
    {
        let tx = self.tx.clone();
        thread::spawn(move || {
            // The receiver disappearing just means the app is shutting down.
            let _ = tx.send(job());
        });
    }

    /// Login then profile, the same two-step flow as the web login page:
    /// the token is installed as soon as it arrives so the profile request
    /// can use it.
    pub fn login(&self, email: String, password: String) {
        let api = self.api.clone();
        self.spawn(move || {
            let result = (|| {
                let token = api.login(&email, &password)?;
                api.set_token(token.access_token.clone());
                let profile = api.profile()?;
                Ok(Session {
                    token: token.access_token,
                    user_email: email.clone(),
                    full_name: profile.full_name,
                })
            })();
            if result.is_err() {
                api.clear_token();
            }
            FetchEvent::LoginDone(result)
        });
    }

    pub fn history(&self, request: HistoryRequest) {
        let api = self.api.clone();
        self.spawn(move || FetchEvent::HistoryLoaded(api.financial_history(&request)));
    }

    pub fn summary(&self) {
        let ai = self.ai.clone();
        self.spawn(move || FetchEvent::SummaryLoaded(ai.summary()));
    }

    pub fn forecast(&self) {
        let ai = self.ai.clone();
        self.spawn(move || FetchEvent::ForecastLoaded(ai.forecast()));
    }

    pub fn risk_summary(&self) {
        let ai = self.ai.clone();
        self.spawn(move || FetchEvent::RiskLoaded(ai.risk_summary()));
    }

    pub fn scenario(&self, request: ScenarioRequest) {
        let ai = self.ai.clone();
        self.spawn(move || FetchEvent::ScenarioLoaded(ai.scenario(&request)));
    }

    pub fn assistant(&self, message: String) {
        let ai = self.ai.clone();
        self.spawn(move || FetchEvent::AssistantReplied(ai.assistant(&message, None)));
    }

    pub fn upload(&self, record: FinancialRecord) {
        let api = self.api.clone();
        self.spawn(move || FetchEvent::UploadDone(api.upload_record(&record)));
    }

    pub fn delete(&self, id: String) {
        let api = self.api.clone();
        self.spawn(move || FetchEvent::DeleteDone(api.delete_record(&id)));
    }
}
