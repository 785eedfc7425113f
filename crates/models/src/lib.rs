
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Settings models
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
	#[serde(default = "default_base_url")]
	pub base_url: String,
	#[serde(default)]
	pub data_dir: Option<std::path::PathBuf>,
	#[serde(default)]
	pub log_file: Option<std::path::PathBuf>,
	#[serde(default)]
	pub timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
	"http://localhost:8000".to_string()
}

impl Default for Settings {
	fn default() -> Self {
		Settings {
			base_url: default_base_url(),
			data_dir: None,
			log_file: None,
			timeout_secs: None,
		}
	}
}

// Auth models
#[derive(Debug, Serialize)]
pub struct LoginRequest {
	pub email: String,
	pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
	pub email: String,
	pub password: String,
	pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
	pub access_token: String,
	#[serde(default)]
	pub token_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
	#[serde(default)]
	pub email: Option<String>,
	pub full_name: String,
}

/// Locally persisted identity: token plus the profile fields the UI shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
	pub token: String,
	pub user_email: String,
	pub full_name: String,
}

// Financial records
#[derive(Debug, Clone, Serialize)]
pub struct FinancialRecord {
	pub user_email: String,
	pub income: f64,
	pub expenses: f64,
	pub savings: f64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub category: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub date: NaiveDate,
}

/// Record as returned by `/financial/history`. The server reports the date
/// as `record_date` (sometimes a full datetime); older payloads used `date`.
/// Kept as a string, the month key is its first seven characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialRecordOut {
	#[serde(default, alias = "_id")]
	pub id: Option<String>,
	pub user_email: String,
	#[serde(default)]
	pub income: f64,
	#[serde(default)]
	pub expenses: f64,
	#[serde(default)]
	pub savings: f64,
	#[serde(alias = "date")]
	pub record_date: String,
	#[serde(default)]
	pub category: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
}

impl FinancialRecordOut {
	/// "YYYY-MM" portion of the record date.
	pub fn month_key(&self) -> &str {
		let end = self.record_date.len().min(7);
		&self.record_date[..end]
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryRequest {
	pub user_email: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub start_date: Option<NaiveDate>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub end_date: Option<NaiveDate>,
}

// Chat transcript (cached locally, mirrors what the assistant panel shows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
	User,
	Ai,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
	pub role: ChatRole,
	pub text: String,
}

// AI response shapes. These are owned by the backend service: every field is
// optional or defaulted, the client only guards against absence.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastResponse {
	#[serde(default)]
	pub next_savings_estimate: Option<f64>,
	#[serde(default)]
	pub trend: Option<String>,
	#[serde(default)]
	pub slope: Option<f64>,
	#[serde(default)]
	pub insight: Option<String>,
	#[serde(default)]
	pub highlights: Vec<String>,
	#[serde(default)]
	pub actions: Vec<String>,
	#[serde(default)]
	pub risk_level: Option<String>,
	#[serde(default)]
	pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RiskSummary {
	#[serde(default)]
	pub avg_saving_ratio: Option<f64>,
	#[serde(default)]
	pub volatility: Option<f64>,
	#[serde(default)]
	pub risk_level: Option<String>,
	#[serde(default)]
	pub total_records: Option<u64>,
	#[serde(default)]
	pub ignored_records: Option<u64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScenarioRequest {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delta_income: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delta_expenses: Option<f64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub delta_savings: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioMetrics {
	#[serde(default)]
	pub income: f64,
	#[serde(default)]
	pub expenses: f64,
	#[serde(default)]
	pub savings: f64,
	#[serde(default)]
	pub avg_income: f64,
	#[serde(default)]
	pub avg_expenses: f64,
	#[serde(default)]
	pub avg_savings: f64,
	#[serde(default)]
	pub change_income: f64,
	#[serde(default)]
	pub change_expenses: f64,
	#[serde(default)]
	pub change_savings: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioResponse {
	#[serde(default)]
	pub trend: Option<String>,
	#[serde(default)]
	pub impact_level: Option<String>,
	#[serde(default)]
	pub insight: Option<String>,
	#[serde(default)]
	pub actions: Vec<String>,
	#[serde(default)]
	pub color: Option<String>,
	#[serde(default)]
	pub icon: Option<String>,
	#[serde(default)]
	pub metrics: Option<ScenarioMetrics>,
	#[serde(default)]
	pub valid_records: Option<u64>,
	#[serde(default)]
	pub ignored_records: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryResponse {
	#[serde(default)]
	pub summary: Option<String>,
	#[serde(default)]
	pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssistantRequest {
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub context: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistantResponse {
	#[serde(default)]
	pub model: Option<String>,
	#[serde(default)]
	pub answer: Option<String>,
	#[serde(default)]
	pub text: Option<String>,
	#[serde(default)]
	pub highlights: Vec<String>,
	#[serde(default)]
	pub actions: Vec<String>,
	#[serde(default)]
	pub risk_level: Option<String>,
}

impl AssistantResponse {
	/// Display text: `answer` first, legacy `text` as fallback.
	pub fn reply(&self) -> Option<&str> {
		self.answer.as_deref().or(self.text.as_deref())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_record_out_accepts_date_alias() {
		let json = r#"{
			"id": "a1",
			"user_email": "marcelo@demo.com",
			"income": 2500.0,
			"expenses": 1000.0,
			"savings": 1500.0,
			"date": "2025-11-02"
		}"#;
		let rec: FinancialRecordOut = serde_json::from_str(json).unwrap();
		assert_eq!(rec.record_date, "2025-11-02");
		assert_eq!(rec.month_key(), "2025-11");
	}

	#[test]
	fn test_record_out_month_key_from_datetime() {
		let json = r#"{
			"user_email": "marcelo@demo.com",
			"income": 100.0,
			"expenses": 60.0,
			"savings": 40.0,
			"record_date": "2025-01-05T00:00:00"
		}"#;
		let rec: FinancialRecordOut = serde_json::from_str(json).unwrap();
		assert_eq!(rec.month_key(), "2025-01");
	}

	#[test]
	fn test_scenario_request_serializes_only_edited_delta() {
		let req = ScenarioRequest {
			delta_expenses: Some(-200.0),
			..Default::default()
		};
		let json = serde_json::to_value(&req).unwrap();
		assert_eq!(json, serde_json::json!({ "delta_expenses": -200.0 }));
	}

	#[test]
	fn test_assistant_reply_falls_back_to_text() {
		let res: AssistantResponse =
			serde_json::from_str(r#"{"text": "hola"}"#).unwrap();
		assert_eq!(res.reply(), Some("hola"));

		let res: AssistantResponse =
			serde_json::from_str(r#"{"answer": "a", "text": "b"}"#).unwrap();
		assert_eq!(res.reply(), Some("a"));
	}

	#[test]
	fn test_forecast_tolerates_minimal_payload() {
		let res: ForecastResponse = serde_json::from_str(
			r#"{"message": "No hay suficientes datos para el análisis."}"#,
		)
		.unwrap();
		assert!(res.next_savings_estimate.is_none());
		assert!(res.highlights.is_empty());
		assert!(res.message.is_some());
	}

	#[test]
	fn test_settings_defaults() {
		let settings: Settings = serde_json::from_str("{}").unwrap();
		assert_eq!(settings.base_url, "http://localhost:8000");
		assert!(settings.data_dir.is_none());
	}
}
