use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, expired or server-rejected token. The session is over.
    #[error("Sesión expirada o no autenticada")]
    Unauthorized,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Server returned {code}: {detail}")]
    Status { code: u16, detail: String },

    #[error("Response parsing error: {0}")]
    Parse(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}
