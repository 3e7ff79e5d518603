//! REST client for the checkup backend.

pub mod admin;
mod client;
pub mod session;
pub mod transport;
pub mod upload;

use thiserror::Error;

pub use admin::{AdminQuery, AdminResource};
pub use client::ApiClient;
pub use session::{AuthSession, SessionFile};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport, RequestBody};
pub use upload::{UploadError, UploadKind};

/// Default backend used when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
    #[error("server answered {status} ({})", code.as_deref().unwrap_or("no error code"))]
    Server { status: u16, code: Option<String> },
    #[error("session expired, log in again")]
    SessionExpired,
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to store session at '{path}': {source}")]
    Session {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Application error code sent by the server, if any.
    pub fn server_code(&self) -> Option<&str> {
        match self {
            ApiError::Server { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ApiError::SessionExpired | ApiError::Server { status: 401 | 403, .. }
        )
    }
}
