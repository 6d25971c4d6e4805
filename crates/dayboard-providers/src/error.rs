//! Fetch failures and the classification of upstream error bodies.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Why upstream refused a 403.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionReason {
    /// The Calendar API is disabled for the OAuth client's project.
    ApiNotEnabled,
    /// The token lacks the calendar scope, or the reason could not be told.
    ScopeNotGranted,
}

impl PermissionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiNotEnabled => "api_not_enabled",
            Self::ScopeNotGranted => "scope_not_granted",
        }
    }
}

impl fmt::Display for PermissionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed calendar fetch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Upstream answered 401: the bearer token is expired or revoked.
    #[error("token expired or revoked")]
    TokenExpired,

    /// Upstream answered 403.
    #[error("permission denied ({reason}): {message}")]
    PermissionDenied {
        reason: PermissionReason,
        message: String,
    },

    /// Any other failure: non-2xx status, transport error, timeout or an
    /// unreadable body. `status` is `None` when no response was received.
    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },
}

impl FetchError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Short machine-readable kind, used in logs and status output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TokenExpired => "token_expired",
            Self::PermissionDenied { .. } => "permission_denied",
            Self::Upstream { .. } => "upstream",
        }
    }

    /// Returns true if the held token should be discarded.
    pub fn invalidates_token(&self) -> bool {
        matches!(self, Self::TokenExpired)
    }
}

/// A specialized Result type for fetches.
pub type FetchResult<T> = Result<T, FetchError>;

/// Structured reasons that mean the API is switched off for the project.
const API_DISABLED_REASONS: &[&str] = &["accessNotConfigured", "SERVICE_DISABLED"];

/// Structured reasons that mean the token is missing the calendar scope.
const SCOPE_REASONS: &[&str] = &["insufficientPermissions", "ACCESS_TOKEN_SCOPE_INSUFFICIENT"];

/// Message fragments Google uses when the API is disabled.
const API_DISABLED_PHRASES: &[&str] = &["has not been used", "is disabled"];

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorItem>,
    #[serde(default)]
    details: Vec<ErrorItem>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorItem {
    reason: Option<String>,
}

/// Extracts `error.message` from a Google error body, if there is one.
pub(crate) fn upstream_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error)
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
}

/// Classifies a 403 body.
///
/// Structured `reason` codes (legacy `errors[]` and `details[]` ErrorInfo)
/// are checked first; the message text is only consulted when neither names
/// a known reason. Bodies that are not JSON fall through to the text match.
pub fn classify_forbidden(body: &str) -> FetchError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error)
        .unwrap_or_default();

    let reasons: Vec<&str> = parsed
        .errors
        .iter()
        .chain(parsed.details.iter())
        .filter_map(|item| item.reason.as_deref())
        .collect();

    let message = parsed
        .message
        .clone()
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    let reason = if reasons.iter().any(|r| API_DISABLED_REASONS.contains(r)) {
        PermissionReason::ApiNotEnabled
    } else if reasons.iter().any(|r| SCOPE_REASONS.contains(r)) {
        PermissionReason::ScopeNotGranted
    } else if API_DISABLED_PHRASES.iter().any(|p| message.contains(p)) {
        PermissionReason::ApiNotEnabled
    } else {
        PermissionReason::ScopeNotGranted
    };

    FetchError::PermissionDenied { reason, message }
}
