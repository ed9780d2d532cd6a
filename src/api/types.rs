use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Taxonomy
// ============================================================================

/// Errors surfaced by the Nomie Server storage engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Endpoint or token missing (or unusable) when a request is attempted.
    #[error("{0}")]
    Configuration(String),

    /// The validation probe was rejected by the server.
    ///
    /// Displays as exactly `Unauthorized` so hosts can match on the message.
    #[error("Unauthorized")]
    Unauthorized { status: u16 },

    /// Transport failure or non-auth failure while validating the connection.
    #[error("Unable to reach Nomie Server at {url}: {reason}")]
    Unreachable {
        url: String,
        reason: String,
        /// The transport or configuration error behind the failure, if any.
        #[source]
        source: Option<Box<EngineError>>,
    },

    /// A `put` was answered with a non-success status.
    #[error("Failed to save {path}: {status_text}")]
    Save { path: String, status_text: String },

    /// Network unreachable, DNS failure, broken connection, etc.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response body was not the JSON we expected.
    #[error("Failed to parse response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    /// Whether this error is the unauthorized classification.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, EngineError::Unauthorized { .. })
    }

    /// Whether this error came from missing configuration rather than the network.
    pub fn is_configuration(&self) -> bool {
        matches!(self, EngineError::Configuration(_))
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

// ============================================================================
// Validation
// ============================================================================

/// Outcome of the single validation round-trip made during `init`.
#[derive(Debug)]
pub enum ValidationResult {
    /// Probe answered 2xx.
    Ok,
    /// Probe answered 401/403.
    InvalidCredentials { status: u16 },
    /// Probe failed at the transport level or answered any other status.
    /// `error` holds the request error when no response arrived.
    Unreachable {
        reason: String,
        error: Option<EngineError>,
    },
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ValidationResult::Ok)
    }
}

// ============================================================================
// Wire Types
// ============================================================================

/// Body of `POST /api/n6storage/list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListRequest {
    pub path: String,
}

/// Identity reported by `getProfile`. This engine has no remote profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub username: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            username: "Local User".to_string(),
        }
    }
}
