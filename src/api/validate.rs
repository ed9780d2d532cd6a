//! Connection validation against `GET /api/auth/validate`.

use tracing::{debug, warn};

use super::client::RequestClient;
use super::types::ValidationResult;
use crate::interact::{RecoveryAction, RecoveryMenu, CANNOT_CONNECT_TITLE};

/// Path of the validation probe, relative to `/api/`.
pub const VALIDATION_PATH: &str = "auth/validate";

/// Result of a validation round-trip, plus the recovery choice the user made
/// if the menu was shown.
#[derive(Debug)]
pub struct Validation {
    pub result: ValidationResult,
    pub recovery_action: Option<RecoveryAction>,
}

/// Issues the single validation probe made per initialization.
///
/// Any non-success outcome shows the recovery menu before `validate`
/// returns. Rejected credentials are still classified separately so the
/// engine can report them inline.
pub struct ConnectionValidator<'a> {
    client: &'a RequestClient,
    recovery: &'a dyn RecoveryMenu,
}

impl<'a> ConnectionValidator<'a> {
    pub fn new(client: &'a RequestClient, recovery: &'a dyn RecoveryMenu) -> Self {
        Self { client, recovery }
    }

    /// Probe the server once and classify the outcome.
    pub async fn validate(&self) -> Validation {
        let result = self.probe().await;

        let recovery_action = match &result {
            ValidationResult::Ok => None,
            ValidationResult::InvalidCredentials { status } => {
                warn!("Nomie Server rejected credentials (HTTP {})", status);
                self.show_recovery().await
            }
            ValidationResult::Unreachable { reason, .. } => {
                warn!("Nomie Server unreachable: {}", reason);
                self.show_recovery().await
            }
        };

        Validation {
            result,
            recovery_action,
        }
    }

    async fn show_recovery(&self) -> Option<RecoveryAction> {
        let choice = self
            .recovery
            .show(CANNOT_CONNECT_TITLE, &RecoveryAction::ALL)
            .await;
        debug!("Recovery choice: {:?}", choice);
        choice
    }

    async fn probe(&self) -> ValidationResult {
        debug!(
            "Validating connection to {}",
            self.client.base_url().unwrap_or("<unset>")
        );

        match self.client.get(VALIDATION_PATH).await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    ValidationResult::Ok
                } else if status.as_u16() == 401 || status.as_u16() == 403 {
                    ValidationResult::InvalidCredentials {
                        status: status.as_u16(),
                    }
                } else if status.is_server_error() {
                    ValidationResult::Unreachable {
                        reason: format!("Server error (HTTP {})", status.as_u16()),
                        error: None,
                    }
                } else {
                    ValidationResult::Unreachable {
                        reason: format!("Unexpected response (HTTP {})", status.as_u16()),
                        error: None,
                    }
                }
            }
            Err(e) => ValidationResult::Unreachable {
                reason: e.to_string(),
                error: Some(e),
            },
        }
    }
}
