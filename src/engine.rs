//! Nomie Server storage engine.
//!
//! Drives the connection lifecycle:
//!
//! ```text
//! Uninitialized -> AcquiringCredentials -> Validating -> Ready
//!                                                     -> Unauthorized
//!                                                     -> Unreachable
//! ```
//!
//! and exposes the storage surface (`get`, `put`, `list`, `delete`) on top of
//! [`RequestClient`]. Error handling differs per operation: `get` never
//! fails, `put` reports save errors, `list` and `delete` pass failures
//! through unclassified.

use std::sync::Arc;

use anyhow::Context;
use reqwest::Response;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::api::{
    decode_envelope, ConnectionValidator, EngineError, EngineResult, ListRequest, Profile,
    RequestClient, ValidationResult,
};
use crate::credentials::{CredentialStore, Credentials, PartialCredentials};
use crate::interact::{Interact, RecoveryAction, RecoveryMenu};
use crate::kv::KeyValueStore;
use crate::ready::{ReadyListener, ReadyListenerRegistry};

/// URL offered when prompting for the server.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3011";

/// Storage routes live under `/api/n6storage/`.
const STORAGE_PREFIX: &str = "n6storage";

const URL_PROMPT: &str = "Nomie Server URL";
const TOKEN_PROMPT: &str = "Nomie Server API Key";
const MISSING_CREDENTIALS: &str = "Nomie Server requires a server object with url and token";
const INVALID_KEY: &str = "Nomie Server API key is invalid. Please double check your settings.";

/// Values the host supplies when nothing is persisted.
#[derive(Clone, Default)]
pub struct InitOptions {
    pub url: Option<String>,
    pub token: Option<String>,
}

impl std::fmt::Debug for InitOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitOptions")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Where the engine is in its connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Uninitialized,
    AcquiringCredentials,
    Validating,
    Ready,
    Unauthorized,
    Unreachable,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConnectionState::Uninitialized => "uninitialized",
            ConnectionState::AcquiringCredentials => "acquiring credentials",
            ConnectionState::Validating => "validating",
            ConnectionState::Ready => "ready",
            ConnectionState::Unauthorized => "unauthorized",
            ConnectionState::Unreachable => "unreachable",
        };
        write!(f, "{}", name)
    }
}

/// Storage engine backed by a remote Nomie Server.
///
/// Created once per session. `init` takes `&mut self`, so a second
/// initialization cannot overlap one already in flight.
pub struct StorageEngine {
    credentials: CredentialStore,
    client: RequestClient,
    interact: Arc<dyn Interact>,
    recovery: Arc<dyn RecoveryMenu>,
    ready: ReadyListenerRegistry,
    state: ConnectionState,
    recovery_action: Option<RecoveryAction>,
}

impl StorageEngine {
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        interact: Arc<dyn Interact>,
        recovery: Arc<dyn RecoveryMenu>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            credentials: CredentialStore::new(kv),
            client: RequestClient::new()?,
            interact,
            recovery,
            ready: ReadyListenerRegistry::new(),
            state: ConnectionState::Uninitialized,
            recovery_action: None,
        })
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether ready listeners have fired (also true in the unauthorized state).
    pub fn is_ready(&self) -> bool {
        self.ready.is_ready()
    }

    /// The recovery menu choice made during the last failed `init`, if any.
    pub fn recovery_action(&self) -> Option<RecoveryAction> {
        self.recovery_action
    }

    // ========== Lifecycle ==========

    /// Register a callback for when the engine becomes usable.
    pub fn on_ready(&self, listener: ReadyListener) {
        self.ready.on_ready(listener);
    }

    /// Invoke and clear all pending ready listeners.
    pub fn fire_ready(&self) -> usize {
        self.ready.fire_ready()
    }

    /// Acquire credentials, validate them once, and notify listeners.
    ///
    /// - Valid: state becomes `Ready` and listeners fire.
    /// - Rejected token: the recovery menu is shown, state becomes
    ///   `Unauthorized`, listeners still fire, an error is shown and
    ///   [`EngineError::Unauthorized`] is returned.
    /// - Unreachable: the recovery menu is shown, state becomes `Unreachable`
    ///   and [`EngineError::Unreachable`] is returned with the request error
    ///   as its source.
    /// - Missing credentials after prompting: [`EngineError::Configuration`];
    ///   the engine stays uninitialized.
    pub async fn init(&mut self, options: InitOptions) -> EngineResult<()> {
        info!("🔐 Loading Nomie Server credentials...");
        self.state = ConnectionState::AcquiringCredentials;
        self.recovery_action = None;

        let credentials = match self.acquire_credentials(&options).await {
            Ok(credentials) => credentials,
            Err(e) => {
                error!("❌ {}", e);
                self.interact.error(&e.to_string());
                self.state = ConnectionState::Uninitialized;
                return Err(e);
            }
        };

        self.client.set_credentials(&credentials);
        self.state = ConnectionState::Validating;
        info!("🔗 Validating connection to {}...", credentials.endpoint_url);

        let validation = ConnectionValidator::new(&self.client, self.recovery.as_ref())
            .validate()
            .await;

        self.apply_recovery(validation.recovery_action);

        match validation.result {
            ValidationResult::Ok => {
                info!("✅ Connected to Nomie Server");
                self.state = ConnectionState::Ready;
                self.fire_ready();
                Ok(())
            }
            ValidationResult::InvalidCredentials { status } => {
                warn!("Nomie Server rejected the API key (HTTP {})", status);
                self.state = ConnectionState::Unauthorized;
                self.fire_ready();
                self.interact.error(INVALID_KEY);
                Err(EngineError::Unauthorized { status })
            }
            ValidationResult::Unreachable { reason, error } => {
                error!("❌ Unable to connect to {}: {}", credentials.endpoint_url, reason);
                self.state = ConnectionState::Unreachable;
                Err(EngineError::Unreachable {
                    url: credentials.endpoint_url,
                    reason,
                    source: error.map(Box::new),
                })
            }
        }
    }

    /// Record the recovery menu choice; erasing the config happens here.
    fn apply_recovery(&mut self, action: Option<RecoveryAction>) {
        self.recovery_action = action;
        if action == Some(RecoveryAction::EraseConfig) {
            if let Err(e) = self.erase_credentials() {
                error!("Failed to erase Nomie Server config: {}", e);
            }
        }
    }

    async fn acquire_credentials(&self, options: &InitOptions) -> EngineResult<Credentials> {
        let loaded = self
            .credentials
            .load(options.url.as_deref(), options.token.as_deref());
        if let Some(credentials) = loaded.complete() {
            debug!("Using stored credentials for {}", credentials.endpoint_url);
            return Ok(credentials);
        }

        debug!("Credentials incomplete, prompting user");
        let url = self
            .interact
            .prompt(URL_PROMPT, Some(DEFAULT_SERVER_URL))
            .await
            .context("Failed to read Nomie Server URL")?;
        let token = self
            .interact
            .prompt(TOKEN_PROMPT, None)
            .await
            .context("Failed to read Nomie Server API key")?;

        let prompted = PartialCredentials {
            endpoint_url: Some(url.trim().to_string()),
            token: Some(token.trim().to_string()),
        };

        let credentials = prompted
            .complete()
            .ok_or_else(|| EngineError::Configuration(MISSING_CREDENTIALS.to_string()))?;
        self.credentials.save(&credentials)?;
        Ok(credentials)
    }

    /// Remove persisted credentials and forget the ones in use.
    ///
    /// The next `init` prompts again.
    pub fn erase_credentials(&mut self) -> EngineResult<()> {
        self.credentials.clear()?;
        self.client.clear_credentials();
        Ok(())
    }

    // ========== Storage contract ==========

    /// Paths are used as given.
    pub fn base_path<'p>(&self, path: &'p str) -> &'p str {
        path
    }

    pub fn profile(&self) -> Profile {
        Profile::default()
    }

    fn storage_path(path: &str) -> String {
        format!("{}/{}", STORAGE_PREFIX, path)
    }

    /// Read a document. Any failure yields an empty array.
    pub async fn get(&self, path: &str) -> Value {
        match self.try_get(path).await {
            Ok(value) => value,
            Err(e) => {
                debug!("GET {} failed, returning empty result: {}", path, e);
                Value::Array(Vec::new())
            }
        }
    }

    async fn try_get(&self, path: &str) -> EngineResult<Value> {
        let response = self.client.get(&Self::storage_path(path)).await?;
        if !response.status().is_success() {
            debug!("GET {} returned {}", path, response.status());
            return Ok(Value::Array(Vec::new()));
        }

        let text = response.text().await?;
        Ok(decode_envelope(&text)?)
    }

    /// Store `content` as JSON under `path` and return the server's reply.
    pub async fn put<T>(&self, path: &str, content: &T) -> EngineResult<Value>
    where
        T: Serialize + ?Sized,
    {
        let response = self.client.post(&Self::storage_path(path), content).await?;

        let status = response.status();
        if !status.is_success() {
            error!("⚠️ PUT request failed for {}: {}", path, status);
            return Err(EngineError::Save {
                path: path.to_string(),
                status_text: status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.as_u16().to_string()),
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// List entries under `path` (`/` when absent or empty).
    pub async fn list(&self, path: Option<&str>) -> EngineResult<Value> {
        let body = ListRequest {
            path: path.filter(|p| !p.is_empty()).unwrap_or("/").to_string(),
        };

        let response = self
            .client
            .post(&Self::storage_path("list"), &body)
            .await?
            .error_for_status()?;

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Delete `path`; the response is returned without inspection.
    pub async fn delete(&self, path: &str) -> EngineResult<Response> {
        self.client.delete(&Self::storage_path(path)).await
    }
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("state", &self.state)
            .field("client", &self.client)
            .field("ready", &self.ready)
            .finish()
    }
}
