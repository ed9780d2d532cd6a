//! Credential persistence for the Nomie Server engine.
//!
//! The endpoint URL and access token live in the host's key/value store under
//! `nomie-server-url` and `nomie-server-token`. Values supplied by the caller
//! are used only when nothing is persisted.

use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::kv::KeyValueStore;

/// Key holding the server endpoint URL.
pub const URL_KEY: &str = "nomie-server-url";

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "nomie-server-token";

/// A complete endpoint/token pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub endpoint_url: String,
    pub token: String,
}

impl Credentials {
    pub fn new(endpoint_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint_url", &self.endpoint_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Whatever could be found; either field may be missing.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PartialCredentials {
    pub endpoint_url: Option<String>,
    pub token: Option<String>,
}

impl PartialCredentials {
    /// Both fields present and non-empty.
    pub fn complete(&self) -> Option<Credentials> {
        match (non_empty(&self.endpoint_url), non_empty(&self.token)) {
            (Some(url), Some(token)) => Some(Credentials::new(url, token)),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.complete().is_some()
    }
}

impl std::fmt::Debug for PartialCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartialCredentials")
            .field("endpoint_url", &self.endpoint_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Reads and writes the endpoint/token pair.
#[derive(Clone)]
pub struct CredentialStore {
    kv: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.kv.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    /// Persisted values, each falling back to the matching default.
    ///
    /// Never fails: unreadable or empty entries count as missing.
    pub fn load(&self, default_url: Option<&str>, default_token: Option<&str>) -> PartialCredentials {
        let pick = |persisted: Option<String>, default: Option<&str>| {
            persisted.or_else(|| default.filter(|d| !d.is_empty()).map(str::to_string))
        };

        PartialCredentials {
            endpoint_url: pick(self.read(URL_KEY), default_url),
            token: pick(self.read(TOKEN_KEY), default_token),
        }
    }

    /// Persist both fields in one write.
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        self.kv.set_many(&[
            (URL_KEY, credentials.endpoint_url.as_str()),
            (TOKEN_KEY, credentials.token.as_str()),
        ])?;
        info!("Nomie Server credentials saved");
        Ok(())
    }

    /// Remove both fields, forcing a prompt on the next initialization.
    pub fn clear(&self) -> Result<()> {
        self.kv.remove_many(&[URL_KEY, TOKEN_KEY])?;
        info!("Nomie Server credentials erased");
        Ok(())
    }
}
