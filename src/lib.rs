//! Nomie storage engine backed by a remote Nomie Server.
//!
//! The engine persists documents through the server's authenticated REST API
//! (`/api/n6storage/...`) instead of local storage. Credentials are kept in a
//! host-provided key/value store and validated once per initialization.
//!
//! ```ignore
//! let engine = StorageEngine::new(kv, Arc::new(TerminalInteract), Arc::new(TerminalRecoveryMenu))?;
//! engine.on_ready(Arc::new(|| println!("ready")));
//! engine.init(InitOptions::default()).await?;
//! let trackers = engine.get("trackers").await;
//! ```

pub mod api;
pub mod credentials;
pub mod engine;
pub mod interact;
pub mod kv;
pub mod ready;

#[cfg(test)]
mod testutil;

pub use api::{EngineError, EngineResult, Profile};
pub use credentials::{CredentialStore, Credentials};
pub use engine::{ConnectionState, InitOptions, StorageEngine};
pub use interact::{Interact, RecoveryAction, RecoveryMenu, TerminalInteract, TerminalRecoveryMenu};
pub use kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use ready::{ReadyListener, ReadyListenerRegistry};
