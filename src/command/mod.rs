mod check;
mod erase;
mod status;
mod storage;

pub use check::run_check;
pub use erase::run_erase;
pub use status::run_status;
pub use storage::{run_delete, run_get, run_list, run_put};

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use nomie_server_storage::{
    CredentialStore, FileKeyValueStore, InitOptions, RecoveryAction, StorageEngine,
    TerminalInteract, TerminalRecoveryMenu,
};

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_dir: Option<PathBuf>,
    pub options: InitOptions,
}

fn open_store(settings: &Settings) -> Result<Arc<FileKeyValueStore>> {
    Ok(Arc::new(FileKeyValueStore::new(settings.config_dir.clone())?))
}

fn open_credentials(settings: &Settings) -> Result<CredentialStore> {
    Ok(CredentialStore::new(open_store(settings)?))
}

fn open_engine(settings: &Settings) -> Result<StorageEngine> {
    StorageEngine::new(
        open_store(settings)?,
        Arc::new(TerminalInteract),
        Arc::new(TerminalRecoveryMenu),
    )
}

/// Build and initialize an engine.
///
/// Choosing "Try again" in the recovery menu starts over with a fresh engine,
/// the CLI equivalent of reloading the app.
async fn connect(settings: &Settings) -> Result<StorageEngine> {
    loop {
        let mut engine = open_engine(settings)?;
        let Err(e) = engine.init(settings.options.clone()).await else {
            return Ok(engine);
        };

        match engine.recovery_action() {
            Some(RecoveryAction::TryAgain) => {
                info!("Retrying connection to Nomie Server...");
            }
            Some(RecoveryAction::SwitchToLocal) => {
                println!("Local storage is provided by the Nomie app itself; nothing to switch to here.");
                return Err(e.into());
            }
            Some(RecoveryAction::EraseConfig) => {
                println!("✅ Nomie Server config erased. Run again to enter new settings.");
                return Err(e.into());
            }
            None => return Err(e.into()),
        }
    }
}
