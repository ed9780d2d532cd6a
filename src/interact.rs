//! User-facing collaborators: credential prompts, inline errors and the
//! recovery menu shown when the server cannot be reached.
//!
//! The engine only depends on the [`Interact`] and [`RecoveryMenu`] traits.
//! The terminal implementations back the `nomie-store` binary.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use async_trait::async_trait;

/// Title of the recovery menu.
pub const CANNOT_CONNECT_TITLE: &str =
    "Unable to Connect to Nomie Server with the current Configuration";

/// Prompt and error surface used while acquiring credentials.
#[async_trait]
pub trait Interact: Send + Sync {
    /// Ask the user for a value. Returns the entered text, or `default` when
    /// the user accepts it. An empty string means "no value".
    async fn prompt(&self, label: &str, default: Option<&str>) -> Result<String>;

    /// Show an error message to the user.
    fn error(&self, message: &str);
}

/// Choices offered when the server cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Reload and run initialization again.
    TryAgain,
    /// Hand over to the host's local storage engine.
    SwitchToLocal,
    /// Remove persisted credentials so the next run prompts again.
    EraseConfig,
}

impl RecoveryAction {
    pub const ALL: [RecoveryAction; 3] = [
        RecoveryAction::TryAgain,
        RecoveryAction::SwitchToLocal,
        RecoveryAction::EraseConfig,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            RecoveryAction::TryAgain => "Try again",
            RecoveryAction::SwitchToLocal => "Switch to Local Storage",
            RecoveryAction::EraseConfig => "Erase Nomie Server Config",
        }
    }
}

/// Blocking menu presented when the remote is unreachable.
#[async_trait]
pub trait RecoveryMenu: Send + Sync {
    /// Present `actions` under `title`. `None` means the menu was dismissed.
    async fn show(&self, title: &str, actions: &[RecoveryAction]) -> Option<RecoveryAction>;
}

// ============================================================================
// Terminal implementations
// ============================================================================

fn read_line() -> Result<String> {
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

/// Prompts on stdout, reads answers from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalInteract;

#[async_trait]
impl Interact for TerminalInteract {
    async fn prompt(&self, label: &str, default: Option<&str>) -> Result<String> {
        match default {
            Some(default) => print!("{} [{}]: ", label, default),
            None => print!("{}: ", label),
        }

        let answer = read_line()?;
        if answer.is_empty() {
            return Ok(default.unwrap_or_default().to_string());
        }
        Ok(answer)
    }

    fn error(&self, message: &str) {
        eprintln!("❌ {}", message);
    }
}

/// Numbered menu on stdout; the user types the number of an action.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalRecoveryMenu;

#[async_trait]
impl RecoveryMenu for TerminalRecoveryMenu {
    async fn show(&self, title: &str, actions: &[RecoveryAction]) -> Option<RecoveryAction> {
        println!("\n⚠️  {}", title);
        for (i, action) in actions.iter().enumerate() {
            println!("   {}. {}", i + 1, action.title());
        }
        print!("Choose an option (empty to dismiss): ");

        let answer = match read_line() {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!("Recovery menu dismissed: {}", e);
                return None;
            }
        };

        answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| actions.get(i).copied())
    }
}
