//! Session lock capability

use futures::future::BoxFuture;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::LockError;

/// Fire-and-forget "lock the session now"
pub trait SessionLock: Send + Sync + 'static {
    fn lock_now(&self) -> BoxFuture<'static, Result<(), LockError>>;
}

/// Locks the session by running an external command
#[derive(Debug, Clone)]
pub struct CommandLock {
    program: String,
    args: Vec<String>,
}

impl CommandLock {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `loginctl lock-session`
    pub fn loginctl() -> Self {
        Self::new("loginctl", vec!["lock-session".to_string()])
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl SessionLock for CommandLock {
    fn lock_now(&self) -> BoxFuture<'static, Result<(), LockError>> {
        let program = self.program.clone();
        let args = self.args.clone();
        let command = self.command_line();
        Box::pin(async move {
            debug!("Locking session with {}", command);
            let output = Command::new(&program)
                .args(&args)
                .output()
                .await
                .map_err(|source| LockError::Spawn {
                    command: command.clone(),
                    source,
                })?;

            if !output.status.success() {
                return Err(LockError::Failed {
                    command,
                    status: output.status.to_string(),
                });
            }

            info!("Session lock requested");
            Ok(())
        })
    }
}

/// Used when no lock command is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLock;

impl SessionLock for NoLock {
    fn lock_now(&self) -> BoxFuture<'static, Result<(), LockError>> {
        Box::pin(async { Err(LockError::NotConfigured) })
    }
}
