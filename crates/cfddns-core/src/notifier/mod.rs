//! Script-based change notifier
//!
//! Runs an external executable after a record was created or updated:
//!
//! ```text
//! <script> <v4|v6> <old-ip> <new-ip> <fqdn>
//! ```
//!
//! `old-ip` is an empty argument when the record was created.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::info;

use crate::error::{Error, Result};
use crate::traits::{ChangeEvent, ChangeNotifier};

/// Change notifier that launches an external script
#[derive(Debug, Clone)]
pub struct ScriptNotifier {
    path: PathBuf,
}

impl ScriptNotifier {
    /// Create a notifier for the given executable
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the executable
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Positional arguments passed to the script
    pub fn arguments(event: &ChangeEvent) -> [&str; 4] {
        [
            event.version.label(),
            &event.previous,
            &event.current,
            &event.name,
        ]
    }
}

#[async_trait]
impl ChangeNotifier for ScriptNotifier {
    async fn notify(&self, event: &ChangeEvent) -> Result<()> {
        let output = Command::new(&self.path)
            .args(Self::arguments(event))
            .output()
            .await
            .map_err(|e| {
                Error::notifier(format!("failed to launch {}: {}", self.path.display(), e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(Error::notifier(format!(
                "{} exited with {}; stdout: {:?}; stderr: {:?}",
                self.path.display(),
                output.status,
                stdout.trim_end(),
                stderr.trim_end()
            )));
        }

        info!(
            version = event.version.label(),
            out = %stdout.trim_end(),
            "Change script {} ran",
            self.path().display()
        );
        Ok(())
    }
}
