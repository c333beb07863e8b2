/// Database updater
///
/// Rebuilds the plocate databases by running updatedb through the
/// privilege helper. Failures here never touch search.

use crate::config::Config;
use crate::core::DatabaseKind;
use crate::error::{ExitCode, LocateError, Result};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, warn};

// pkexec: 126 = dialog dismissed, 127 = not authorized
const AUTH_DISMISSED_EXIT: i32 = 126;
const AUTH_DENIED_EXIT: i32 = 127;

/// A fully resolved updatedb invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCommand {
    pub database: DatabaseKind,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl UpdateCommand {
    pub fn display(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Which databases were rebuilt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub updated: Vec<DatabaseKind>,
}

pub struct Updater {
    helper: PathBuf,
    update_tool: PathBuf,
    media_db: PathBuf,
    media_scan_path: PathBuf,
    exclude_paths: Vec<String>,
}

impl Updater {
    pub fn new(config: &Config) -> Self {
        Self {
            helper: config.privilege_helper.clone(),
            update_tool: config.update_tool.clone(),
            media_db: config.media_db.clone(),
            media_scan_path: config.media_scan_path.clone(),
            exclude_paths: config.exclude_paths.clone(),
        }
    }

    /// Add paths to prune from the system database
    pub fn exclude<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Build the command line for one database
    pub fn command(&self, database: DatabaseKind) -> UpdateCommand {
        let mut args = vec![self.update_tool.display().to_string()];

        match database {
            DatabaseKind::System => {
                // Entries may themselves hold several space-separated paths
                let excluded: Vec<&str> = self
                    .exclude_paths
                    .iter()
                    .flat_map(|p| p.split_whitespace())
                    .collect();
                if !excluded.is_empty() {
                    args.push("-e".to_string());
                    args.push(excluded.join(" "));
                }
            }
            DatabaseKind::Media => {
                args.push("-o".to_string());
                args.push(self.media_db.display().to_string());
                args.push("-U".to_string());
                args.push(self.media_scan_path.display().to_string());
            }
        }

        UpdateCommand {
            database,
            program: self.helper.clone(),
            args,
        }
    }

    /// Rebuild one database
    pub async fn run(&self, database: DatabaseKind) -> Result<()> {
        let command = self.command(database);
        info!(%database, command = %command.display(), "updating database");

        let output = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    LocateError::HelperNotFound(command.program.display().to_string())
                } else {
                    LocateError::Io(e)
                }
            })?;

        if output.status.success() {
            info!(%database, "database updated");
            return Ok(());
        }

        let code = output.status.code();
        if matches!(code, Some(AUTH_DISMISSED_EXIT) | Some(AUTH_DENIED_EXIT)) {
            warn!(%database, "authorization refused");
            return Err(LocateError::PrivilegeDenied(command.display()));
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let details = if !stderr.is_empty() {
            stderr
        } else if !stdout.is_empty() {
            stdout
        } else {
            "No detailed error message was returned.".to_string()
        };

        warn!(%database, status = %output.status, "database update failed");
        Err(LocateError::UpdateFailed {
            command: command.display(),
            code: ExitCode::from(output.status),
            details,
        })
    }

    /// Rebuild the system database, then optionally the media one
    ///
    /// Stops at the first failure.
    pub async fn update(&self, include_media: bool) -> Result<UpdateReport> {
        let mut report = UpdateReport::default();

        self.run(DatabaseKind::System).await?;
        report.updated.push(DatabaseKind::System);

        if include_media {
            self.run(DatabaseKind::Media).await?;
            report.updated.push(DatabaseKind::Media);
        }

        Ok(report)
    }
}
