/// Opening search results
///
/// Hands a result, or the folder holding it, to the desktop's default
/// handler. A configured `opener` program takes the place of the default.

use crate::config::Config;
use crate::core::entry::split_path;
use crate::error::{LocateError, Result};
use std::io;
use std::path::PathBuf;
use tracing::{debug, info};

/// What to open for a result row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenTarget {
    /// The file itself, in its default application
    File,
    /// The directory that contains it
    Folder,
}

pub struct Opener {
    program: Option<String>,
}

impl Opener {
    pub fn new(config: &Config) -> Self {
        Self {
            program: config.opener.clone(),
        }
    }

    /// The path `open` would hand to the launcher
    pub fn resolve(path: &str, target: OpenTarget) -> Result<PathBuf> {
        let path = path.trim();
        if path.is_empty() {
            return Err(LocateError::Generic(
                "Please select a valid result to open".to_string(),
            ));
        }

        let resolved = match target {
            OpenTarget::File => path,
            OpenTarget::Folder => split_path(path).1,
        };
        Ok(PathBuf::from(resolved))
    }

    /// Launch the handler for a result and return what was opened
    ///
    /// Blocks until the launcher exits. Desktop launchers return once the
    /// application has started.
    pub fn open(&self, path: &str, target: OpenTarget) -> Result<PathBuf> {
        let resolved = Self::resolve(path, target)?;
        let failed = |source: io::Error| LocateError::OpenFailed {
            target: resolved.display().to_string(),
            source,
        };

        // Results are only as fresh as the last updatedb run
        if !resolved.exists() {
            return Err(failed(io::Error::from(io::ErrorKind::NotFound)));
        }

        debug!(path = %resolved.display(), opener = ?self.program, "opening result");
        let launched = match &self.program {
            Some(program) => open::with(&resolved, program.as_str()),
            None => open::that(&resolved),
        };
        launched.map_err(failed)?;

        info!(path = %resolved.display(), "opened result");
        Ok(resolved)
    }
}
