/// Turns a search request into plocate command lines
///
/// Validation happens here, so a bad request never spawns anything.

use crate::config::Config;
use crate::core::{DatabaseKind, SearchRequest};
use crate::error::{LocateError, Result};
use regex::Regex;
use regex_syntax::ast::{self, parse::Parser};
use std::path::PathBuf;
use tracing::debug;

/// One plocate invocation, ready to spawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCommand {
    pub database: DatabaseKind,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl SearchCommand {
    /// Shell-ish rendering, for logs and error reports
    pub fn display(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub struct CommandBuilder {
    program: PathBuf,
    system_db: PathBuf,
    media_db: PathBuf,
}

impl CommandBuilder {
    pub fn new(config: &Config) -> Self {
        Self {
            program: config.search_tool.clone(),
            system_db: config.system_db.clone(),
            media_db: config.media_db.clone(),
        }
    }

    /// Check a request without building anything
    ///
    /// # Returns
    /// * `Ok(())` - Request can be run
    /// * `Err(LocateError)` - Blank or malformed pattern, bad filter, no databases
    pub fn validate(&self, request: &SearchRequest) -> Result<()> {
        let pattern = request.pattern.trim();
        if pattern.is_empty() {
            return Err(LocateError::EmptyPattern);
        }

        // Can't pass a NUL through argv
        if pattern.contains('\0') {
            return Err(LocateError::InvalidPattern(
                "contains a NUL byte".to_string(),
            ));
        }

        if request.use_regex {
            check_search_regex(pattern)?;
        }

        if let Some(filter) = &request.filter {
            compile(filter.trim())?;
        }

        if request.targets.is_empty() {
            return Err(LocateError::NoDatabases);
        }

        Ok(())
    }

    /// Build one command per target database, system first
    pub fn build(&self, request: &SearchRequest) -> Result<Vec<SearchCommand>> {
        self.validate(request)?;

        let pattern = request.pattern.trim();
        let commands = request
            .targets
            .iter()
            .map(|&database| {
                let db_path = match database {
                    DatabaseKind::System => &self.system_db,
                    DatabaseKind::Media => &self.media_db,
                };

                let mut args = vec![format!("--database={}", db_path.display())];
                if !request.case_sensitive {
                    args.push("-i".to_string());
                }
                if request.use_regex {
                    args.push("--regex".to_string());
                }
                if pattern.starts_with('-') {
                    args.push("--".to_string());
                }
                args.push(pattern.to_string());

                SearchCommand {
                    database,
                    program: self.program.clone(),
                    args,
                }
            })
            .collect();

        Ok(commands)
    }
}

/// Reject `--regex` patterns that are structurally broken
///
/// plocate compiles the pattern as POSIX extended regex, which has things
/// this parser doesn't (backreferences, `{,n}` counts). Those are left for
/// plocate to judge; only unbalanced groups or brackets and dangling
/// repetitions fail here.
fn check_search_regex(pattern: &str) -> Result<()> {
    let err = match Parser::new().parse(pattern) {
        Ok(_) => return Ok(()),
        Err(err) => err,
    };

    let broken = matches!(
        err.kind(),
        ast::ErrorKind::ClassUnclosed
            | ast::ErrorKind::ClassRangeInvalid
            | ast::ErrorKind::GroupUnclosed
            | ast::ErrorKind::GroupUnopened
            | ast::ErrorKind::RepetitionMissing
            | ast::ErrorKind::EscapeUnexpectedEof
    );

    if broken {
        return Err(LocateError::InvalidRegex {
            pattern: pattern.to_string(),
            reason: err.kind().to_string(),
        });
    }

    debug!(pattern, reason = %err.kind(), "passing regex through to plocate");
    Ok(())
}

/// Compile a user-supplied regex, mapping failures to a validation error
pub(crate) fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| LocateError::InvalidRegex {
        pattern: pattern.to_string(),
        reason: source.to_string(),
    })
}
