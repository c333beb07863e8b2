/// Result merger
///
/// Folds source events into one append-only result list, in the order
/// they arrive. Nothing is deduplicated across databases.

use crate::core::{Category, DatabaseKind, ResultEntry};
use crate::error::LocateError;
use crate::search::SourceEvent;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A failure reported by one database's search
#[derive(Debug, Clone)]
pub struct SourceError {
    pub database: DatabaseKind,
    pub error: Arc<LocateError>,
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

/// What the presentation layer is told after each event
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    Entry(ResultEntry),
    SourceFailed(SourceError),
    SourceFinished { database: DatabaseKind, lines: usize },
}

#[derive(Debug, Default)]
pub struct ResultMerger {
    entries: Vec<ResultEntry>,
    errors: Vec<SourceError>,
    pending: BTreeSet<DatabaseKind>,
    category: Option<Category>,
    filter: Option<Regex>,
}

impl ResultMerger {
    /// Create a merger waiting on the given sources
    pub fn new<I: IntoIterator<Item = DatabaseKind>>(
        sources: I,
        category: Option<Category>,
        filter: Option<Regex>,
    ) -> Self {
        Self {
            entries: Vec::new(),
            errors: Vec::new(),
            pending: sources.into_iter().collect(),
            category,
            filter,
        }
    }

    /// Apply one event. Returns `None` for lines the filters hide.
    pub fn push(&mut self, event: SourceEvent) -> Option<SessionUpdate> {
        match event {
            SourceEvent::Line { database, path } => {
                if !self.accepts(&path) {
                    return None;
                }
                let entry = ResultEntry::new(path, database);
                self.entries.push(entry.clone());
                Some(SessionUpdate::Entry(entry))
            }
            SourceEvent::Failed { database, error } => {
                self.pending.remove(&database);
                let error = SourceError {
                    database,
                    error: Arc::new(error),
                };
                self.errors.push(error.clone());
                Some(SessionUpdate::SourceFailed(error))
            }
            SourceEvent::Finished { database, lines } => {
                self.pending.remove(&database);
                Some(SessionUpdate::SourceFinished { database, lines })
            }
        }
    }

    fn accepts(&self, path: &str) -> bool {
        if let Some(category) = self.category {
            if !category.matches(path) {
                return false;
            }
        }

        match &self.filter {
            Some(filter) => filter.is_match(path),
            None => true,
        }
    }

    /// Every source has finished or failed
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    /// Stop waiting on sources that will never report
    pub fn abandon(&mut self) {
        self.pending.clear();
    }

    pub fn entries(&self) -> &[ResultEntry] {
        &self.entries
    }

    pub fn errors(&self) -> &[SourceError] {
        &self.errors
    }

    /// Hand over everything collected so far
    pub fn take(&mut self) -> (Vec<ResultEntry>, Vec<SourceError>) {
        (
            std::mem::take(&mut self.entries),
            std::mem::take(&mut self.errors),
        )
    }
}
