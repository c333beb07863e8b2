/// Result entries and how they are laid out for display

use crate::core::DatabaseKind;
use serde::{Deserialize, Serialize};

/// One line of plocate output, tagged with the database it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub path: String,
    pub source: DatabaseKind,
}

impl ResultEntry {
    pub fn new(path: impl Into<String>, source: DatabaseKind) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }

    /// Last path component, or `/` for the root itself
    pub fn name(&self) -> &str {
        self.split().0
    }

    /// Containing directory; `/` when there is nothing above the name
    pub fn parent(&self) -> &str {
        self.split().1
    }

    fn split(&self) -> (&str, &str) {
        split_path(&self.path)
    }
}

/// Split a path into (name, parent) the way the result table shows it
pub(crate) fn split_path(path: &str) -> (&str, &str) {
    if path == "/" {
        return ("/", "/");
    }

    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) => (&trimmed[1..], "/"),
        Some(idx) => (&trimmed[idx + 1..], &trimmed[..idx]),
        None => (trimmed, "/"),
    }
}

/// Column a result table can be sorted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Path,
}

impl std::str::FromStr for SortColumn {
    type Err = crate::error::LocateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortColumn::Name),
            "path" | "dir" => Ok(SortColumn::Path),
            other => Err(crate::error::LocateError::Generic(format!(
                "Unknown sort column: {}",
                other
            ))),
        }
    }
}

/// Sort entries case-insensitively on one column, keeping ties in arrival order
pub fn sort_entries(entries: &mut [ResultEntry], column: SortColumn, descending: bool) {
    let key = |entry: &ResultEntry| match column {
        SortColumn::Name => entry.name().to_lowercase(),
        SortColumn::Path => entry.parent().to_lowercase(),
    };

    entries.sort_by(|a, b| {
        let ord = key(a).cmp(&key(b));
        if descending {
            ord.reverse()
        } else {
            ord
        }
    });
}
