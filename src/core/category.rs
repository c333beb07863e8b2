/// File categories for narrowing displayed results
///
/// Categories are matched on the file extension of each returned path.
/// They never reach plocate itself.

use crate::error::LocateError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "odt", "rtf", "txt", "md", "tex", "xls", "xlsx", "ods", "csv", "ppt",
    "pptx", "odp", "epub",
];

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp", "svg", "tif", "tiff", "ico", "heic", "raw",
];

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "flac", "ogg", "opus", "wav", "m4a", "aac", "wma"];

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "avi", "mov", "wmv", "flv", "m4v"];

const ARCHIVE_EXTENSIONS: &[&str] = &[
    "zip", "tar", "gz", "tgz", "bz2", "xz", "zst", "7z", "rar", "iso", "deb", "rpm",
];

const CODE_EXTENSIONS: &[&str] = &[
    "rs", "py", "c", "h", "cpp", "hpp", "go", "java", "js", "ts", "rb", "sh", "toml", "json",
    "yaml", "yml", "html", "css",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Documents,
    Images,
    Audio,
    Video,
    Archives,
    Code,
    /// Paths without an extension, which is mostly directories
    Folders,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Documents,
        Category::Images,
        Category::Audio,
        Category::Video,
        Category::Archives,
        Category::Code,
        Category::Folders,
    ];

    pub fn name(&self) -> &str {
        match self {
            Category::Documents => "documents",
            Category::Images => "images",
            Category::Audio => "audio",
            Category::Video => "video",
            Category::Archives => "archives",
            Category::Code => "code",
            Category::Folders => "folders",
        }
    }

    fn extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Documents => DOCUMENT_EXTENSIONS,
            Category::Images => IMAGE_EXTENSIONS,
            Category::Audio => AUDIO_EXTENSIONS,
            Category::Video => VIDEO_EXTENSIONS,
            Category::Archives => ARCHIVE_EXTENSIONS,
            Category::Code => CODE_EXTENSIONS,
            Category::Folders => &[],
        }
    }

    /// Check whether a result path belongs to this category
    pub fn matches(&self, path: &str) -> bool {
        let ext = Path::new(path.trim_end_matches('/'))
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match (self, ext) {
            (Category::Folders, ext) => ext.is_none(),
            (_, None) => false,
            (category, Some(ext)) => category.extensions().contains(&ext.as_str()),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Category {
    type Err = LocateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| LocateError::UnknownCategory(s.trim().to_string()))
    }
}
