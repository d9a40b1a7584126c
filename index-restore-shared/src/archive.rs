//! Archive references and their object-key encoding.
//!
//! An archive is the exported form of one index/project pair. It lives in the
//! bucket under `<index>/<project><extension>`.

use std::fmt;

use thiserror::Error;

/// Extension of a gzip-compressed, newline-delimited JSON archive.
pub const DEFAULT_ARCHIVE_EXTENSION: &str = ".ndjson.gz";

/// An object key that does not have the `<index>/<project>` shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Malformed archive key '{key}': {reason}")]
pub struct MalformedKey {
    /// The offending object key.
    pub key: String,
    /// Why the key was rejected.
    pub reason: &'static str,
}

/// Identifies one exported archive by index name and project name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveRef {
    index: String,
    project: String,
}

impl ArchiveRef {
    /// Create a new archive reference.
    pub fn new(index: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            project: project.into(),
        }
    }

    /// The exported index name.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// The project the export belongs to.
    pub fn project(&self) -> &str {
        &self.project
    }

    /// The object key of this archive for the given extension.
    ///
    /// ```
    /// use index_restore_shared::ArchiveRef;
    ///
    /// let archive = ArchiveRef::new("logs", "billing");
    /// assert_eq!(archive.object_key(".ndjson.gz"), "logs/billing.ndjson.gz");
    /// ```
    pub fn object_key(&self, extension: &str) -> String {
        format!("{}/{}{}", self.index, self.project, extension)
    }

    /// Parse an object key back into an archive reference.
    ///
    /// The key must end with `extension`; a leading `/` is tolerated. What
    /// remains must be exactly two non-empty segments.
    pub fn from_object_key(key: &str, extension: &str) -> Result<Self, MalformedKey> {
        let path = archive_path(key, extension).ok_or(MalformedKey {
            key: key.to_string(),
            reason: "missing archive extension",
        })?;

        let mut segments = path.split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some(index), Some(project), None) if !index.is_empty() && !project.is_empty() => {
                Ok(Self::new(index, project))
            }
            _ => Err(MalformedKey {
                key: key.to_string(),
                reason: "expected <index>/<project>",
            }),
        }
    }
}

impl fmt::Display for ArchiveRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.index, self.project)
    }
}

/// Strip the extension and one leading `/` from a key.
///
/// Returns `None` when the key does not carry the extension.
pub fn archive_path<'a>(key: &'a str, extension: &str) -> Option<&'a str> {
    key.strip_suffix(extension)
        .map(|path| path.strip_prefix('/').unwrap_or(path))
}
