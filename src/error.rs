//! Crate-level error types.

use std::fmt;

/// Errors produced by the vista crate.
///
/// All errors are raised synchronously and propagate to the immediate
/// caller uninterpreted; nothing here is retried or logged on the way up.
#[derive(Debug)]
pub enum SceneError {
    /// Unknown color-map preset name.
    UnknownPreset(String),
    /// No constructor registered for a representation kind.
    UnknownRepresentation(String),
    /// Group-entry removal of a name that is not in the group.
    NotInGroup {
        /// The name that was looked up.
        name: String,
        /// Label of the group the lookup ran against.
        group: &'static str,
    },
    /// No registered format (or no reader) for a file's suffix.
    UnreadableFile(String),
    /// No registered format (or no writer) for a file's suffix.
    UnwritableFile(String),
    /// A reader failed to produce a data source.
    SourceLoad(String),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownPreset(name) => {
                write!(f, "invalid preset name: {name}")
            }
            Self::UnknownRepresentation(kind) => {
                write!(f, "invalid representation kind: {kind}")
            }
            Self::NotInGroup { name, group } => {
                write!(f, "'{name}' not in group {group}")
            }
            Self::UnreadableFile(path) => {
                write!(f, "can not read file: {path}")
            }
            Self::UnwritableFile(path) => {
                write!(f, "can not write file: {path}")
            }
            Self::SourceLoad(msg) => {
                write!(f, "source load error: {msg}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SceneError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
