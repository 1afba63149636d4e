//! Error types for mesh loading and saving
//!
//! All errors carry an error code for categorization and enough context
//! (path, line number, offending text) to diagnose the failure.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: File system errors
//! - **E2xxx**: Mesh and material text parsing errors
//! - **E3xxx**: Configuration errors
//! - **E4xxx**: Serialization errors
//!
//! ## Error Codes
//!
//! - `E1001`: I/O error
//! - `E1002`: Mesh file not found
//! - `E1003`: Material library not found
//! - `E2001`: Malformed mesh line
//! - `E2002`: Malformed material library line
//! - `E3001`: Invalid option combination
//! - `E4001`: Write failure while saving

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for mesh operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when loading or saving meshes
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error that is not covered by a more specific variant
    ///
    /// **Error Code**: E1001
    ///
    /// **Common Causes**:
    /// - Insufficient permissions
    /// - Disk read error
    /// - Writing to a closed stream
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// The mesh file passed to `open` does not exist
    ///
    /// **Error Code**: E1002
    #[error("[E1002] Mesh file not found: {}", path.display())]
    FileNotFound {
        /// Path that was requested
        path: PathBuf,
    },

    /// A material library referenced by `mtllib` does not exist
    ///
    /// **Error Code**: E1003
    ///
    /// **Suggestions**:
    /// - Library paths are resolved relative to the mesh file's folder
    /// - Check the spelling and case of the `mtllib` directive
    #[error("[E1003] Material library not found: {}", path.display())]
    MaterialFileNotFound {
        /// Resolved path of the missing library
        path: PathBuf,
    },

    /// A line of mesh text could not be parsed
    ///
    /// **Error Code**: E2001
    ///
    /// **Common Causes**:
    /// - Non-numeric coordinates (e.g. "1,5" instead of "1.5")
    /// - Face with fewer than three corners
    /// - Face index `0` or an index beyond the attributes defined so far
    #[error("[E2001] Parse error at line {line}: {message}\n  > {text}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// Raw text of the offending line
        text: String,
        /// Description of what was wrong
        message: String,
    },

    /// A line of a material library could not be parsed
    ///
    /// **Error Code**: E2002
    #[error("[E2002] Material parse error in {} at line {line}: {message}\n  > {text}", path.display())]
    MaterialParse {
        /// Library the error occurred in
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// Raw text of the offending line
        text: String,
        /// Description of what was wrong
        message: String,
    },

    /// Options that cannot be honoured together
    ///
    /// **Error Code**: E3001
    ///
    /// **Common Causes**:
    /// - `split_uv_seams` without `per_vertex_flatten`
    #[error("[E3001] Invalid option combination: {0}")]
    InvalidOptionCombination(String),

    /// Saving failed while creating or writing an output file
    ///
    /// **Error Code**: E4001
    ///
    /// **Common Causes**:
    /// - Disk full
    /// - Permission denied
    /// - Parent folder does not exist
    #[error("[E4001] Failed to write {}: {source}", path.display())]
    Write {
        /// File that could not be written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Create a Parse error for a mesh line
    ///
    /// # Arguments
    /// * `line` - 1-based line number
    /// * `text` - The raw line text
    /// * `message` - Description of the error
    pub fn parse(line: usize, text: &str, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            text: text.to_string(),
            message: message.into(),
        }
    }

    /// Create a MaterialParse error for a library line
    pub fn material_parse(
        path: impl Into<PathBuf>,
        line: usize,
        text: &str,
        message: impl Into<String>,
    ) -> Self {
        Error::MaterialParse {
            path: path.into(),
            line,
            text: text.to_string(),
            message: message.into(),
        }
    }

    /// Create a Write error for an output file
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Write {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by a missing mesh or material file
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::FileNotFound { .. } | Error::MaterialFileNotFound { .. }
        )
    }

    /// Line number for parse errors, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Parse { line, .. } | Error::MaterialParse { line, .. } => Some(*line),
            _ => None,
        }
    }
}
