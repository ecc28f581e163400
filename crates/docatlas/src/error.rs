//! Error types for docatlas.
//!
//! This module defines all error types used throughout the docatlas crate.
//! Errors fall into two families the caller cares about: lookups that miss
//! (`NotFound`) and content that cannot be loaded (`Load`). Neither is ever
//! retried, since the content is static.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for docatlas operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Lookup Errors ===
    /// No document has the given identifier.
    #[error("document not found: {id}")]
    DocumentNotFound {
        /// The identifier that was looked up.
        id: String,
    },

    /// No project has the given name.
    #[error("project not found: {name}")]
    ProjectNotFound {
        /// The project name that was looked up.
        name: String,
    },

    /// The comparison matrix has no row for the attribute.
    #[error("attribute not found: {attribute}")]
    AttributeNotFound {
        /// The attribute that was looked up.
        attribute: String,
    },

    /// The comparison matrix has no column for the subject.
    #[error("subject not found: {subject}")]
    SubjectNotFound {
        /// The subject that was looked up.
        subject: String,
    },

    /// The cell exists but is explicitly marked absent.
    #[error("no value for attribute '{attribute}' on subject '{subject}'")]
    ValueAbsent {
        /// Row of the absent cell.
        attribute: String,
        /// Column of the absent cell.
        subject: String,
    },

    // === Load Errors ===
    /// A required file or directory is missing from the content tree.
    #[error("missing content: {path}")]
    ContentMissing {
        /// Path that was expected to exist.
        path: PathBuf,
    },

    /// Reading a content file or directory failed.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path being read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The comparison table could not be parsed.
    #[error("malformed comparison table in {path} at line {line}: {message}")]
    MalformedTable {
        /// File holding the table.
        path: PathBuf,
        /// 1-based line number of the offending table line.
        line: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// A document's front matter block is not valid.
    #[error("malformed front matter in {path}: {message}")]
    MalformedFrontMatter {
        /// The document file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// Two documents share an identifier.
    #[error("duplicate document identifier: {id}")]
    DuplicateDocument {
        /// The repeated identifier.
        id: String,
    },

    /// Two documents of one project share an ordinal position.
    #[error("duplicate ordinal {ordinal} in project '{project}': {first} and {second}")]
    DuplicateOrdinal {
        /// The project.
        project: String,
        /// The repeated ordinal.
        ordinal: u32,
        /// Identifier already holding the ordinal.
        first: String,
        /// Identifier that tried to take it.
        second: String,
    },

    /// No ordinal is left for an unnumbered document after the largest one
    /// in its project.
    #[error("no ordinal left for {path} in project '{project}'")]
    OrdinalOverflow {
        /// The project.
        project: String,
        /// The unnumbered document.
        path: PathBuf,
    },

    /// A comparison row does not cover exactly the matrix subjects.
    #[error("comparison row '{attribute}' does not match the matrix subjects: {message}")]
    InconsistentRow {
        /// The row's attribute.
        attribute: String,
        /// Description of the mismatch.
        message: String,
    },

    /// Two comparison columns share a subject name.
    #[error("duplicate comparison subject: {subject}")]
    DuplicateSubject {
        /// The repeated subject.
        subject: String,
    },

    /// Two comparison rows share an attribute name.
    #[error("duplicate comparison attribute: {attribute}")]
    DuplicateAttribute {
        /// The repeated attribute.
        attribute: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for docatlas operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A lookup missed.
    NotFound,
    /// Static content is missing or malformed.
    Load,
    /// Configuration could not be loaded or is invalid.
    Config,
    /// Output could not be produced.
    Output,
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a document-not-found error.
    #[must_use]
    pub fn document_not_found(id: impl Into<String>) -> Self {
        Self::DocumentNotFound { id: id.into() }
    }

    /// Create a project-not-found error.
    #[must_use]
    pub fn project_not_found(name: impl Into<String>) -> Self {
        Self::ProjectNotFound { name: name.into() }
    }

    /// Create a read error for the given path.
    #[must_use]
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a malformed table error.
    #[must_use]
    pub fn malformed_table(
        path: impl Into<PathBuf>,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedTable {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// The broad category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DocumentNotFound { .. }
            | Self::ProjectNotFound { .. }
            | Self::AttributeNotFound { .. }
            | Self::SubjectNotFound { .. }
            | Self::ValueAbsent { .. } => ErrorKind::NotFound,
            Self::ContentMissing { .. }
            | Self::Read { .. }
            | Self::MalformedTable { .. }
            | Self::MalformedFrontMatter { .. }
            | Self::DuplicateDocument { .. }
            | Self::DuplicateOrdinal { .. }
            | Self::OrdinalOverflow { .. }
            | Self::InconsistentRow { .. }
            | Self::DuplicateSubject { .. }
            | Self::DuplicateAttribute { .. } => ErrorKind::Load,
            Self::ConfigLoad(_) | Self::ConfigValidation { .. } => ErrorKind::Config,
            Self::Json(_) => ErrorKind::Output,
        }
    }

    /// Check if this error is a lookup miss.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this error came from loading content.
    #[must_use]
    pub fn is_load_error(&self) -> bool {
        self.kind() == ErrorKind::Load
    }
}
