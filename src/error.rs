//! Tagged failures for the conversion pipeline.
//!
//! Every variant renders to the diagnostic string a viewer shows the user
//! (`[ERROR] ...` or `[INFO] ...`), while [`ConvertError::kind`] lets a
//! program branch on the failure without parsing text.

use crate::capability::Capability;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Outcome of one extraction or conversion: text, or a typed failure.
pub type ExtractionResult = Result<String, ConvertError>;

/// Failure taxonomy of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Input path does not exist or is not a regular file
    NotFound,
    /// No extractor for the input, or a known but unreadable format
    UnsupportedFormat,
    /// The backend required for a recognized format is unavailable
    MissingCapability,
    /// The backend was available but failed on this input
    ExtractionFailure,
    /// Input was structurally readable but lacked the expected layout
    PartialUnderstanding,
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("[ERROR] File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("[ERROR] Unsupported or unknown file type: '{ext}' (MIME: '{mime}')")]
    UnknownType { ext: String, mime: String },

    #[error("[ERROR] .doc (binary) format is not supported by the built-in readers. Use external tools.")]
    LegacyDoc,

    #[error("[ERROR] {0} not installed or failed to import.")]
    MissingCapability(Capability),

    /// `context` names the failed step, e.g. "PDF text extraction failed"
    #[error("[ERROR] {context}: {cause}")]
    Failed { context: &'static str, cause: String },

    #[error("[ERROR] {0}")]
    Unreadable(String),

    #[error("[INFO] {0}")]
    Incomplete(String),
}

impl ConvertError {
    /// Build an extraction failure from any error, keeping its context chain.
    pub fn failed(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Failed {
            context,
            cause: err.to_string(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotFound(_) => FailureKind::NotFound,
            Self::UnknownType { .. } | Self::LegacyDoc => FailureKind::UnsupportedFormat,
            Self::MissingCapability(_) => FailureKind::MissingCapability,
            Self::Failed { .. } | Self::Unreadable(_) => FailureKind::ExtractionFailure,
            Self::Incomplete(_) => FailureKind::PartialUnderstanding,
        }
    }
}
