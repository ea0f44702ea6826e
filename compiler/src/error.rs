use std::path::PathBuf;

use thiserror::Error;

use crate::{
    types::{FileParseFailure, InvalidFileItem},
    verifier::{FileValidationError, ProjectDuplicate},
};

#[derive(Debug, Error)]
pub enum IdlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error in {0}")]
    Parse(FileParseFailure),

    #[error("{} file(s) failed to parse", .0.len())]
    ParseFailures(Vec<FileParseFailure>),

    #[error("Verifier error: {0}")]
    Validation(FileValidationError),

    #[error("{} file(s) failed validation", .0.len())]
    ValidationFailures(Vec<InvalidFileItem>),

    #[error("{} type(s) are declared in more than one file", .0.len())]
    DuplicateAcrossFiles(Vec<ProjectDuplicate>),

    #[error("Invalid source directory {}", .0.display())]
    InvalidSourceDirectory(PathBuf),
}
