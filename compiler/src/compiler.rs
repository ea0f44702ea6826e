use tracing::{debug, warn};

use crate::{
    error::IdlError,
    parser::{parse_file, FileError},
    state::ParserError,
    types::{FileItem, FileParseFailure},
    utils::{end_position, quote},
    verifier::validate,
};

/// Turns a parse failure into a report with 1-based positions.
pub fn describe_failure(name: &str, path: &str, text: &str, err: &FileError) -> FileParseFailure {
    let ((line, col), message) = match err {
        FileError::Parser(inner) => {
            let label = inner.label().unwrap_or("unknown");
            match inner {
                ParserError::UnexpectedToken { found, line, col, .. } => (
                    (*line, *col),
                    format!("unexpected {} while parsing {}", quote(&found.to_string()), label),
                ),
                ParserError::NoMoreInput { .. } => {
                    (end_position(text), format!("no more input while parsing {}", label))
                }
                ParserError::SyntaxError { line, col, .. } | ParserError::TooDeeplyNested { line, col } => {
                    ((*line, *col), format!("syntax error while parsing {}", label))
                }
            }
        }
        FileError::Unparsed { line, col, remainder } => {
            ((*line, *col), format!("could not parse file from {}", quote(remainder)))
        }
    };
    FileParseFailure {
        name: name.to_string(),
        path: path.to_string(),
        line: line + 1,
        column: col + 1,
        message,
    }
}

/// Parses one source file into a [`FileItem`].
pub fn parse_source(name: &str, path: &str, text: &str) -> Result<FileItem, FileParseFailure> {
    match parse_file(text) {
        Ok(file) => {
            debug!(constructs = file.constructs.len(), "parsed");
            Ok(FileItem { name: name.to_string(), path: path.to_string(), file })
        }
        Err(err) => {
            let failure = describe_failure(name, path, text, &err);
            warn!(line = failure.line, column = failure.column, "{}", failure.message);
            Err(failure)
        }
    }
}

/// Parses and validates one source file.
#[tracing::instrument(skip(text), fields(len = text.len()))]
pub fn compile_source(name: &str, path: &str, text: &str) -> Result<FileItem, IdlError> {
    let item = parse_source(name, path, text).map_err(IdlError::Parse)?;
    validate(item).map_err(|err| {
        warn!(issues = err.issues.len(), "validation failed");
        IdlError::Validation(err)
    })
}
