//! Finds IDL sources under a directory and parses each of them.
//!
//! Every file is parsed on its own; a failing file is recorded and the scan
//! moves on, so one report carries all parse failures of a source tree.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    compiler::parse_source,
    error::IdlError,
    types::{FileItem, FileParseFailure},
};

pub const DEFAULT_EXTENSION: &str = "idl";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub source_dir: PathBuf,
    /// File extension to pick up, without the leading dot.
    pub extension:  String,
}

impl ScanConfig {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        ScanConfig { source_dir: source_dir.into(), extension: DEFAULT_EXTENSION.to_string() }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScanReport {
    pub files:    Vec<FileItem>,
    pub failures: Vec<FileParseFailure>,
}

impl ScanReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// The parsed files, or every failure when at least one file failed.
    pub fn into_result(self) -> Result<Vec<FileItem>, IdlError> {
        if self.failures.is_empty() {
            Ok(self.files)
        } else {
            Err(IdlError::ParseFailures(self.failures))
        }
    }
}

/// All files below `dir` with the given extension, sorted by path.
pub fn find_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, IdlError> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == extension) {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn scan_file(root: &Path, path: &Path) -> Result<FileItem, FileParseFailure> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let relative = relative_path(root, path);
    debug!(path = %relative, "scanning");
    match fs::read_to_string(path) {
        Ok(text) => parse_source(&name, &relative, &text),
        Err(err) => Err(FileParseFailure {
            name,
            path: relative,
            line: 0,
            column: 0,
            message: format!("could not read file: {}", err),
        }),
    }
}

/// Parses every matching file under `config.source_dir`.
pub fn scan(config: &ScanConfig) -> Result<ScanReport, IdlError> {
    let root = config.source_dir.as_path();
    if !root.is_dir() {
        return Err(IdlError::InvalidSourceDirectory(root.to_path_buf()));
    }

    let mut report = ScanReport::default();
    for path in find_files(root, &config.extension)? {
        match scan_file(root, &path) {
            Ok(item) => report.files.push(item),
            Err(failure) => report.failures.push(failure),
        }
    }

    info!(
        parsed = report.files.len(),
        failed = report.failures.len(),
        "scanned {}",
        root.display()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let root = Path::new("/src");
        assert_eq!(relative_path(root, Path::new("/src/api/user.idl")), "api/user.idl");
        assert_eq!(relative_path(root, Path::new("other.idl")), "other.idl");
    }

    #[test]
    fn test_missing_directory() {
        let config = ScanConfig::new("/definitely/not/here");
        assert!(matches!(scan(&config), Err(IdlError::InvalidSourceDirectory(_))));
    }

    #[test]
    fn test_config_defaults() {
        let config = ScanConfig::new("idl").with_extension("api");
        assert_eq!(config.extension, "api");
        assert_eq!(ScanConfig::new("idl").extension, DEFAULT_EXTENSION);
    }
}
