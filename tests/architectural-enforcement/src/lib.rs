//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural
//! principles of the anagram core:
//! - No sleep() calls in production code (animations wait on intervals)
//! - No module-level mutable state (id allocation and history live in
//!   context objects)
//! - No unwrap()/expect() outside tests
//!
//! The helpers below walk source trees and strip comments and test modules
//! so each check only sees production code.

use std::fs;
use std::path::{Path, PathBuf};

/// Source directory of the anagram core crate
#[must_use]
pub fn core_src_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("anagram")
        .join("core")
        .join("src")
}

/// All `.rs` files under `dir`, sorted
#[must_use]
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}

/// The part of a line before any `//` comment
#[must_use]
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Index of the first line of the file's `#[cfg(test)]` module, if any
///
/// Test modules sit at the bottom of each file, so everything from this line
/// on is test code.
#[must_use]
pub fn test_region_start(lines: &[&str]) -> Option<usize> {
    lines.iter().position(|l| l.trim() == "#[cfg(test)]")
}

/// A violation found by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the violation
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Offending source line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line, self.text)
    }
}

/// Scan production lines of every file under `dir` with `is_violation`
///
/// Comment text and `#[cfg(test)]` modules are skipped. Unreadable files are
/// ignored.
pub fn scan_production_code<F>(dir: &Path, is_violation: F) -> Vec<Violation>
where
    F: Fn(&Path, &str) -> bool,
{
    let mut violations = Vec::new();
    for path in rust_files(dir) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let lines: Vec<&str> = content.lines().collect();
        let end = test_region_start(&lines).unwrap_or(lines.len());

        for (idx, line) in lines[..end].iter().enumerate() {
            if is_violation(&path, code_part(line)) {
                violations.push(Violation {
                    path: path.clone(),
                    line: idx + 1,
                    text: line.trim().to_string(),
                });
            }
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_part_strips_comments() {
        assert_eq!(code_part("let x = 1; // sleep(1)"), "let x = 1; ");
        assert_eq!(code_part("//! docs"), "");
    }

    #[test]
    fn test_region_starts_at_cfg_test() {
        let lines = ["fn a() {}", "", "#[cfg(test)]", "mod tests {}"];
        assert_eq!(test_region_start(&lines), Some(2));
        assert_eq!(test_region_start(&lines[..2]), None);
    }

    #[test]
    fn test_core_sources_are_found() {
        let files = rust_files(&core_src_dir());
        assert!(files.iter().any(|p| p.ends_with("reconcile.rs")));
    }
}
