//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the anagram core MUST NOT call sleep
//! methods. Animations are paced by `tokio::time::interval`, one per running
//! animation.
//! **Exceptions**: test code (`#[test]` / `#[tokio::test]` functions)

use std::fs;
use std::path::Path;

use architectural_enforcement::{code_part, core_src_dir, rust_files};

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = find_sleep_violations(&core_src_dir());

    if !violations.is_empty() {
        eprintln!("\n❌ CRITICAL: Sleep calls found in production code!\n");

        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }

        eprintln!("\n✅ ACCEPTABLE sleep uses:");
        eprintln!("  - Test code (#[test] or #[tokio::test] functions)");
        eprintln!("  - Periodic tasks using tokio::time::interval()");
        eprintln!("\n❌ FORBIDDEN:");
        eprintln!("  - Sleep between animation frames");
        eprintln!("  - Sleep to 'wait' for an animation (use AnimationHandle::wait)");

        panic!(
            "\nFound {} sleep violation(s) in production code.\nFix these before merging!",
            violations.len()
        );
    }
}

/// Find all sleep() calls outside test functions
fn find_sleep_violations(dir: &Path) -> Vec<String> {
    let mut violations = Vec::new();
    for path in rust_files(dir) {
        check_file(&path, &mut violations);
    }
    violations
}

fn check_file(path: &Path, violations: &mut Vec<String>) {
    let Ok(content) = fs::read_to_string(path) else {
        return;
    };
    let lines: Vec<&str> = content.lines().collect();

    for (idx, line) in lines.iter().enumerate() {
        let code = code_part(line);
        if !(code.contains("::sleep(") || code.contains(".sleep(")) {
            continue;
        }
        if is_in_test_function(&lines, idx) {
            continue;
        }
        violations.push(format!("{}:{} - {}", path.display(), idx + 1, line.trim()));
    }
}

/// Check if line is inside a test function
fn is_in_test_function(lines: &[&str], current_idx: usize) -> bool {
    // Scan backwards for #[test] or #[tokio::test]
    for i in (0..current_idx).rev() {
        let line = lines[i].trim();

        if line.starts_with("#[test]") || line.starts_with("#[tokio::test") {
            return true;
        }

        let is_fn = line.starts_with("fn ")
            || line.starts_with("async fn ")
            || line.starts_with("pub fn ");
        if is_fn && !line.contains("fn test_") {
            return false;
        }

        // Stop at module boundaries
        if line.starts_with("mod ") || line.starts_with("impl ") {
            return false;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_in_plain_function_is_flagged() {
        let code = [
            "fn settle_badly() {",
            "    tokio::time::sleep(Duration::from_millis(100)).await;",
            "}",
        ];
        assert!(!is_in_test_function(&code, 1));
    }

    #[test]
    fn test_sleep_in_tokio_test_is_allowed() {
        let code = [
            "#[tokio::test(start_paused = true)]",
            "async fn test_tokio_driver_moves_on_its_own_timer() {",
            "    let visual = TileVisual::new('x', Point::new(0, 0));",
            "    tokio::time::sleep(Duration::from_millis(45)).await;",
            "}",
        ];
        assert!(is_in_test_function(&code, 3));
    }
}
