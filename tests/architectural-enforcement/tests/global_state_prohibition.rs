//! Integration Test: Global State and Panicking Shortcuts
//!
//! **Policy**: The anagram core keeps all mutable state in context objects
//! (`TileSet` owns the id allocator, `Workbench` owns the history). Module
//! level mutable statics are forbidden, and production code propagates or
//! logs failures instead of calling `unwrap()`/`expect()`.

use std::path::Path;

use architectural_enforcement::{core_src_dir, scan_production_code};

/// Line declares module-level mutable state
fn is_global_state(_path: &Path, code: &str) -> bool {
    let trimmed = code.trim_start();
    let is_static = trimmed.starts_with("static ") || trimmed.starts_with("pub static ");
    (is_static
        && (trimmed.contains("static mut ")
            || trimmed.contains("Atomic")
            || trimmed.contains("Mutex")
            || trimmed.contains("RwLock")
            || trimmed.contains("Cell<")))
        || trimmed.starts_with("thread_local!")
        || trimmed.starts_with("lazy_static!")
}

/// Line unwraps instead of handling the error
fn is_unwrap(_path: &Path, code: &str) -> bool {
    code.contains(".unwrap()") || code.contains(".expect(")
}

#[test]
fn test_no_module_level_mutable_state() {
    let violations = scan_production_code(&core_src_dir(), is_global_state);

    if !violations.is_empty() {
        eprintln!("\n❌ Module-level mutable state found:\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\nMove the state into TileSet, TxnStack or Workbench.");
        panic!("Found {} global state violation(s)", violations.len());
    }
}

#[test]
fn test_no_unwrap_in_production_code() {
    let violations = scan_production_code(&core_src_dir(), is_unwrap);

    if !violations.is_empty() {
        eprintln!("\n❌ unwrap()/expect() found in production code:\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        panic!("Found {} unwrap violation(s)", violations.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_global_counter() {
        let p = Path::new("tile.rs");
        assert!(is_global_state(p, "static NEXT_ID: AtomicU64 = AtomicU64::new(0);"));
        assert!(is_global_state(p, "static mut LAST: u64 = 0;"));
        assert!(!is_global_state(p, "const DEFAULT_PHRASE: &str = \"dormitory\";"));
        assert!(!is_global_state(p, "fn next_id(&mut self) -> TileId {"));
    }

    #[test]
    fn test_detects_unwrap() {
        let p = Path::new("board.rs");
        assert!(is_unwrap(p, "let x = y.unwrap();"));
        assert!(!is_unwrap(p, "let x = y.unwrap_or(0);"));
    }
}
