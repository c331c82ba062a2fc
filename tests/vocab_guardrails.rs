use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use mlpy_core::lang::operators::OPERATORS;
use mlpy_core::lang::runtime::RUNTIME_FUNCTIONS;

/// Guardrail against stringly-typed operator and runtime checks.
///
/// Looks for `== "<spelling>"` or `"<spelling>" =>` in Rust sources, where callers should go through
/// `mlpy_core::lang` lookups (`operators::from_str`, `runtime::as_str`) instead.
///
/// Notes:
/// - The registries themselves and tests are allowed to spell things out.
/// - This is a coarse net for the "I added a string match" mistake, not a parser.
#[test]
fn no_stringly_vocab_checks_in_rust_sources() {
    let root = repo_root();
    let spellings = spellings();
    let mut offenders: Vec<(PathBuf, usize, String)> = Vec::new();

    for dir in [root.join("src"), root.join("crates")] {
        if dir.exists() {
            scan_dir(&root, &dir, &spellings, &mut offenders);
        }
    }

    if !offenders.is_empty() {
        let mut msg = String::new();
        msg.push_str("Found stringly-typed vocabulary checks. Prefer mlpy_core::lang lookups.\n\n");
        for (path, line_no, line) in offenders.into_iter().take(80) {
            msg.push_str(&format!(
                "- {}:{}: {}\n",
                path.strip_prefix(&root).unwrap_or(&path).display(),
                line_no,
                line.trim()
            ));
        }
        panic!("{msg}");
    }
}

#[test]
fn spellings_cover_both_registries() {
    let spellings = spellings();
    assert!(spellings.contains(&".*"));
    assert!(spellings.contains(&"~="));
    assert!(spellings.contains(&"matlabarray"));
    assert!(spellings.contains(&"workspace_"));
}

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn spellings() -> Vec<&'static str> {
    let mut set: BTreeSet<&'static str> = BTreeSet::new();
    for op in OPERATORS {
        set.extend(op.spellings.iter().copied());
    }
    for f in RUNTIME_FUNCTIONS {
        set.insert(f.canonical);
    }
    set.into_iter().collect()
}

fn is_allowed_file(root: &Path, path: &Path) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path).to_string_lossy();
    if !rel.ends_with(".rs") {
        return true;
    }
    if rel.starts_with("crates/mlpy_core/src/lang/") {
        return true;
    }
    rel.starts_with("tests/") || rel.ends_with("/tests.rs")
}

fn scan_dir(root: &Path, dir: &Path, spellings: &[&'static str], offenders: &mut Vec<(PathBuf, usize, String)>) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            scan_dir(root, &path, spellings, offenders);
            continue;
        }
        if is_allowed_file(root, &path) {
            continue;
        }
        let Ok(contents) = fs::read_to_string(&path) else {
            continue;
        };
        for (idx, line) in contents.lines().enumerate() {
            if is_suspicious_line(line, spellings) {
                offenders.push((path.clone(), idx + 1, line.to_string()));
            }
        }
    }
}

fn is_suspicious_line(line: &str, spellings: &[&'static str]) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with("//") {
        return false;
    }
    spellings.iter().any(|s| {
        let s = s.replace('\\', "\\\\");
        line.contains(&format!("== \"{s}\"")) || line.contains(&format!("\"{s}\" =>"))
    })
}
