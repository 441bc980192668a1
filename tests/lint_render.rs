//! Lint: key hints like `[1]` must be tappable.
//!
//! Every `[X]` hint drawn by a game's `render.rs` advertises an action, so on
//! touch screens it has to be registered with `push_clickable()`. A hint
//! pushed through plain `push()` shows the key but swallows taps.

use std::fs;
use std::path::{Path, PathBuf};

/// True if `s` contains a single-character hint such as `[c]`, `[R]` or `[4]`.
fn has_key_hint(s: &str) -> bool {
    s.as_bytes()
        .windows(3)
        .any(|w| w[0] == b'[' && w[2] == b']' && w[1].is_ascii_alphanumeric())
}

/// Lines of `source` that push a key hint without registering a target.
fn untappable_hints(source: &str) -> Vec<(usize, String)> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .filter(|(_, line)| has_key_hint(line))
        .filter(|(_, line)| line.contains(".push(") && !line.contains("push_clickable("))
        .map(|(i, line)| (i + 1, line.trim().to_string()))
        .collect()
}

fn render_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            render_files(&path, out);
        } else if path.file_name().is_some_and(|n| n == "render.rs") {
            out.push(path);
        }
    }
}

#[test]
fn key_hints_are_registered_as_click_targets() {
    let mut files = Vec::new();
    render_files(&Path::new(env!("CARGO_MANIFEST_DIR")).join("src/games"), &mut files);
    assert!(!files.is_empty(), "no render.rs found under src/games");

    let mut report = String::new();
    for path in &files {
        let Ok(source) = fs::read_to_string(path) else {
            continue;
        };
        for (line_no, line) in untappable_hints(&source) {
            report.push_str(&format!("  {}:{}: {}\n", path.display(), line_no, line));
        }
    }
    assert!(
        report.is_empty(),
        "key hints pushed without push_clickable():\n{}",
        report
    );
}

#[test]
fn flags_hint_in_plain_push() {
    let source = r#"cl.push(Line::from(" [R] やり直す"));"#;
    assert_eq!(untappable_hints(source).len(), 1);
}

#[test]
fn accepts_push_clickable() {
    let source = r#"cl.push_clickable(Line::from(" [R] やり直す"), RESET_PROGRESS);"#;
    assert!(untappable_hints(source).is_empty());
}

#[test]
fn skips_comments() {
    assert!(untappable_hints(r#"// cl.push(Line::from("[1]"));"#).is_empty());
}

#[test]
fn hint_detection() {
    assert!(has_key_hint("[c]"));
    assert!(has_key_hint(" [4] ブースト"));
    assert!(!has_key_hint("[]"));
    assert!(!has_key_hint("[10]"));
    assert!(!has_key_hint("[{}]"));
}
