//! Textual repair for corrupted manifest lines.
//!
//! A misused additive patcher can concatenate several `key = value`
//! declarations onto one line without a line break, which is not valid
//! TOML and blocks structured parsing. This module splits such lines
//! back apart before the document is handed to the parser.
//!
//! Splitting is a heuristic over key boundaries, not a value parser:
//! a new declaration is recognized where a bare key followed by `=`
//! occurs outside any string and outside `{}`/`[]` nesting, so inline
//! tables and arrays are never split internally.

/// Repair concatenated `key = value` declarations in manifest text.
///
/// Returns `None` when the input is already well-formed (which also
/// makes the pass idempotent). Section headers, comments, and blank
/// lines pass through untouched.
pub fn repair_manifest_text(content: &str) -> Option<String> {
    let mut changed = false;
    let mut lines = Vec::new();

    for line in content.lines() {
        let pieces = split_concatenated_pairs(line);
        if pieces.len() > 1 {
            changed = true;
            lines.extend(pieces);
        } else {
            lines.push(line.to_string());
        }
    }

    if !changed {
        return None;
    }

    let mut repaired = lines.join("\n");
    if content.ends_with('\n') {
        repaired.push('\n');
    }
    Some(repaired)
}

/// Split one line into its constituent declarations.
///
/// Well-formed lines come back as a single element.
fn split_concatenated_pairs(line: &str) -> Vec<String> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('[') || trimmed.starts_with('#') {
        return vec![line.to_string()];
    }

    let starts = key_starts(line);
    if starts.len() <= 1 {
        return vec![line.to_string()];
    }

    let mut bounds = starts;
    bounds.push(line.len());
    bounds
        .windows(2)
        .map(|w| line[w[0]..w[1]].trim().to_string())
        .collect()
}

fn is_key_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// Byte offsets where a top-level `key =` declaration begins.
///
/// Tracks string and bracket state so keys inside values are ignored.
/// A key boundary is start-of-line, whitespace, or the end of a quoted
/// or bracketed value (the corruption signature has no separator at all).
fn key_starts(line: &str) -> Vec<usize> {
    let bytes = line.as_bytes();
    let mut starts = Vec::new();
    let mut depth: u32 = 0;
    let mut in_str: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if let Some(delim) = in_str {
            if delim == b'"' && b == b'\\' {
                i += 2;
                continue;
            }
            if b == delim {
                in_str = None;
            }
            i += 1;
            continue;
        }

        match b {
            b'"' | b'\'' => {
                in_str = Some(b);
                i += 1;
                continue;
            }
            b'{' | b'[' => depth += 1,
            b'}' | b']' => depth = depth.saturating_sub(1),
            b'#' if depth == 0 => break,
            _ => {}
        }

        if depth == 0 && is_key_char(b) && at_key_boundary(bytes, i) {
            let mut j = i;
            while j < bytes.len() && is_key_char(bytes[j]) {
                j += 1;
            }
            let mut k = j;
            while k < bytes.len() && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < bytes.len() && bytes[k] == b'=' {
                starts.push(i);
                i = k + 1;
                continue;
            }
            i = j;
            continue;
        }

        i += 1;
    }

    starts
}

fn at_key_boundary(bytes: &[u8], i: usize) -> bool {
    if i == 0 {
        return true;
    }
    let prev = bytes[i - 1];
    prev.is_ascii_whitespace() || matches!(prev, b'"' | b'\'' | b'}' | b']')
}
