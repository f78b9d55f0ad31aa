//! Comment stripping and whitespace normalization.
//!
//! This is the first stage of the scan pipeline. The output of [`normalize`]
//! with whitespace collapsing enabled is a single line, which lets the header
//! and declaration scanners search across what used to be line breaks.

/// Strips `--` comments from every line and, if `collapse_whitespace` is set,
/// folds every whitespace run into a single space and trims the ends.
///
/// Empty or all-whitespace input is returned unchanged.
pub fn normalize(source: &str, collapse_whitespace: bool) -> String {
    if source.trim().is_empty() {
        return source.to_string();
    }

    let stripped = source
        .split('\n')
        .map(|line| match find_comment_start(line) {
            Some(idx) => &line[..idx],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n");

    if collapse_whitespace {
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    } else {
        stripped
    }
}

/// Byte offset of the first `--` on `line` that is outside a quoted span.
///
/// Each quote character opens and closes its own span, but only while the
/// other kind of span is closed. Nothing carries over between lines.
pub fn find_comment_start(line: &str) -> Option<usize> {
    let mut in_double = false;
    let mut in_single = false;
    let mut chars = line.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        match c {
            '"' if !in_single => in_double = !in_double,
            '\'' if !in_double => in_single = !in_single,
            '-' if !in_double && !in_single => {
                if matches!(chars.peek(), Some((_, '-'))) {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }

    None
}
