//! Entity header discovery and port block extraction.
//!
//! Works on normalized text (see [`crate::preprocessor::normalize`]). All
//! keyword matching is ASCII case-insensitive and all scans are single
//! forward passes.

/// Name of the first entity in a source and the raw text of its port list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleHeader<'a> {
    pub module_name: &'a str,
    /// Text between `port (` and its matching `)`, trimmed. `None` when the
    /// source has no port clause at all.
    pub port_block: Option<&'a str>,
}

/// Finds `entity <name> is` and the first `port (...)` block.
///
/// Returns `None` when there is no entity header. A missing port clause is
/// not a failure: the header comes back with `port_block: None`.
pub fn extract_module_header(normalized: &str) -> Option<ModuleHeader<'_>> {
    let module_name = normalized
        .char_indices()
        .filter(|&(idx, _)| at_word_start(normalized, idx))
        .find_map(|(idx, _)| match_entity_header(normalized, idx))?;

    let port_block = find_port_open(normalized).map(|start| {
        let block = balanced_block(normalized, start);
        block.trim()
    });

    log::trace!(
        "entity header '{}' found, port block present: {}",
        module_name,
        port_block.is_some()
    );

    Some(ModuleHeader {
        module_name,
        port_block,
    })
}

/// Matches `entity <name> is` starting exactly at `start`.
fn match_entity_header(text: &str, start: usize) -> Option<&str> {
    let after_keyword = keyword_at(text, start, "entity")?;

    let name_start = skip_whitespace(text, after_keyword);
    if name_start == after_keyword {
        return None;
    }
    let name_end = take_word(text, name_start);
    if name_end == name_start {
        return None;
    }

    let is_start = skip_whitespace(text, name_end);
    if is_start == name_end {
        return None;
    }
    let is_end = keyword_at(text, is_start, "is")?;

    at_word_end(text, is_end).then(|| &text[name_start..name_end])
}

/// Byte offset just past the `(` of the first `port (`.
fn find_port_open(text: &str) -> Option<usize> {
    text.char_indices()
        .filter(|&(idx, _)| at_word_start(text, idx))
        .find_map(|(idx, _)| {
            let after_keyword = keyword_at(text, idx, "port")?;
            let paren = skip_whitespace(text, after_keyword);
            text[paren..].starts_with('(').then_some(paren + 1)
        })
}

/// Text from `start` up to the `)` that closes an already-open `(`.
///
/// Depth starts at 1. If the parentheses never balance, everything up to the
/// end of `text` is returned.
pub fn balanced_block(text: &str, start: usize) -> &str {
    let mut depth = 1usize;
    for (offset, c) in text[start..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return &text[start..start + offset];
                }
            }
            _ => {}
        }
    }

    log::debug!("unbalanced parentheses after offset {}, taking rest of input", start);
    &text[start..]
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// End offset of `keyword` if it appears (ignoring ASCII case) at `pos`.
pub(crate) fn keyword_at(text: &str, pos: usize, keyword: &str) -> Option<usize> {
    let end = pos + keyword.len();
    let candidate = text.get(pos..end)?;
    candidate.eq_ignore_ascii_case(keyword).then_some(end)
}

pub(crate) fn skip_whitespace(text: &str, pos: usize) -> usize {
    let rest = &text[pos..];
    pos + (rest.len() - rest.trim_start().len())
}

/// End offset of the run of word characters starting at `pos`.
pub(crate) fn take_word(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .find(|&(_, c)| !is_word_char(c))
        .map_or(text.len(), |(offset, _)| pos + offset)
}

fn at_word_start(text: &str, pos: usize) -> bool {
    text[..pos]
        .chars()
        .next_back()
        .map_or(true, |c| !is_word_char(c))
}

fn at_word_end(text: &str, pos: usize) -> bool {
    text[pos..].chars().next().map_or(true, |c| !is_word_char(c))
}
