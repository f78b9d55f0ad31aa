//! Splitting a port block into declarations and typing each declaration.

use crate::header::{keyword_at, skip_whitespace, take_word};
use crate::{Port, PortDirection};

/// Placeholder type name for a declaration with nothing after its direction.
pub const UNKNOWN_TYPE: &str = "unknown";

/// Index order of a range expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeOrder {
    Downto,
    To,
}

impl RangeOrder {
    pub fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("downto") {
            Some(RangeOrder::Downto)
        } else if word.eq_ignore_ascii_case("to") {
            Some(RangeOrder::To)
        } else {
            None
        }
    }
}

/// Bit width of `(left <order> right)`, never less than 1.
///
/// `downto` declares `(high, low)`, `to` declares `(low, high)`.
pub fn range_width(left: u64, order: RangeOrder, right: u64) -> u64 {
    let (high, low) = match order {
        RangeOrder::Downto => (left, right),
        RangeOrder::To => (right, left),
    };
    high.checked_sub(low)
        .map_or(1, |distance| distance.saturating_add(1))
}

/// Splits on `;` wherever parenthesis depth is zero.
///
/// Fragments are trimmed and empty ones dropped.
pub fn split_declarations(block: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: isize = 0;
    let mut start = 0;

    for (idx, c) in block.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ';' if depth == 0 => {
                parts.push(&block[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&block[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Parses one declaration such as `DATA : out std_logic_vector(7 downto 0)`.
///
/// Returns `None` when there is no top-level `:`, when either side of it is
/// empty, or when no direction keyword leads the right-hand side.
pub fn parse_port(decl: &str) -> Option<Port> {
    let Some((name_part, mode_part)) = split_at_top_level_colon(decl) else {
        log::debug!("dropping declaration without ':': {:?}", decl);
        return None;
    };

    let name = name_part.trim();
    let mode_and_type = mode_part.trim();
    if name.is_empty() || mode_and_type.is_empty() {
        log::debug!("dropping declaration with an empty side: {:?}", decl);
        return None;
    }

    let Some((direction, rest)) = take_direction(mode_and_type) else {
        log::debug!("dropping declaration without direction: {:?}", decl);
        return None;
    };

    let (type_name, width) = parse_port_type(rest);
    Some(Port::new(name, direction, type_name, width))
}

/// Type name and width for the text that follows a direction keyword.
pub fn parse_port_type(rest: &str) -> (&str, u64) {
    let rest = rest.trim();

    if let Some((type_name, left, order, right)) = match_ranged_type(rest) {
        return (type_name, range_width(left, order, right));
    }

    let word_end = take_word(rest, 0);
    if word_end > 0 {
        return (&rest[..word_end], 1);
    }

    (rest.split_whitespace().next().unwrap_or(UNKNOWN_TYPE), 1)
}

fn split_at_top_level_colon(decl: &str) -> Option<(&str, &str)> {
    let mut depth: isize = 0;
    for (idx, c) in decl.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ':' if depth == 0 => return Some((&decl[..idx], &decl[idx + 1..])),
            _ => {}
        }
    }
    None
}

/// Leading direction keyword of `mode_and_type` and the text after it.
///
/// The keyword has to be followed by whitespace, so `inside` is not `in`.
fn take_direction(mode_and_type: &str) -> Option<(PortDirection, &str)> {
    PortDirection::MATCH_ORDER.into_iter().find_map(|direction| {
        let end = keyword_at(mode_and_type, 0, direction.as_str())?;
        let rest = &mode_and_type[end..];
        rest.starts_with(char::is_whitespace)
            .then(|| (direction, rest.trim_start()))
    })
}

/// `<type> ( <int> downto|to <int> )` anchored at the start of `text`.
fn match_ranged_type(text: &str) -> Option<(&str, u64, RangeOrder, u64)> {
    let type_end = take_word(text, 0);
    if type_end == 0 {
        return None;
    }

    let open = skip_whitespace(text, type_end);
    if !text[open..].starts_with('(') {
        return None;
    }

    let left_start = skip_whitespace(text, open + 1);
    let (left, left_end) = take_integer(text, left_start)?;

    let order_start = skip_whitespace(text, left_end);
    if order_start == left_end {
        return None;
    }
    let order_end = take_word(text, order_start);
    let order = RangeOrder::from_keyword(&text[order_start..order_end])?;

    let right_start = skip_whitespace(text, order_end);
    if right_start == order_end {
        return None;
    }
    let (right, right_end) = take_integer(text, right_start)?;

    let close = skip_whitespace(text, right_end);
    text[close..]
        .starts_with(')')
        .then(|| (&text[..type_end], left, order, right))
}

/// Decimal literal at `pos`. Values that overflow `u64` do not count.
fn take_integer(text: &str, pos: usize) -> Option<(u64, usize)> {
    let digits = text[pos..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    let end = pos + digits;
    text[pos..end].parse().ok().map(|value| (value, end))
}
