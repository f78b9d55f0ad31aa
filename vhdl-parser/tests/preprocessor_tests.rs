//! Comment stripping and whitespace normalization tests.

mod common;

use vhdl_parser::normalize;
use vhdl_parser::preprocessor::find_comment_start;

#[test]
fn test_preprocess_removes_comments() {
    let raw = "entity Foo is\n  port ( A : in std_logic );  -- comment\nend;";
    let out = normalize(raw, true);

    assert_eq!(out, "entity Foo is port ( A : in std_logic ); end;");
    assert!(!out.contains("--"));
    assert!(!out.contains("comment"));
}

#[test]
fn test_preprocess_preserves_entity_port() {
    let raw = "entity AND_GATE is port ( A : in std_logic; B : in std_logic; Y : out std_logic ); end;";
    assert_eq!(normalize(raw, true), raw);
}

#[test]
fn test_preprocess_without_collapse_keeps_lines() {
    let raw = "entity Foo is -- c1\n  port ( A : in std_logic );\n";
    assert_eq!(
        normalize(raw, false),
        "entity Foo is \n  port ( A : in std_logic );\n"
    );
}

#[test]
fn test_comment_marker_inside_double_quotes_is_kept() {
    let raw = "x <= \"a--b\"; -- real comment";
    assert_eq!(normalize(raw, true), "x <= \"a--b\";");
}

#[test]
fn test_comment_marker_inside_single_quotes_is_kept() {
    assert_eq!(normalize("c <= '-'; -- dash", true), "c <= '-';");
    assert_eq!(normalize("d <= '-' & '-'; -- two", true), "d <= '-' & '-';");
}

#[test]
fn test_double_quote_inside_single_quotes_does_not_toggle() {
    assert_eq!(normalize("a <= '\"'; -- quote char", true), "a <= '\"';");
}

#[test]
fn test_quote_state_resets_each_line() {
    let raw = "s <= \"abc\n-- whole line comment\nt;";
    assert_eq!(normalize(raw, true), "s <= \"abc t;");
}

#[test]
fn test_unclosed_tick_keeps_rest_of_line() {
    // An attribute tick opens a quote span that never closes on the line
    let raw = "if clk'event -- rising\nthen";
    assert_eq!(normalize(raw, true), "if clk'event -- rising then");
}

#[test]
fn test_empty_and_blank_input_unchanged() {
    assert_eq!(normalize("", true), "");
    assert_eq!(normalize("", false), "");
    assert_eq!(normalize("   \n\t", true), "   \n\t");
    assert_eq!(normalize("   \n\t", false), "   \n\t");
}

#[test]
fn test_comment_only_input_becomes_empty() {
    assert_eq!(normalize("-- only a comment", true), "");
    assert_eq!(normalize("-- one\n-- two\n", true), "");
}

#[test]
fn test_crlf_line_endings() {
    let raw = "entity X is\r\nport (A : in bit); -- c\r\n";
    assert_eq!(normalize(raw, true), "entity X is port (A : in bit);");
}

#[test]
fn test_find_comment_start() {
    assert_eq!(find_comment_start("abc -- d"), Some(4));
    assert_eq!(find_comment_start("---"), Some(0));
    assert_eq!(find_comment_start("a - b"), None);
    assert_eq!(find_comment_start("no comment"), None);
    assert_eq!(find_comment_start("\"--\" -- x"), Some(5));
    assert_eq!(find_comment_start("'--"), None);
}

#[test]
fn test_find_comment_start_after_multibyte_text() {
    let line = "s <= \"héllo\"; -- ünïcode";
    let idx = find_comment_start(line).unwrap();
    assert_eq!(&line[idx..], "-- ünïcode");
}

#[test]
fn test_normalize_is_idempotent_on_samples() {
    let samples = [
        "entity AND_GATE is port ( A : in std_logic; B : in std_logic; Y : out std_logic ); end;",
        "entity Foo is\n\tport (\n  A : in std_logic -- trailing\n );\nend;",
        "x <= \"a--b\"; -- c\ny <= '-';",
        "-- nothing but comments\n-- here",
        "   leading and trailing   \n\n",
        "a\r\nb\r\n  c",
    ];

    for sample in samples {
        let once = normalize(sample, true);
        let twice = normalize(&once, true);
        assert_eq!(once, twice, "normalize not idempotent for {:?}", sample);
    }
}

/// A quote left open on one line pairs with a later line once lines are joined,
/// so a second pass can strip text the first pass kept.
#[test]
fn test_open_quote_across_lines_is_not_idempotent() {
    let once = normalize("'\n'--'", true);
    assert_eq!(once, "' '--'");

    let twice = normalize(&once, true);
    assert_eq!(twice, "' '");
    assert_ne!(once, twice);
}

#[test]
fn test_normalize_is_idempotent_on_fixtures() {
    for dir in ["", "vhdl_project", "micro", "unicode"] {
        for path in common::iter_vhd_files(dir) {
            let content = std::fs::read_to_string(&path).unwrap();
            let once = normalize(&content, true);
            let twice = normalize(&once, true);
            assert_eq!(once, twice, "normalize not idempotent for {}", path.display());
        }
    }
}
