//! Grammar backend: a chumsky lexer plus an entity grammar over its tokens.
//!
//! This is an alternative to the scan pipeline with the same contract. It
//! works on raw source text (comments are skipped by the lexer), produces a
//! syntax tree that can be dumped as JSON, and maps that tree onto the shared
//! [`Module`]/[`Port`] model through [`EntityDeclaration::to_module`].
//!
//! Only the entity header, an optional generic clause (skipped as a balanced
//! group) and the port clause are parsed. Everything after the port clause is
//! ignored.

use std::fmt;
use std::hash::Hash;

use chumsky::error::SimpleReason;
use chumsky::prelude::*;
use chumsky::Stream;
use serde::Serialize;

use crate::declaration::{range_width, RangeOrder};
use crate::header::is_word_char;
use crate::{Module, ParseError, Port, PortDirection, SourceLocation, SyntaxError};

pub type Span = std::ops::Range<usize>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    Ident(String),
    Int(String),
    Str(String),
    Char(char),
    /// Compound delimiters: `:=`, `=>`, `<=`, `>=`, `/=`, `**`.
    Op(String),
    Ctrl(char),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ident(s) | Token::Int(s) | Token::Op(s) => write!(f, "{}", s),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::Char(c) => write!(f, "'{}'", c),
            Token::Ctrl(c) => write!(f, "{}", c),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityDeclaration {
    pub name: String,
    pub name_span: (usize, usize),
    pub generic_span: Option<(usize, usize)>,
    pub port_span: Option<(usize, usize)>,
    pub ports: Vec<InterfaceDeclaration>,
    pub span: (usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceDeclaration {
    pub names: Vec<String>,
    pub mode: Option<PortDirection>,
    pub subtype: SubtypeIndication,
    pub span: (usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubtypeIndication {
    pub type_mark: String,
    pub constraint: Option<RangeConstraint>,
    pub span: (usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeConstraint {
    pub left: u64,
    pub order: RangeOrder,
    pub right: u64,
    pub span: (usize, usize),
}

impl RangeConstraint {
    pub fn width(&self) -> u64 {
        range_width(self.left, self.order, self.right)
    }
}

impl InterfaceDeclaration {
    /// Declared mode, or `in` when the declaration leaves it out.
    pub fn direction(&self) -> PortDirection {
        self.mode.unwrap_or(PortDirection::In)
    }

    pub fn width(&self) -> u64 {
        self.subtype
            .constraint
            .as_ref()
            .map_or(1, RangeConstraint::width)
    }
}

impl EntityDeclaration {
    /// Flattens the tree into the shared model, one port per declared name.
    pub fn to_module(&self) -> Module {
        let ports = self
            .ports
            .iter()
            .flat_map(|decl| {
                let direction = decl.direction();
                let width = decl.width();
                decl.names.iter().map(move |name| {
                    Port::new(name.clone(), direction, decl.subtype.type_mark.clone(), width)
                })
            })
            .collect();

        Module::new(self.name.clone(), ports)
    }
}

/// Tokenizes `source`, skipping whitespace and `--` comments.
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>, ParseError> {
    lexer()
        .parse(source)
        .map_err(|errors| convert_errors(&errors, source))
}

/// Parses the first entity declaration in `source`.
///
/// `Ok(None)` means the source has no `entity <name> is` header at all.
pub fn parse_entity_declaration(source: &str) -> Result<Option<EntityDeclaration>, ParseError> {
    let tokens = tokenize(source)?;
    let len = source.chars().count();

    design_file()
        .parse(Stream::from_iter(len..len + 1, tokens.into_iter()))
        .map_err(|errors| convert_errors(&errors, source))
}

/// Grammar-backed equivalent of [`crate::parse_module`].
pub fn extract_module(source: &str) -> Result<Option<Module>, ParseError> {
    Ok(parse_entity_declaration(source)?.map(|entity| entity.to_module()))
}

pub fn lexer() -> impl Parser<char, Vec<(Token, Span)>, Error = Simple<char>> {
    let int = filter(|c: &char| c.is_ascii_digit())
        .repeated()
        .at_least(1)
        .collect::<String>()
        .map(Token::Int);

    // Same word characters as the scan backend, so Latin-1 names lex as identifiers
    let ident = filter(|c: &char| c.is_alphabetic() || *c == '_')
        .chain(filter(|c: &char| is_word_char(*c)).repeated())
        .collect::<String>()
        .map(Token::Ident);

    let string = just('"')
        .ignore_then(
            filter(|c: &char| *c != '"' && *c != '\n')
                .repeated()
                .collect::<String>(),
        )
        .then_ignore(just('"'))
        .map(Token::Str);

    // 'x' is a character literal; a lone tick (clk'event) falls through to ctrl
    let character = just('\'')
        .ignore_then(any())
        .then_ignore(just('\''))
        .map(Token::Char);

    let op = choice((
        just(":="),
        just("=>"),
        just("<="),
        just(">="),
        just("/="),
        just("**"),
    ))
    .map(|s: &str| Token::Op(s.to_string()));

    let ctrl = filter(|c: &char| !c.is_whitespace()).map(Token::Ctrl);

    let token = choice((int, ident, string, character, op, ctrl));

    let line_comment = just("--")
        .then(filter(|c: &char| *c != '\n').repeated())
        .ignored();

    let whitespace = choice((
        filter(|c: &char| c.is_whitespace())
            .repeated()
            .at_least(1)
            .ignored(),
        line_comment,
    ))
    .repeated();

    whitespace
        .clone()
        .ignore_then(
            token
                .map_with_span(|tok, span: Span| (tok, span))
                .then_ignore(whitespace)
                .repeated(),
        )
        .then_ignore(end())
}

fn keyword(word: &'static str) -> impl Parser<Token, (), Error = Simple<Token>> + Clone {
    filter_map(move |span: Span, token: Token| {
        if matches!(&token, Token::Ident(ident) if ident.eq_ignore_ascii_case(word)) {
            Ok(())
        } else {
            Err(Simple::expected_input_found(
                span,
                [Some(Token::Ident(word.to_string()))],
                Some(token),
            ))
        }
    })
}

fn ctrl(c: char) -> impl Parser<Token, Token, Error = Simple<Token>> + Clone {
    just(Token::Ctrl(c))
}

fn identifier() -> impl Parser<Token, (String, (usize, usize)), Error = Simple<Token>> + Clone {
    filter_map(|span: Span, token: Token| match token {
        Token::Ident(name) => Ok((name, (span.start, span.end))),
        other => Err(Simple::expected_input_found(span, Vec::new(), Some(other))),
    })
    .labelled("identifier")
}

fn integer() -> impl Parser<Token, u64, Error = Simple<Token>> + Clone {
    filter_map(|span: Span, token: Token| match token {
        Token::Int(digits) => digits
            .parse::<u64>()
            .map_err(|_| Simple::custom(span, format!("Integer '{}' is out of range", digits))),
        other => Err(Simple::expected_input_found(span, Vec::new(), Some(other))),
    })
    .labelled("integer")
}

/// A parenthesized group with any content, nested groups included.
fn balanced_group() -> impl Parser<Token, Span, Error = Simple<Token>> + Clone {
    recursive(|group| {
        let inner = choice((
            group.ignored(),
            filter(|token: &Token| !matches!(token, Token::Ctrl('(') | Token::Ctrl(')')))
                .ignored(),
        ));

        ctrl('(')
            .ignore_then(inner.repeated())
            .then_ignore(ctrl(')'))
            .map_with_span(|_, span: Span| span)
    })
}

fn interface_declaration() -> impl Parser<Token, InterfaceDeclaration, Error = Simple<Token>> + Clone
{
    let object_class = choice((
        keyword("signal"),
        keyword("variable"),
        keyword("constant"),
    ))
    .or_not();

    let mode = choice((
        keyword("inout").to(PortDirection::Inout),
        keyword("buffer").to(PortDirection::Buffer),
        keyword("in").to(PortDirection::In),
        keyword("out").to(PortDirection::Out),
    ));

    let range_order = choice((
        keyword("downto").to(RangeOrder::Downto),
        keyword("to").to(RangeOrder::To),
    ));

    let numeric_range = integer()
        .then(range_order)
        .then(integer())
        .delimited_by(ctrl('('), ctrl(')'))
        .map_with_span(|((left, order), right), span: Span| RangeConstraint {
            left,
            order,
            right,
            span: (span.start, span.end),
        });

    // Non-numeric constraints such as (WIDTH-1 downto 0) are accepted but
    // carry no width.
    let constraint = numeric_range.map(Some).or(balanced_group().to(None));

    let subtype = identifier()
        .then(constraint.or_not())
        .map_with_span(|((type_mark, _), constraint), span: Span| SubtypeIndication {
            type_mark,
            constraint: constraint.flatten(),
            span: (span.start, span.end),
        });

    // Defaults (:= ...) and trailing constraints (range 0 to 15)
    let trailing = choice((
        balanced_group().ignored(),
        filter(|token: &Token| {
            !matches!(
                token,
                Token::Ctrl(';') | Token::Ctrl('(') | Token::Ctrl(')')
            )
        })
        .ignored(),
    ))
    .repeated();

    object_class
        .ignore_then(identifier().separated_by(ctrl(',')).at_least(1))
        .then_ignore(ctrl(':'))
        .then(mode.or_not())
        .then(subtype)
        .then_ignore(trailing)
        .map_with_span(|((names, mode), subtype), span: Span| InterfaceDeclaration {
            names: names.into_iter().map(|(name, _)| name).collect(),
            mode,
            subtype,
            span: (span.start, span.end),
        })
}

fn design_file() -> impl Parser<Token, Option<EntityDeclaration>, Error = Simple<Token>> {
    let entity_head = keyword("entity")
        .ignore_then(identifier())
        .then_ignore(keyword("is"));

    let generic_clause = keyword("generic")
        .ignore_then(balanced_group())
        .then_ignore(ctrl(';').or_not())
        .map_with_span(|_, span: Span| (span.start, span.end));

    let port_clause = keyword("port")
        .ignore_then(
            interface_declaration()
                .separated_by(ctrl(';'))
                .allow_trailing()
                .delimited_by(ctrl('('), ctrl(')')),
        )
        .then_ignore(ctrl(';').or_not())
        .map_with_span(|ports, span: Span| (ports, (span.start, span.end)));

    // A clause keyword left over means its clause failed to parse
    let after_clauses = choice((keyword("port"), keyword("generic")))
        .not()
        .rewind()
        .ignored()
        .or(end());

    let entity_declaration = entity_head
        .clone()
        .then(generic_clause.or_not())
        .then(port_clause.or_not())
        .then_ignore(after_clauses)
        .map_with_span(
            |(((name, name_span), generic_span), port_clause), span: Span| {
                let (ports, port_span) = match port_clause {
                    Some((ports, port_span)) => (ports, Some(port_span)),
                    None => (Vec::new(), None),
                };
                EntityDeclaration {
                    name,
                    name_span,
                    generic_span,
                    port_span,
                    ports,
                    span: (span.start, span.end),
                }
            },
        );

    entity_head
        .not()
        .repeated()
        .ignore_then(entity_declaration.map(Some).or(end().to(None)))
        .then_ignore(any().repeated())
        .then_ignore(end())
}

fn convert_errors<T>(errors: &[Simple<T>], source: &str) -> ParseError
where
    T: fmt::Display + Hash + Eq,
{
    if errors.is_empty() {
        return ParseError::syntax(SyntaxError::new("Unknown parse error".to_string()));
    }

    let mut syntax_errors: Vec<SyntaxError> = errors
        .iter()
        .map(|error| convert_error(error, source))
        .collect();

    syntax_errors.sort_by_key(|error| {
        error
            .location
            .as_ref()
            .map_or((usize::MAX, usize::MAX), |loc| (loc.line, loc.column))
    });

    ParseError::Syntax(syntax_errors)
}

fn convert_error<T>(error: &Simple<T>, source: &str) -> SyntaxError
where
    T: fmt::Display + Hash + Eq,
{
    let found = error
        .found()
        .map(|token| format!("'{}'", token))
        .unwrap_or_else(|| "end of input".to_string());

    let mut expected: Vec<String> = error
        .expected()
        .map(|exp| match exp {
            Some(token) => format!("'{}'", token),
            None => "end of input".to_string(),
        })
        .collect();
    expected.sort();
    expected.dedup();

    let mut syntax_error = match error.reason() {
        SimpleReason::Unclosed { delimiter, .. } => {
            SyntaxError::new(format!("Unclosed delimiter '{}'", delimiter))
                .with_suggestion(format!("Add closing delimiter for '{}'", delimiter))
        }
        SimpleReason::Custom(msg) => SyntaxError::new(msg.clone()),
        SimpleReason::Unexpected => {
            let message = match (error.label(), expected.is_empty()) {
                (Some(label), _) => format!("Unexpected {}, expected {}", found, label),
                (None, true) => format!("Unexpected {}", found),
                (None, false) => format!(
                    "Unexpected {}, expected {}",
                    found,
                    format_expectations(&expected)
                ),
            };
            let mut syntax_error = SyntaxError::new(message);
            for suggestion in expected.iter().filter_map(|exp| expectation_to_suggestion(exp)) {
                syntax_error = syntax_error.with_suggestion(suggestion.to_string());
            }
            syntax_error
        }
    };

    syntax_error = syntax_error.with_location(span_to_location(&error.span(), source));
    syntax_error
}

fn format_expectations(expected: &[String]) -> String {
    if expected.len() == 1 {
        expected[0].clone()
    } else if expected.len() <= 3 {
        expected.join(" or ")
    } else {
        format!("one of: {}", expected.join(", "))
    }
}

fn expectation_to_suggestion(exp: &str) -> Option<&'static str> {
    match exp {
        "')'" => Some("Add closing parenthesis ')'"),
        "'('" => Some("Add opening parenthesis '('"),
        "';'" => Some("Add semicolon ';'"),
        "':'" => Some("Separate port names from their mode with ':'"),
        "'is'" => Some("Follow the entity name with 'is'"),
        _ => None,
    }
}

/// Line and column (both 0-based) of a character-offset span.
fn span_to_location(span: &Span, source: &str) -> SourceLocation {
    let mut line = 0;
    let mut column = 0;
    for c in source.chars().take(span.start) {
        if c == '\n' {
            line += 1;
            column = 0;
        } else {
            column += 1;
        }
    }

    SourceLocation {
        line,
        column,
        span: Some((span.start, span.end)),
    }
}
