pub mod cli;
pub mod declaration;
pub mod export;
pub mod grammar;
pub mod header;
pub mod parser;
pub mod preprocessor;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use cli::{parse_cli_args, ParsedArgs};
pub use declaration::{parse_port, split_declarations};
pub use header::{extract_module_header, ModuleHeader};
pub use parser::{parse_module, Backend, ParserConfig, VhdlParser};
pub use preprocessor::normalize;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}", format_syntax_errors(.0))]
    Syntax(Vec<SyntaxError>),
}

impl ParseError {
    pub fn syntax(error: SyntaxError) -> Self {
        Self::Syntax(vec![error])
    }

    /// The first syntax error, if this is a syntax failure.
    pub fn primary_error(&self) -> Option<&SyntaxError> {
        match self {
            Self::Syntax(errors) => errors.first(),
            Self::Io { .. } => None,
        }
    }
}

fn format_syntax_errors(errors: &[SyntaxError]) -> String {
    match errors {
        [] => "Parse error: unknown syntax error".to_string(),
        [single] => single.to_string(),
        many => {
            let mut out = String::from("Multiple parse errors:");
            for (i, error) in many.iter().enumerate() {
                out.push_str(&format!("\n  {}: {}", i + 1, error));
            }
            out
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub location: Option<SourceLocation>,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,                  // 0-based line number
    pub column: usize,                // 0-based column number
    pub span: Option<(usize, usize)>, // character start/end positions
}

impl SyntaxError {
    pub fn new(message: String) -> Self {
        Self {
            message,
            location: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(
                f,
                "Error at line {}, column {}: {}",
                location.line + 1,
                location.column + 1,
                self.message
            )?;
        } else {
            write!(f, "Parse error: {}", self.message)?;
        }

        if !self.suggestions.is_empty() {
            write!(f, " (Suggestions: {})", self.suggestions.join(", "))?;
        }

        Ok(())
    }
}

/// Data-flow role of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    In,
    Out,
    Inout,
    Buffer,
}

impl PortDirection {
    /// Keyword match order. `inout` and `buffer` come first so that `in`
    /// never claims the prefix of `inout`.
    pub const MATCH_ORDER: [PortDirection; 4] = [
        PortDirection::Inout,
        PortDirection::Buffer,
        PortDirection::In,
        PortDirection::Out,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PortDirection::In => "in",
            PortDirection::Out => "out",
            PortDirection::Inout => "inout",
            PortDirection::Buffer => "buffer",
        }
    }
}

impl fmt::Display for PortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::MATCH_ORDER
            .into_iter()
            .find(|direction| direction.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown port direction '{}'", s))
    }
}

/// One named signal of an entity interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub direction: PortDirection,
    #[serde(rename = "type")]
    pub type_name: String,
    pub width: u64,
}

impl Port {
    /// Builds a port, clamping `width` to at least 1.
    pub fn new(
        name: impl Into<String>,
        direction: PortDirection,
        type_name: impl Into<String>,
        width: u64,
    ) -> Self {
        Self {
            name: name.into(),
            direction,
            type_name: type_name.into(),
            width: width.max(1),
        }
    }
}

/// The extracted entity: its name and ports in declaration order.
///
/// `Module::default()` is the empty representation written out when a source
/// holds no entity at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub module_name: String,
    pub ports: Vec<Port>,
}

impl Module {
    pub fn new(module_name: impl Into<String>, ports: Vec<Port>) -> Self {
        Self {
            module_name: module_name.into(),
            ports,
        }
    }

    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|port| port.name == name)
    }
}
