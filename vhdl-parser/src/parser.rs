use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::declaration::{parse_port, split_declarations};
use crate::grammar::{self, EntityDeclaration};
use crate::header::extract_module_header;
use crate::preprocessor::normalize;
use crate::{Module, ParseError};

/// Runs the scan pipeline: normalize, find the header, split and type the
/// port declarations.
///
/// Returns `None` when the source has no entity header. Declarations that
/// cannot be typed are left out of the result.
pub fn parse_module(source: &str) -> Option<Module> {
    parse_normalized(&normalize(source, true))
}

fn parse_normalized(normalized: &str) -> Option<Module> {
    let header = extract_module_header(normalized)?;

    let ports = header
        .port_block
        .map(|block| {
            split_declarations(block)
                .into_iter()
                .filter_map(parse_port)
                .collect()
        })
        .unwrap_or_default();

    Some(Module::new(header.module_name, ports))
}

/// Which implementation of the extraction contract to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    /// Comment stripping plus depth-counting scanners.
    #[default]
    Scan,
    /// Lexer and entity grammar (see [`crate::grammar`]).
    Grammar,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Scan => "scan",
            Backend::Grammar => "grammar",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scan" => Ok(Backend::Scan),
            "grammar" => Ok(Backend::Grammar),
            other => Err(format!(
                "Unknown backend '{}', expected 'scan' or 'grammar'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Fold whitespace runs into single spaces after stripping comments.
    /// Only the scan backend looks at this.
    pub collapse_whitespace: bool,
    pub backend: Backend,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            collapse_whitespace: true,
            backend: Backend::Scan,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VhdlParser {
    config: ParserConfig,
}

impl VhdlParser {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn parse_file(&self, file_path: &Path) -> Result<Option<Module>, ParseError> {
        let content = read_source(file_path)?;
        self.parse_content(&content)
    }

    /// Extracts the first entity with the configured backend.
    ///
    /// The scan backend never fails; the grammar backend reports malformed
    /// entity declarations as [`ParseError::Syntax`].
    pub fn parse_content(&self, content: &str) -> Result<Option<Module>, ParseError> {
        log::trace!(
            "parsing {} characters with the {} backend",
            content.len(),
            self.config.backend
        );

        match self.config.backend {
            Backend::Scan => {
                let normalized = normalize(content, self.config.collapse_whitespace);
                Ok(parse_normalized(&normalized))
            }
            Backend::Grammar => grammar::extract_module(content),
        }
    }

    /// Syntax tree of the first entity, independent of the configured backend.
    pub fn dump_syntax_tree(&self, content: &str) -> Result<Option<EntityDeclaration>, ParseError> {
        grammar::parse_entity_declaration(content)
    }
}

/// Reads a source file, replacing invalid UTF-8 sequences.
pub fn read_source(file_path: &Path) -> Result<String, ParseError> {
    let bytes = fs::read(file_path).map_err(|source| ParseError::Io {
        path: file_path.to_path_buf(),
        source,
    })?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
