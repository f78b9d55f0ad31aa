use std::path::{Path, PathBuf};

use crate::parser::{Backend, ParserConfig};

/// Default JSON file name for a single input.
pub const DEFAULT_OUTPUT_NAME: &str = "output.json";

#[derive(Debug, PartialEq)]
pub enum OutputTarget {
    /// `output.json` next to a single input, `<stem>.json` next to each of
    /// several inputs.
    Default,
    File(PathBuf),
    Stdout,
}

#[derive(Debug, PartialEq)]
pub struct ParsedArgs {
    pub files: Vec<PathBuf>,
    pub output: OutputTarget,
    pub config: ParserConfig,
    pub dump_ast: bool,
    pub verbose: bool,
    pub fail_fast: bool,
}

impl ParsedArgs {
    /// Where the JSON for `input` goes, or `None` for stdout.
    pub fn output_path_for(&self, input: &Path) -> Option<PathBuf> {
        let dir = input.parent().unwrap_or_else(|| Path::new(""));
        match &self.output {
            OutputTarget::Stdout => None,
            OutputTarget::File(path) => Some(path.clone()),
            OutputTarget::Default if self.files.len() == 1 => Some(dir.join(DEFAULT_OUTPUT_NAME)),
            OutputTarget::Default => {
                let stem = input
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "output".to_string());
                Some(dir.join(format!("{}.json", stem)))
            }
        }
    }
}

pub fn parse_cli_args(
    files: Vec<PathBuf>,
    output: Option<PathBuf>,
    no_normalize: bool,
    backend: &str,
    dump_ast: bool,
    verbose: bool,
    fail_fast: bool,
) -> Result<ParsedArgs, String> {
    if files.is_empty() {
        return Err("No input files specified".to_string());
    }

    let output = match output {
        None => OutputTarget::Default,
        Some(path) if path.as_os_str() == "-" => OutputTarget::Stdout,
        Some(path) => {
            if files.len() > 1 {
                return Err(format!(
                    "--output {} needs exactly one input file, got {}",
                    path.display(),
                    files.len()
                ));
            }
            OutputTarget::File(path)
        }
    };

    let backend = backend.parse::<Backend>()?;

    Ok(ParsedArgs {
        files,
        output,
        config: ParserConfig {
            collapse_whitespace: !no_normalize,
            backend,
        },
        dump_ast,
        verbose,
        fail_fast,
    })
}
