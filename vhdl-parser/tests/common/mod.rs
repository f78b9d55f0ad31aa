use std::fs;
use std::path::{Path, PathBuf};

use vhdl_parser::{Backend, Module, ParseError, ParserConfig, VhdlParser};

pub struct TestHarness {
    parser: VhdlParser,
    fixtures_root: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_parser(VhdlParser::new())
    }

    #[allow(dead_code)]
    pub fn with_backend(backend: Backend) -> Self {
        Self::with_parser(VhdlParser::with_config(ParserConfig {
            backend,
            ..ParserConfig::default()
        }))
    }

    pub fn with_parser(parser: VhdlParser) -> Self {
        Self {
            parser,
            fixtures_root: default_fixtures_root(),
        }
    }

    #[allow(dead_code)]
    pub fn fixtures_root(&self) -> &Path {
        &self.fixtures_root
    }

    pub fn fixture_path(&self, relative: &str) -> PathBuf {
        self.fixtures_root.join(relative)
    }

    pub fn read_fixture(&self, relative: &str) -> String {
        let path = self.fixture_path(relative);
        fs::read_to_string(&path).unwrap_or_else(|err| {
            panic!("Failed to read fixture {}: {}", path.display(), err);
        })
    }

    pub fn parse_fixture(&self, relative: &str) -> Result<Option<Module>, ParseError> {
        let content = self.read_fixture(relative);
        self.parser.parse_content(&content)
    }

    /// Parses a fixture that must contain an entity.
    #[allow(dead_code)]
    pub fn parse_fixture_ok(&self, relative: &str) -> Module {
        self.parse_fixture(relative)
            .unwrap_or_else(|err| panic!("Failed to parse {}: {}", relative, err))
            .unwrap_or_else(|| panic!("No entity found in {}", relative))
    }

    #[allow(dead_code)]
    pub fn parse_fixture_err(&self, relative: &str) -> ParseError {
        match self.parse_fixture(relative) {
            Ok(module) => panic!("Expected {} to fail, got {:?}", relative, module),
            Err(err) => err,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

pub fn default_fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test_files")
}

pub fn iter_vhd_files(relative_dir: &str) -> Vec<PathBuf> {
    let root = default_fixtures_root().join(relative_dir);
    if !root.exists() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = fs::read_dir(&root)
        .unwrap_or_else(|err| panic!("Failed to read directory {}: {}", root.display(), err))
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            match path.extension().and_then(|ext| ext.to_str()) {
                Some("vhd") | Some("vhdl") => Some(path),
                _ => None,
            }
        })
        .collect();
    files.sort();
    files
}

/// Relative fixture paths (forward slashes) of every VHDL file in a directory.
#[allow(dead_code)]
pub fn relative_vhd_files(relative_dir: &str) -> Vec<String> {
    let root = default_fixtures_root();
    iter_vhd_files(relative_dir)
        .iter()
        .map(|path| {
            path.strip_prefix(&root)
                .unwrap_or(path.as_path())
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

#[allow(dead_code)]
pub fn for_each_vhd_file<F>(harness: &TestHarness, relative_dir: &str, mut visit: F)
where
    F: FnMut(&str, Result<Option<Module>, ParseError>),
{
    for relative in relative_vhd_files(relative_dir) {
        let result = harness.parse_fixture(&relative);
        visit(&relative, result);
    }
}

#[allow(dead_code)]
pub fn assert_directory_parses(relative_dir: &str) {
    let harness = TestHarness::default();
    for_each_vhd_file(&harness, relative_dir, |path, result| match result {
        Ok(Some(_)) => {}
        Ok(None) => panic!("Expected fixture {} to contain an entity", path),
        Err(err) => panic!("Expected fixture {} to parse successfully: {}", path, err),
    });
}

#[allow(dead_code)]
pub fn port_names(module: &Module) -> Vec<&str> {
    module.ports.iter().map(|port| port.name.as_str()).collect()
}
