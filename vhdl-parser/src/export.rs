//! JSON export of extracted modules.
//!
//! The mapping is `{"module_name": ..., "ports": [{"name", "direction",
//! "type", "width"}, ...]}`. Front-ends read these key names directly.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Serializer;
use thiserror::Error;

use crate::Module;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to serialize module: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn to_json_value(module: &Module) -> Result<serde_json::Value, ExportError> {
    Ok(serde_json::to_value(module)?)
}

/// Pretty JSON with a four-space indent.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut serializer)?;
    // serde_json only ever emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Writes `module` as JSON to `output_path`, creating parent directories.
///
/// Returns the absolute path of the written file.
pub fn export_json(module: &Module, output_path: &Path) -> Result<PathBuf, ExportError> {
    let json = to_json_string(module)?;

    let io_error = |source| ExportError::Io {
        path: output_path.to_path_buf(),
        source,
    };

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(output_path, json + "\n").map_err(io_error)?;

    let written = fs::canonicalize(output_path).map_err(io_error)?;
    log::debug!("wrote {}", written.display());
    Ok(written)
}
