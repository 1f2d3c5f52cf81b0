//! Reading and writing config files.
//!
//! Path-based functions create parent directories on save and attach the
//! offending path to I/O errors. The reader/writer variants work on any
//! stream and report plain I/O errors, since there is no path to blame.

use std::io::{Read, Write};
use std::path::Path;

use crate::config::Config;
use crate::error::CoqpitError;

/// Write an instance to `path` as indented JSON. Creates parent
/// directories as needed.
pub fn save_json(config: &Config, path: &Path) -> Result<(), CoqpitError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CoqpitError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let text = config.to_json_pretty()?;
    std::fs::write(path, text).map_err(|e| CoqpitError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write an instance as indented JSON to an open stream.
pub fn save_json_writer(config: &Config, writer: &mut impl Write) -> Result<(), CoqpitError> {
    let text = config.to_json_pretty()?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

/// Load a JSON file into an existing instance. Same strict, sparse,
/// atomic behavior as [`Config::from_json`].
pub fn load_json(config: &mut Config, path: &Path) -> Result<(), CoqpitError> {
    let text = std::fs::read_to_string(path).map_err(|e| CoqpitError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    config.from_json(&text)
}

/// Load JSON from an open stream into an existing instance.
pub fn load_json_reader(config: &mut Config, reader: &mut impl Read) -> Result<(), CoqpitError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    config.from_json(&text)
}

impl Config {
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), CoqpitError> {
        save_json(self, path.as_ref())
    }

    pub fn load_json(&mut self, path: impl AsRef<Path>) -> Result<(), CoqpitError> {
        load_json(self, path.as_ref())
    }
}
