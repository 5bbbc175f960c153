// Copyright 2026 The Chisel Project
// SPDX-License-Identifier: Apache-2.0

// Config input seams
//
// The loader takes YAML text through a small trait so callers choose
// where it comes from: the binary points `FileSource` at chisel.yaml,
// tests hand YAML to `StringSource` and skip the filesystem entirely.

use std::path::PathBuf;

use super::error::ConfigError;

/// Supplies the raw YAML text for one config load.
pub trait ConfigSource {
    fn load(&self) -> Result<String, ConfigError>;
}

/// Reads the config file at a fixed path.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigSource for FileSource {
    fn load(&self) -> Result<String, ConfigError> {
        std::fs::read_to_string(&self.path).map_err(ConfigError::from)
    }
}

/// Wraps YAML already held in memory.
pub struct StringSource(pub String);

impl StringSource {
    pub fn new(content: impl Into<String>) -> Self {
        Self(content.into())
    }
}

impl ConfigSource for StringSource {
    fn load(&self) -> Result<String, ConfigError> {
        Ok(self.0.clone())
    }
}
