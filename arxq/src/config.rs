//! Compiler configuration.
//!
//! Hosts load this from a TOML file; every field has a default so a
//! missing or partial file works.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CompilerConfig {
    /// Return tokens and AST alongside the compiled query
    #[serde(default)]
    pub debug: bool,

    /// Maximum input size in bytes; longer inputs are rejected before
    /// tokenization
    #[serde(default = "default_max_query_len")]
    pub max_query_len: usize,

    /// Hours ahead of UTC that users write date filters in
    #[serde(default = "default_timezone_offset")]
    pub timezone_offset_hours: i32,
}

fn default_max_query_len() -> usize {
    4096
}

fn default_timezone_offset() -> i32 {
    9
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            debug: false,
            max_query_len: default_max_query_len(),
            timezone_offset_hours: default_timezone_offset(),
        }
    }
}

impl CompilerConfig {
    /// Load config from a file path, or create it with defaults.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = CompilerConfig::default();
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = config.save(path);
            Ok(config)
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}
