//! Gramlex Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all Gramlex crates.
//!
//! Every structure can be loaded from JSON; missing fields take their defaults.

use serde::{Deserialize, Serialize};

/// Error raised while loading a configuration document
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for the grammar scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Start the pass as if already inside a lexer rule.
    ///
    /// Useful when scanning a lexer-rule fragment in isolation.
    pub initial_mode_is_lexer: bool,
    /// Keep `// $ANTLR src "file" line` directives found in comments
    pub record_source_directives: bool,
}

/// Configuration for the grammar tree walker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkerConfig {
    /// Production used by `visit_grammar`
    pub start_production: String,
    /// Mode name in effect until the first `mode` section
    pub default_mode_name: String,
    /// Maximum nesting depth of the walk before giving up on a subtree
    pub max_depth: usize,
    /// Continue with the next sibling after a structural mismatch
    pub resume_on_mismatch: bool,
}

/// Top-level configuration document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GramlexConfig {
    pub scanner: ScannerConfig,
    pub walker: WalkerConfig,
}

impl GramlexConfig {
    /// Parse a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Processing phase, used to name log targets
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Scanner,
    Walker,
}

impl Phase {
    /// Get the string name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Scanner => "lexer",
            Phase::Walker => "walker",
        }
    }

    /// Get the log target name for this phase
    pub fn target(&self) -> String {
        format!("gramlex::{}", self.as_str())
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            initial_mode_is_lexer: false,
            record_source_directives: true,
        }
    }
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            start_production: "grammarSpec".to_string(),
            default_mode_name: "DEFAULT_MODE".to_string(),
            max_depth: 512,
            resume_on_mismatch: true,
        }
    }
}
