use crate::error::ConfigError;
use crate::history::DEFAULT_HISTORY_LIMIT;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Editor configuration
///
/// ```toml
/// history_limit = 50
/// lint_multiple_roots = true
/// check_acyclic_on_every_commit = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo entries kept before the oldest is discarded
    pub history_limit: usize,
    /// Warn when an edit leaves more than one zero-parent node
    pub lint_multiple_roots: bool,
    /// Run the cycle check after every edit, not only joins
    pub check_acyclic_on_every_commit: bool,
}

impl EditorConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_root_lint(mut self, enabled: bool) -> Self {
        self.lint_multiple_roots = enabled;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_strict_acyclic(mut self, enabled: bool) -> Self {
        self.check_acyclic_on_every_commit = enabled;
        self
    }

    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.history_limit == 0 {
            return Err(ConfigError::ZeroHistoryLimit);
        }
        Ok(())
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            lint_multiple_roots: true,
            check_acyclic_on_every_commit: false,
        }
    }
}
