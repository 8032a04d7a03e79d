use crate::forest::{ForestBuilder, OrphanPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("delimiter {0:?} cannot be used: it collides with path or line syntax")]
    InvalidDelimiter(char),
    #[error("line separator must not be empty")]
    EmptyLineSeparator,
    #[error("line separator {separator:?} contains the delimiter {delimiter:?}")]
    SeparatorContainsDelimiter { separator: String, delimiter: char },
}

/// Settings for turning delimited schedule text into a forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub delimiter: char,
    pub line_separator: String,
    pub orphan_policy: OrphanPolicy,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            line_separator: "\r\n".to_string(),
            orphan_policy: OrphanPolicy::Promote,
        }
    }
}

impl ImportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if matches!(self.delimiter, '.' | '\r' | '\n') {
            return Err(ConfigError::InvalidDelimiter(self.delimiter));
        }
        if self.line_separator.is_empty() {
            return Err(ConfigError::EmptyLineSeparator);
        }
        if self.line_separator.contains(self.delimiter) {
            return Err(ConfigError::SeparatorContainsDelimiter {
                separator: self.line_separator.clone(),
                delimiter: self.delimiter,
            });
        }
        Ok(())
    }

    pub fn builder(&self) -> ForestBuilder {
        ForestBuilder::from_config(self)
    }
}
