//! Document parsing
//!
//! Turns raw file bytes into a YAML value. Top-level shape is not checked
//! here; the resolver decides what to do with non-mapping documents.

use serde_yaml::Value;

/// Parses raw document bytes
pub trait DocumentParser: Send + Sync {
    /// Parse bytes into a value. Empty input yields `Value::Null`; `<<` merge
    /// keys are expanded.
    fn parse(&self, bytes: &[u8]) -> Result<Value, ParseError>;
}

/// Errors from document parsing
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// YAML parser backed by `serde_yaml`
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl DocumentParser for YamlParser {
    fn parse(&self, bytes: &[u8]) -> Result<Value, ParseError> {
        let contents = std::str::from_utf8(bytes)?;
        if contents.trim().is_empty() {
            return Ok(Value::Null);
        }
        let mut value: Value = serde_yaml::from_str(contents)?;
        value.apply_merge()?;
        Ok(value)
    }
}
