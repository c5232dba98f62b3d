//! Copy rules for files and directories staged into the output directory.
//!
//! A rule is written either as a bare relative path (`"README.md"`), which
//! keeps the same relative name under the output directory, or as a rename
//! pair (`"configs => conf"`).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Separator between source and destination in a rename rule.
pub const RENAME_DELIMITER: &str = " => ";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CopyRuleError {
    #[error("copy rule is empty")]
    Empty,

    #[error("copy rule '{0}' has an empty source or destination")]
    EmptySide(String),

    #[error("copy rule '{0}' contains more than one ' => ' separator")]
    Ambiguous(String),
}

/// One entry of `copy-file` or `copy-dir`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "String")]
pub struct CopyRule {
    source: String,
    destination: String,
}

impl CopyRule {
    /// Parse a raw rule. Pure; never touches the filesystem.
    pub fn parse(raw: &str) -> Result<Self, CopyRuleError> {
        if raw.trim().is_empty() {
            return Err(CopyRuleError::Empty);
        }

        let mut parts = raw.split(RENAME_DELIMITER);
        // split always yields at least one item
        let source = parts.next().unwrap_or_default();
        let destination = parts.next();
        if parts.next().is_some() {
            return Err(CopyRuleError::Ambiguous(raw.to_string()));
        }

        match destination {
            None => Ok(Self {
                source: source.to_string(),
                destination: source.to_string(),
            }),
            Some(dst) if source.is_empty() || dst.is_empty() => {
                Err(CopyRuleError::EmptySide(raw.to_string()))
            }
            Some(dst) => Ok(Self {
                source: source.to_string(),
                destination: dst.to_string(),
            }),
        }
    }

    /// Path relative to the source root.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Path relative to the versioned output directory.
    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn is_rename(&self) -> bool {
        self.source != self.destination
    }
}

impl FromStr for CopyRule {
    type Err = CopyRuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CopyRule {
    type Error = CopyRuleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl fmt::Display for CopyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_rename() {
            write!(f, "{}{}{}", self.source, RENAME_DELIMITER, self.destination)
        } else {
            f.write_str(&self.source)
        }
    }
}
