// Import identifiers: `"{primary}"` or `"{primary}:{secondary}"`.

use crate::error::CoreError;

/// A parsed import identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportId {
    /// Only the primary id; the secondary is looked up (latest/active).
    Implicit { primary: String },
    /// Both ids given.
    Explicit { primary: String, secondary: String },
}

impl ImportId {
    /// Parse `raw`, reporting `expected` (e.g. `"site_id:revision_id OR site_id"`)
    /// when it is malformed.
    pub fn parse(raw: &str, expected: &'static str) -> Result<Self, CoreError> {
        let parts: Vec<&str> = raw.split(':').collect();
        match parts.as_slice() {
            [primary] if !primary.is_empty() => Ok(Self::Implicit {
                primary: (*primary).to_owned(),
            }),
            [primary, secondary] if !primary.is_empty() && !secondary.is_empty() => {
                Ok(Self::Explicit {
                    primary: (*primary).to_owned(),
                    secondary: (*secondary).to_owned(),
                })
            }
            _ => Err(CoreError::InvalidImportId {
                id: raw.to_owned(),
                expected,
            }),
        }
    }

    pub fn primary(&self) -> &str {
        match self {
            Self::Implicit { primary } | Self::Explicit { primary, .. } => primary,
        }
    }

    pub fn secondary(&self) -> Option<&str> {
        match self {
            Self::Implicit { .. } => None,
            Self::Explicit { secondary, .. } => Some(secondary),
        }
    }
}

/// State id of a two-part resource, `"{primary}:{secondary}"`.
pub fn compose(primary: &str, secondary: &str) -> String {
    format!("{primary}:{secondary}")
}
