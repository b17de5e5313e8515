//! Errors raised while loading or validating archetype tables.

use std::fmt;

/// Why a `GameData` table failed to load.
#[derive(Debug)]
pub enum DataError {
    /// The JSON document could not be parsed.
    Parse(serde_json::Error),
    /// A tower entry had an out-of-range field.
    InvalidTower {
        archetype: String,
        field: &'static str,
    },
    /// An enemy entry had an out-of-range field.
    InvalidEnemy {
        archetype: String,
        field: &'static str,
    },
    /// A splitter archetype references itself or a missing child archetype.
    BadSplitTarget { archetype: String },
    /// A required archetype is missing from the table.
    MissingArchetype { archetype: String },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Parse(e) => write!(f, "archetype table parse error: {e}"),
            DataError::InvalidTower { archetype, field } => {
                write!(f, "tower '{archetype}': invalid {field}")
            }
            DataError::InvalidEnemy { archetype, field } => {
                write!(f, "enemy '{archetype}': invalid {field}")
            }
            DataError::BadSplitTarget { archetype } => {
                write!(f, "enemy '{archetype}': split target missing or self-referential")
            }
            DataError::MissingArchetype { archetype } => {
                write!(f, "archetype table missing entry for '{archetype}'")
            }
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(e: serde_json::Error) -> Self {
        DataError::Parse(e)
    }
}
