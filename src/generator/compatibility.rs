use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{MigrationError, Result};

/// What a generator does when asked for something its dialect cannot
/// express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityMode {
    /// Skip the operation and log a warning.
    #[default]
    Loose,
    /// Fail with [`MigrationError::Unsupported`].
    Strict,
}

impl CompatibilityMode {
    /// Gate for a whole statement. Loose mode yields an empty statement.
    pub fn handle(self, dialect: &'static str, operation: &str) -> Result<String> {
        match self {
            CompatibilityMode::Loose => {
                warn!(dialect, operation, "unsupported operation skipped");
                Ok(String::new())
            }
            CompatibilityMode::Strict => Err(MigrationError::unsupported(dialect, operation)),
        }
    }

    /// Gate for an optional clause. Loose mode lets the caller emit the
    /// statement without it.
    pub fn degrade(self, dialect: &'static str, clause: &str) -> Result<()> {
        match self {
            CompatibilityMode::Loose => {
                warn!(dialect, clause, "unsupported clause omitted");
                Ok(())
            }
            CompatibilityMode::Strict => Err(MigrationError::unsupported(dialect, clause)),
        }
    }
}
