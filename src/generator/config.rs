use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dialect;
use crate::error::{MigrationError, Result};
use crate::generator::compatibility::CompatibilityMode;
use crate::generator::Generator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DialectKind {
    #[serde(rename = "sqlserver2000")]
    SqlServer2000,
    #[serde(rename = "sqlserver2005")]
    SqlServer2005,
    #[serde(rename = "sqlserver2008")]
    SqlServer2008,
    #[serde(rename = "sqlserver2012")]
    SqlServer2012,
    #[serde(rename = "sqlserver2014")]
    SqlServer2014,
    #[serde(rename = "sqlserver2016")]
    SqlServer2016,
    #[serde(rename = "postgres")]
    Postgres,
    #[serde(rename = "sqlite")]
    Sqlite,
    #[serde(rename = "firebird")]
    Firebird,
    #[serde(rename = "mysql")]
    MySql,
    #[serde(rename = "oracle")]
    Oracle,
    #[serde(rename = "db2")]
    Db2,
}

impl DialectKind {
    pub const ALL: [DialectKind; 12] = [
        DialectKind::SqlServer2000,
        DialectKind::SqlServer2005,
        DialectKind::SqlServer2008,
        DialectKind::SqlServer2012,
        DialectKind::SqlServer2014,
        DialectKind::SqlServer2016,
        DialectKind::Postgres,
        DialectKind::Sqlite,
        DialectKind::Firebird,
        DialectKind::MySql,
        DialectKind::Oracle,
        DialectKind::Db2,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DialectKind::SqlServer2000 => "sqlserver2000",
            DialectKind::SqlServer2005 => "sqlserver2005",
            DialectKind::SqlServer2008 => "sqlserver2008",
            DialectKind::SqlServer2012 => "sqlserver2012",
            DialectKind::SqlServer2014 => "sqlserver2014",
            DialectKind::SqlServer2016 => "sqlserver2016",
            DialectKind::Postgres => "postgres",
            DialectKind::Sqlite => "sqlite",
            DialectKind::Firebird => "firebird",
            DialectKind::MySql => "mysql",
            DialectKind::Oracle => "oracle",
            DialectKind::Db2 => "db2",
        }
    }

    pub fn is_sql_server(&self) -> bool {
        matches!(
            self,
            DialectKind::SqlServer2000
                | DialectKind::SqlServer2005
                | DialectKind::SqlServer2008
                | DialectKind::SqlServer2012
                | DialectKind::SqlServer2014
                | DialectKind::SqlServer2016
        )
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DialectKind {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        let alias = match lower.as_str() {
            "sqlserver" | "mssql" => Some(DialectKind::SqlServer2016),
            "postgresql" | "pg" => Some(DialectKind::Postgres),
            "sqlite3" => Some(DialectKind::Sqlite),
            _ => None,
        };
        alias
            .or_else(|| DialectKind::ALL.into_iter().find(|k| k.name() == lower))
            .ok_or_else(|| MigrationError::Config(format!("Unknown dialect '{}'", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FirebirdOptions {
    /// Firebird's identifier limit before 4.0.
    pub max_name_length: usize,
    pub truncate_names: bool,
    pub pack_key_names: bool,
    /// Quote every identifier instead of only those that need it.
    pub force_quote: bool,
}

impl Default for FirebirdOptions {
    fn default() -> Self {
        Self {
            max_name_length: 31,
            truncate_names: true,
            pack_key_names: true,
            force_quote: false,
        }
    }
}

/// Generator settings fixed for the lifetime of a generator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    pub compatibility: CompatibilityMode,
    pub firebird: FirebirdOptions,
}

impl GeneratorOptions {
    pub fn strict() -> Self {
        Self {
            compatibility: CompatibilityMode::Strict,
            ..Self::default()
        }
    }
}

/// A dialect plus its options, as read from a TOML file:
///
/// ```toml
/// dialect = "sqlserver2008"
/// compatibility = "strict"
///
/// [firebird]
/// force_quote = true
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub dialect: DialectKind,
    #[serde(flatten)]
    pub options: GeneratorOptions,
}

impl GeneratorConfig {
    pub fn new(dialect: DialectKind) -> Self {
        Self {
            dialect,
            options: GeneratorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GeneratorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| MigrationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn build(&self) -> Box<dyn Generator> {
        dialect::generator_for(self.dialect, self.options.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_names_round_trip() {
        for kind in DialectKind::ALL {
            assert_eq!(kind.name().parse::<DialectKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
    }

    #[test]
    fn dialect_aliases() {
        assert_eq!("PostgreSQL".parse::<DialectKind>().unwrap(), DialectKind::Postgres);
        assert_eq!("mssql".parse::<DialectKind>().unwrap(), DialectKind::SqlServer2016);
        assert!("access".parse::<DialectKind>().is_err());
    }

    #[test]
    fn config_from_toml() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            dialect = "firebird"
            compatibility = "strict"

            [firebird]
            max_name_length = 63
            force_quote = true
            "#,
        )
        .unwrap();

        assert_eq!(config.dialect, DialectKind::Firebird);
        assert_eq!(config.options.compatibility, CompatibilityMode::Strict);
        assert_eq!(config.options.firebird.max_name_length, 63);
        assert!(config.options.firebird.force_quote);
        assert!(config.options.firebird.pack_key_names);
    }

    #[test]
    fn config_defaults_to_loose() {
        let config = GeneratorConfig::from_toml_str("dialect = \"postgres\"").unwrap();
        assert_eq!(config.options, GeneratorOptions::default());
    }

    #[test]
    fn unknown_dialect_is_a_toml_error() {
        let err = GeneratorConfig::from_toml_str("dialect = \"access\"").unwrap_err();
        assert!(matches!(err, MigrationError::Toml(_)));
    }

    #[test]
    fn config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sluice.toml");
        std::fs::write(&path, "dialect = \"sqlserver2012\"\n").unwrap();

        let config = GeneratorConfig::from_file(&path).unwrap();
        assert_eq!(config.dialect, DialectKind::SqlServer2012);
        assert_eq!(config.build().dialect(), DialectKind::SqlServer2012);
    }
}
