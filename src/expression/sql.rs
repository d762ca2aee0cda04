use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{MigrationError, Result};
use crate::expression::{require, MigrationExpression};
use crate::generator::DialectKind;
use crate::processor::Processor;
use crate::script::{self, ResourceProvider};

/// Raw SQL handed to the processor as is.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteSql {
    pub sql: String,
    /// Dialects this statement is meant for; empty means all of them.
    pub only_on: Vec<DialectKind>,
}

impl ExecuteSql {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            only_on: Vec::new(),
        }
    }

    /// Restricts the statement to the given dialects. Other dialects
    /// generate nothing for it.
    pub fn only_on(mut self, dialects: &[DialectKind]) -> Self {
        self.only_on = dialects.to_vec();
        self
    }

    pub fn applies_to(&self, dialect: DialectKind) -> bool {
        self.only_on.is_empty() || self.only_on.contains(&dialect)
    }
}

impl MigrationExpression for ExecuteSql {
    fn kind(&self) -> &'static str {
        "ExecuteSql"
    }

    fn describe(&self) -> String {
        "Execute SQL statement".to_string()
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.sql, "The SQL statement cannot be empty");
    }
}

/// A script file read at generation time, with `${name}` tokens replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteSqlScript {
    pub path: PathBuf,
    pub parameters: BTreeMap<String, String>,
}

impl ExecuteSqlScript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn sql_text(&self) -> Result<String> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| MigrationError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(script::replace_tokens(&text, &self.parameters))
    }
}

impl MigrationExpression for ExecuteSqlScript {
    fn kind(&self) -> &'static str {
        "ExecuteSqlScript"
    }

    fn describe(&self) -> String {
        format!("Execute SQL script {}", self.path.display())
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        if self.path.as_os_str().is_empty() {
            errors.push("The script path cannot be empty".to_string());
        }
    }
}

/// A script looked up by name across one or more resource providers.
#[derive(Debug, Clone)]
pub struct ExecuteEmbeddedSqlScript {
    pub resource_name: String,
    pub providers: Vec<Arc<dyn ResourceProvider>>,
    pub parameters: BTreeMap<String, String>,
}

impl ExecuteEmbeddedSqlScript {
    pub fn new(resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            providers: Vec::new(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn ResourceProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn sql_text(&self) -> Result<String> {
        let text = script::load(&self.providers, &self.resource_name)?;
        Ok(script::replace_tokens(&text, &self.parameters))
    }
}

impl PartialEq for ExecuteEmbeddedSqlScript {
    fn eq(&self, other: &Self) -> bool {
        self.resource_name == other.resource_name
            && self.parameters == other.parameters
            && self.providers.len() == other.providers.len()
            && self
                .providers
                .iter()
                .zip(&other.providers)
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

impl MigrationExpression for ExecuteEmbeddedSqlScript {
    fn kind(&self) -> &'static str {
        "ExecuteEmbeddedSqlScript"
    }

    fn describe(&self) -> String {
        format!("Execute embedded SQL script {}", self.resource_name)
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(
            errors,
            &self.resource_name,
            "The script resource name cannot be empty",
        );
        if self.providers.is_empty() {
            errors.push("At least one script resource provider must be given".to_string());
        }
    }
}

pub type DbOperation = dyn Fn(&mut dyn Processor) -> Result<()> + Send + Sync;

/// Arbitrary work run against the processor itself. There is no SQL to
/// generate for it.
#[derive(Clone)]
pub struct PerformDbOperation {
    pub description: String,
    pub operation: Arc<DbOperation>,
}

impl PerformDbOperation {
    pub fn new<F>(description: impl Into<String>, operation: F) -> Self
    where
        F: Fn(&mut dyn Processor) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            operation: Arc::new(operation),
        }
    }

    pub fn run(&self, processor: &mut dyn Processor) -> Result<()> {
        (self.operation)(processor)
    }
}

impl fmt::Debug for PerformDbOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerformDbOperation")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl PartialEq for PerformDbOperation {
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description && Arc::ptr_eq(&self.operation, &other.operation)
    }
}

impl MigrationExpression for PerformDbOperation {
    fn kind(&self) -> &'static str {
        "PerformDbOperation"
    }

    fn describe(&self) -> String {
        format!("Perform database operation: {}", self.description)
    }

    fn collect_validation_errors(&self, _errors: &mut Vec<String>) {}
}
