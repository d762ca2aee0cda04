use crate::error::Result;
use crate::expression::{require, Expression, MigrationExpression};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateSchema {
    pub schema_name: String,
}

impl CreateSchema {
    pub fn new(schema_name: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
        }
    }
}

impl MigrationExpression for CreateSchema {
    fn kind(&self) -> &'static str {
        "CreateSchema"
    }

    fn describe(&self) -> String {
        format!("Create schema {}", self.schema_name)
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.schema_name, "The schema name cannot be empty");
    }

    fn reverse(&self) -> Result<Expression> {
        Ok(DeleteSchema::new(&self.schema_name).into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteSchema {
    pub schema_name: String,
}

impl DeleteSchema {
    pub fn new(schema_name: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
        }
    }
}

impl MigrationExpression for DeleteSchema {
    fn kind(&self) -> &'static str {
        "DeleteSchema"
    }

    fn describe(&self) -> String {
        format!("Delete schema {}", self.schema_name)
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.schema_name, "The schema name cannot be empty");
    }
}

/// Moves a table from one schema to another. `None` on either side is the
/// dialect's default schema.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterSchema {
    pub source_schema: Option<String>,
    pub table_name: String,
    pub destination_schema: Option<String>,
}

impl AlterSchema {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            source_schema: None,
            table_name: table_name.into(),
            destination_schema: None,
        }
    }

    pub fn from_schema(mut self, schema: impl Into<String>) -> Self {
        self.source_schema = Some(schema.into());
        self
    }

    pub fn to_schema(mut self, schema: impl Into<String>) -> Self {
        self.destination_schema = Some(schema.into());
        self
    }
}

impl MigrationExpression for AlterSchema {
    fn kind(&self) -> &'static str {
        "AlterSchema"
    }

    fn describe(&self) -> String {
        format!(
            "Move table {} from schema {} to {}",
            self.table_name,
            self.source_schema.as_deref().unwrap_or("(default)"),
            self.destination_schema.as_deref().unwrap_or("(default)")
        )
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.table_name, "The table name cannot be empty");
    }

    fn reverse(&self) -> Result<Expression> {
        Ok(AlterSchema {
            source_schema: self.destination_schema.clone(),
            table_name: self.table_name.clone(),
            destination_schema: self.source_schema.clone(),
        }
        .into())
    }
}
