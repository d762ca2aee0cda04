use std::collections::BTreeSet;

use crate::definition::{ColumnDefinition, ColumnModification};
use crate::error::Result;
use crate::expression::{require, Expression, MigrationExpression};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateColumn {
    pub schema_name: Option<String>,
    pub table_name: String,
    pub column: ColumnDefinition,
}

impl CreateColumn {
    pub fn new(table_name: impl Into<String>, column: ColumnDefinition) -> Self {
        Self {
            schema_name: None,
            table_name: table_name.into(),
            column,
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    pub fn owned_column(&self) -> ColumnDefinition {
        stamp(&self.column, &self.table_name)
    }
}

impl MigrationExpression for CreateColumn {
    fn kind(&self) -> &'static str {
        "CreateColumn"
    }

    fn describe(&self) -> String {
        format!("Create column {}.{}", self.table_name, self.column.name)
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.table_name, "The table name cannot be empty");
        self.column.collect_validation_errors(errors);
    }

    fn reverse(&self) -> Result<Expression> {
        Ok(DeleteColumn {
            schema_name: self.schema_name.clone(),
            table_name: self.table_name.clone(),
            column_names: vec![self.column.name.clone()],
        }
        .into())
    }
}

/// Changes an existing column in place. Unset nullability is left alone.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterColumn {
    pub schema_name: Option<String>,
    pub table_name: String,
    pub column: ColumnDefinition,
}

impl AlterColumn {
    pub fn new(table_name: impl Into<String>, column: ColumnDefinition) -> Self {
        Self {
            schema_name: None,
            table_name: table_name.into(),
            column: column.for_alter(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    pub fn owned_column(&self) -> ColumnDefinition {
        let mut column = stamp(&self.column, &self.table_name);
        column.modification = ColumnModification::Alter;
        column
    }
}

impl MigrationExpression for AlterColumn {
    fn kind(&self) -> &'static str {
        "AlterColumn"
    }

    fn describe(&self) -> String {
        format!("Alter column {}.{}", self.table_name, self.column.name)
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.table_name, "The table name cannot be empty");
        self.column.collect_validation_errors(errors);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteColumn {
    pub schema_name: Option<String>,
    pub table_name: String,
    pub column_names: Vec<String>,
}

impl DeleteColumn {
    pub fn new(table_name: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            schema_name: None,
            table_name: table_name.into(),
            column_names: vec![column.into()],
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column_names.push(column.into());
        self
    }
}

impl MigrationExpression for DeleteColumn {
    fn kind(&self) -> &'static str {
        "DeleteColumn"
    }

    fn describe(&self) -> String {
        format!(
            "Delete column {} from {}",
            self.column_names.join(", "),
            self.table_name
        )
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.table_name, "The table name cannot be empty");
        if self.column_names.is_empty() {
            errors.push("At least one column name must be given".to_string());
        }
        let mut seen = BTreeSet::new();
        for name in &self.column_names {
            if name.trim().is_empty() {
                errors.push("The column name cannot be empty".to_string());
            } else if !seen.insert(name.as_str()) {
                errors.push(format!("The column '{}' is listed more than once", name));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenameColumn {
    pub schema_name: Option<String>,
    pub table_name: String,
    pub old_name: String,
    pub new_name: String,
}

impl RenameColumn {
    pub fn new(
        table_name: impl Into<String>,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self {
            schema_name: None,
            table_name: table_name.into(),
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }
}

impl MigrationExpression for RenameColumn {
    fn kind(&self) -> &'static str {
        "RenameColumn"
    }

    fn describe(&self) -> String {
        format!(
            "Rename column {}.{} to {}",
            self.table_name, self.old_name, self.new_name
        )
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.table_name, "The table name cannot be empty");
        require(errors, &self.old_name, "The old column name cannot be empty");
        require(errors, &self.new_name, "The new column name cannot be empty");
    }

    fn reverse(&self) -> Result<Expression> {
        Ok(RenameColumn {
            schema_name: self.schema_name.clone(),
            table_name: self.table_name.clone(),
            old_name: self.new_name.clone(),
            new_name: self.old_name.clone(),
        }
        .into())
    }
}

fn stamp(column: &ColumnDefinition, table: &str) -> ColumnDefinition {
    let mut column = column.clone();
    if column.table_name.is_none() {
        column.table_name = Some(table.to_string());
    }
    column
}
