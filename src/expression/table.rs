use crate::definition::ColumnDefinition;
use crate::error::{MigrationError, Result};
use crate::expression::{require, Expression, MigrationExpression};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub schema_name: Option<String>,
    pub table_name: String,
    pub columns: Vec<ColumnDefinition>,
    pub description: Option<String>,
}

impl CreateTable {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            schema_name: None,
            table_name: table_name.into(),
            columns: Vec::new(),
            description: None,
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Columns stamped with this table's name, as the formatters expect.
    pub fn owned_columns(&self) -> Vec<ColumnDefinition> {
        self.columns
            .iter()
            .cloned()
            .map(|mut column| {
                if column.table_name.is_none() {
                    column.table_name = Some(self.table_name.clone());
                }
                column
            })
            .collect()
    }
}

impl MigrationExpression for CreateTable {
    fn kind(&self) -> &'static str {
        "CreateTable"
    }

    fn describe(&self) -> String {
        format!("Create table {}", self.table_name)
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.table_name, "The table name cannot be empty");
        if self.columns.is_empty() {
            errors.push(format!(
                "The table '{}' must have at least one column",
                self.table_name
            ));
        }
        for column in &self.columns {
            column.collect_validation_errors(errors);
        }
    }

    fn reverse(&self) -> Result<Expression> {
        Ok(DeleteTable {
            schema_name: self.schema_name.clone(),
            table_name: self.table_name.clone(),
            columns: self.columns.clone(),
            if_exists: false,
        }
        .into())
    }
}

/// Drops a table. Carrying the column list makes the drop reversible.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteTable {
    pub schema_name: Option<String>,
    pub table_name: String,
    pub columns: Vec<ColumnDefinition>,
    pub if_exists: bool,
}

impl DeleteTable {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            schema_name: None,
            table_name: table_name.into(),
            columns: Vec::new(),
            if_exists: false,
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    pub fn with_columns(mut self, columns: Vec<ColumnDefinition>) -> Self {
        self.columns = columns;
        self
    }

    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }
}

impl MigrationExpression for DeleteTable {
    fn kind(&self) -> &'static str {
        "DeleteTable"
    }

    fn describe(&self) -> String {
        format!("Delete table {}", self.table_name)
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.table_name, "The table name cannot be empty");
    }

    fn reverse(&self) -> Result<Expression> {
        if self.columns.is_empty() {
            return Err(MigrationError::Irreversible(self.kind()));
        }
        Ok(CreateTable {
            schema_name: self.schema_name.clone(),
            table_name: self.table_name.clone(),
            columns: self.columns.clone(),
            description: None,
        }
        .into())
    }
}

/// Changes table-level metadata; currently only the description.
#[derive(Debug, Clone, PartialEq)]
pub struct AlterTable {
    pub schema_name: Option<String>,
    pub table_name: String,
    pub description: Option<String>,
}

impl AlterTable {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            schema_name: None,
            table_name: table_name.into(),
            description: None,
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl MigrationExpression for AlterTable {
    fn kind(&self) -> &'static str {
        "AlterTable"
    }

    fn describe(&self) -> String {
        format!("Alter table {}", self.table_name)
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.table_name, "The table name cannot be empty");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenameTable {
    pub schema_name: Option<String>,
    pub old_name: String,
    pub new_name: String,
}

impl RenameTable {
    pub fn new(old_name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self {
            schema_name: None,
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }
}

impl MigrationExpression for RenameTable {
    fn kind(&self) -> &'static str {
        "RenameTable"
    }

    fn describe(&self) -> String {
        format!("Rename table {} to {}", self.old_name, self.new_name)
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.old_name, "The old table name cannot be empty");
        require(errors, &self.new_name, "The new table name cannot be empty");
    }

    fn reverse(&self) -> Result<Expression> {
        Ok(RenameTable {
            schema_name: self.schema_name.clone(),
            old_name: self.new_name.clone(),
            new_name: self.old_name.clone(),
        }
        .into())
    }
}
