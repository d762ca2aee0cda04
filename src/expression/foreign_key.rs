use crate::definition::ForeignKeyDefinition;
use crate::error::{MigrationError, Result};
use crate::expression::{require, Expression, MigrationExpression};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateForeignKey {
    pub foreign_key: ForeignKeyDefinition,
}

impl CreateForeignKey {
    pub fn new(foreign_key: ForeignKeyDefinition) -> Self {
        Self { foreign_key }
    }
}

impl MigrationExpression for CreateForeignKey {
    fn kind(&self) -> &'static str {
        "CreateForeignKey"
    }

    fn describe(&self) -> String {
        format!(
            "Create foreign key {} from {} to {}",
            self.foreign_key.name, self.foreign_key.foreign_table, self.foreign_key.primary_table
        )
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        let fk = &self.foreign_key;
        require(errors, &fk.name, "The foreign key name cannot be empty");
        require(errors, &fk.foreign_table, "The foreign table name cannot be empty");
        require(errors, &fk.primary_table, "The primary table name cannot be empty");
        if fk.foreign_columns.is_empty() {
            errors.push("The foreign key must have at least one foreign column".to_string());
        }
        if fk.primary_columns.is_empty() {
            errors.push("The foreign key must have at least one primary column".to_string());
        }
        if !fk.foreign_columns.is_empty()
            && !fk.primary_columns.is_empty()
            && fk.foreign_columns.len() != fk.primary_columns.len()
        {
            errors.push(
                "The foreign key must have as many foreign columns as primary columns".to_string(),
            );
        }
    }

    /// The inverse carries the definition with both sides exchanged; the
    /// drop itself still targets the table that owns the constraint.
    fn reverse(&self) -> Result<Expression> {
        Ok(DeleteForeignKey {
            schema_name: self.foreign_key.foreign_table_schema.clone(),
            table_name: self.foreign_key.foreign_table.clone(),
            foreign_key: self.foreign_key.swapped(),
        }
        .into())
    }
}

/// Drops a foreign key from `table_name`. When `foreign_key` is fully
/// specified the drop can be reversed.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteForeignKey {
    pub schema_name: Option<String>,
    pub table_name: String,
    pub foreign_key: ForeignKeyDefinition,
}

impl DeleteForeignKey {
    /// A name-only reference, which cannot be reversed.
    pub fn new(name: impl Into<String>, table_name: impl Into<String>) -> Self {
        let table_name = table_name.into();
        Self {
            schema_name: None,
            foreign_key: ForeignKeyDefinition::new(name).from_table(table_name.clone()),
            table_name,
        }
    }

    pub fn from_definition(foreign_key: ForeignKeyDefinition) -> Self {
        Self {
            schema_name: foreign_key.foreign_table_schema.clone(),
            table_name: foreign_key.foreign_table.clone(),
            foreign_key,
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }
}

impl MigrationExpression for DeleteForeignKey {
    fn kind(&self) -> &'static str {
        "DeleteForeignKey"
    }

    fn describe(&self) -> String {
        format!(
            "Delete foreign key {} on {}",
            self.foreign_key.name, self.table_name
        )
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.foreign_key.name, "The foreign key name cannot be empty");
        require(errors, &self.table_name, "The table name cannot be empty");
    }

    fn reverse(&self) -> Result<Expression> {
        if !self.foreign_key.is_fully_specified() {
            return Err(MigrationError::Irreversible(self.kind()));
        }
        Ok(CreateForeignKey::new(self.foreign_key.swapped()).into())
    }
}
