use crate::expression::{require, MigrationExpression};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct AlterDefaultValue {
    pub schema_name: Option<String>,
    pub table_name: String,
    pub column_name: String,
    pub default: Option<Value>,
}

impl AlterDefaultValue {
    pub fn new(
        table_name: impl Into<String>,
        column_name: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        Self {
            schema_name: None,
            table_name: table_name.into(),
            column_name: column_name.into(),
            default: Some(default.into()),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }
}

impl MigrationExpression for AlterDefaultValue {
    fn kind(&self) -> &'static str {
        "AlterDefaultValue"
    }

    fn describe(&self) -> String {
        format!(
            "Alter default value of {}.{}",
            self.table_name, self.column_name
        )
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.table_name, "The table name cannot be empty");
        require(errors, &self.column_name, "The column name cannot be empty");
        if self.default.is_none() {
            errors.push("The default value must be set".to_string());
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteDefaultConstraint {
    pub schema_name: Option<String>,
    pub table_name: String,
    pub column_name: String,
}

impl DeleteDefaultConstraint {
    pub fn new(table_name: impl Into<String>, column_name: impl Into<String>) -> Self {
        Self {
            schema_name: None,
            table_name: table_name.into(),
            column_name: column_name.into(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }
}

impl MigrationExpression for DeleteDefaultConstraint {
    fn kind(&self) -> &'static str {
        "DeleteDefaultConstraint"
    }

    fn describe(&self) -> String {
        format!(
            "Delete default constraint of {}.{}",
            self.table_name, self.column_name
        )
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.table_name, "The table name cannot be empty");
        require(errors, &self.column_name, "The column name cannot be empty");
    }
}
