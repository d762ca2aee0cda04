use crate::definition::IndexDefinition;
use crate::error::{MigrationError, Result};
use crate::expression::{require, Expression, MigrationExpression};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndex {
    pub index: IndexDefinition,
}

impl CreateIndex {
    pub fn new(index: IndexDefinition) -> Self {
        Self { index }
    }
}

impl MigrationExpression for CreateIndex {
    fn kind(&self) -> &'static str {
        "CreateIndex"
    }

    fn describe(&self) -> String {
        format!(
            "Create index {} on {} ({})",
            self.index.name,
            self.index.table_name,
            self.index.column_names().join(", ")
        )
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        validate_index(&self.index, errors);
        if self.index.columns.is_empty() {
            errors.push(format!(
                "The index '{}' must have at least one column",
                self.index.name
            ));
        }
    }

    fn reverse(&self) -> Result<Expression> {
        Ok(DeleteIndex::new(self.index.clone()).into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteIndex {
    pub index: IndexDefinition,
}

impl DeleteIndex {
    pub fn new(index: IndexDefinition) -> Self {
        Self { index }
    }
}

impl MigrationExpression for DeleteIndex {
    fn kind(&self) -> &'static str {
        "DeleteIndex"
    }

    fn describe(&self) -> String {
        format!("Delete index {} on {}", self.index.name, self.index.table_name)
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        validate_index(&self.index, errors);
    }

    fn reverse(&self) -> Result<Expression> {
        if self.index.columns.is_empty() {
            return Err(MigrationError::Irreversible(self.kind()));
        }
        Ok(CreateIndex::new(self.index.clone()).into())
    }
}

fn validate_index(index: &IndexDefinition, errors: &mut Vec<String>) {
    require(errors, &index.name, "The index name cannot be empty");
    require(errors, &index.table_name, "The table name cannot be empty");
}
