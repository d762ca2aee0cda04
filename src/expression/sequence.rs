use crate::definition::SequenceDefinition;
use crate::error::Result;
use crate::expression::{require, Expression, MigrationExpression};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateSequence {
    pub sequence: SequenceDefinition,
}

impl CreateSequence {
    pub fn new(sequence: SequenceDefinition) -> Self {
        Self { sequence }
    }
}

impl MigrationExpression for CreateSequence {
    fn kind(&self) -> &'static str {
        "CreateSequence"
    }

    fn describe(&self) -> String {
        format!("Create sequence {}", self.sequence.name)
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.sequence.name, "The sequence name cannot be empty");
    }

    fn reverse(&self) -> Result<Expression> {
        Ok(DeleteSequence {
            schema_name: self.sequence.schema_name.clone(),
            sequence_name: self.sequence.name.clone(),
        }
        .into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteSequence {
    pub schema_name: Option<String>,
    pub sequence_name: String,
}

impl DeleteSequence {
    pub fn new(sequence_name: impl Into<String>) -> Self {
        Self {
            schema_name: None,
            sequence_name: sequence_name.into(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }
}

impl MigrationExpression for DeleteSequence {
    fn kind(&self) -> &'static str {
        "DeleteSequence"
    }

    fn describe(&self) -> String {
        format!("Delete sequence {}", self.sequence_name)
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.sequence_name, "The sequence name cannot be empty");
    }
}
