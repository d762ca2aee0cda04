use crate::definition::ConstraintDefinition;
use crate::error::{MigrationError, Result};
use crate::expression::{require, Expression, MigrationExpression};

#[derive(Debug, Clone, PartialEq)]
pub struct CreateConstraint {
    pub constraint: ConstraintDefinition,
}

impl CreateConstraint {
    pub fn new(constraint: ConstraintDefinition) -> Self {
        Self { constraint }
    }
}

impl MigrationExpression for CreateConstraint {
    fn kind(&self) -> &'static str {
        "CreateConstraint"
    }

    fn describe(&self) -> String {
        format!(
            "Create {} constraint {} on {}",
            self.constraint.kind.as_sql(),
            self.constraint.name,
            self.constraint.table_name
        )
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.constraint.table_name, "The table name cannot be empty");
        if self.constraint.columns.is_empty() {
            errors.push("The constraint must have at least one column".to_string());
        }
    }

    fn reverse(&self) -> Result<Expression> {
        Ok(DeleteConstraint::new(self.constraint.clone()).into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteConstraint {
    pub constraint: ConstraintDefinition,
}

impl DeleteConstraint {
    pub fn new(constraint: ConstraintDefinition) -> Self {
        Self { constraint }
    }
}

impl MigrationExpression for DeleteConstraint {
    fn kind(&self) -> &'static str {
        "DeleteConstraint"
    }

    fn describe(&self) -> String {
        format!(
            "Delete constraint {} on {}",
            self.constraint.name, self.constraint.table_name
        )
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.constraint.table_name, "The table name cannot be empty");
        require(errors, &self.constraint.name, "The constraint name cannot be empty");
    }

    fn reverse(&self) -> Result<Expression> {
        if self.constraint.columns.is_empty() {
            return Err(MigrationError::Irreversible(self.kind()));
        }
        Ok(CreateConstraint::new(self.constraint.clone()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_constraint_round_trip() {
        let create = CreateConstraint::new(
            ConstraintDefinition::unique("users")
                .named("UC_users_email")
                .column("email"),
        );
        let back = create.reverse().unwrap().reverse().unwrap();
        assert_eq!(back, Expression::CreateConstraint(create));
    }

    #[test]
    fn delete_constraint_requires_name() {
        let mut errors = Vec::new();
        DeleteConstraint::new(ConstraintDefinition::primary_key("users"))
            .collect_validation_errors(&mut errors);
        assert_eq!(errors, vec!["The constraint name cannot be empty"]);
    }

    #[test]
    fn delete_constraint_without_columns_is_irreversible() {
        let delete = DeleteConstraint::new(ConstraintDefinition::primary_key("users").named("PK_users"));
        assert!(!delete.is_reversible());
    }
}
