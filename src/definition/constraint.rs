use crate::definition::features::{self, AdditionalFeatures};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
}

impl ConstraintKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "PRIMARY KEY",
            ConstraintKind::Unique => "UNIQUE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintDefinition {
    pub kind: ConstraintKind,
    pub name: String,
    pub schema_name: Option<String>,
    pub table_name: String,
    pub columns: Vec<String>,
    pub features: AdditionalFeatures,
}

impl ConstraintDefinition {
    pub fn primary_key(table: impl Into<String>) -> Self {
        Self::with_kind(ConstraintKind::PrimaryKey, table)
    }

    pub fn unique(table: impl Into<String>) -> Self {
        Self::with_kind(ConstraintKind::Unique, table)
    }

    fn with_kind(kind: ConstraintKind, table: impl Into<String>) -> Self {
        Self {
            kind,
            name: String::new(),
            schema_name: None,
            table_name: table.into(),
            columns: Vec::new(),
            features: AdditionalFeatures::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns.extend(columns.iter().map(|c| c.to_string()));
        self
    }

    /// Explicit clustering choice; without it the dialect default applies.
    pub fn clustered(mut self, clustered: bool) -> Self {
        self.features.set(features::CLUSTERED, clustered);
        self
    }

    pub fn is_primary_key(&self) -> bool {
        self.kind == ConstraintKind::PrimaryKey
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_constraint_builder() {
        let constraint = ConstraintDefinition::unique("users")
            .named("uq_users_email")
            .column("email");

        assert_eq!(constraint.kind, ConstraintKind::Unique);
        assert_eq!(constraint.name, "uq_users_email");
        assert_eq!(constraint.columns, vec!["email"]);
        assert!(!constraint.is_primary_key());
    }

    #[test]
    fn primary_key_without_name_is_left_for_conventions() {
        let constraint = ConstraintDefinition::primary_key("users").columns(&["a", "b"]);
        assert!(constraint.name.is_empty());
        assert_eq!(constraint.columns.len(), 2);
    }

    #[test]
    fn constraint_kind_sql() {
        assert_eq!(ConstraintKind::PrimaryKey.as_sql(), "PRIMARY KEY");
        assert_eq!(ConstraintKind::Unique.as_sql(), "UNIQUE");
    }
}
