use crate::definition::features::{self, AdditionalFeatures};
use crate::definition::DbType;
use crate::value::Value;

/// Whether a column clause is rendered for a new column or for an
/// in-place alteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnModification {
    #[default]
    Create,
    Alter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub db_type: Option<DbType>,
    /// Dialect-specific type text, used verbatim instead of the type map.
    pub custom_type: Option<String>,
    pub size: Option<u32>,
    /// Scale for decimals, fractional precision for time types.
    pub precision: Option<u32>,
    /// `None` leaves nullability unspecified.
    pub nullable: Option<bool>,
    /// `None` means no default at all; `Some(Value::Null)` is `DEFAULT NULL`.
    pub default: Option<Value>,
    pub identity: bool,
    pub primary_key: bool,
    pub primary_key_name: Option<String>,
    pub expression: Option<String>,
    pub expression_stored: bool,
    pub description: Option<String>,
    pub table_name: Option<String>,
    pub modification: ColumnModification,
    pub features: AdditionalFeatures,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, db_type: DbType) -> Self {
        Self {
            db_type: Some(db_type),
            ..Self::named(name)
        }
    }

    pub fn custom(name: impl Into<String>, custom_type: impl Into<String>) -> Self {
        Self {
            custom_type: Some(custom_type.into()),
            ..Self::named(name)
        }
    }

    /// A column with neither type nor options, as used by alterations
    /// that only touch defaults or nullability.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            db_type: None,
            custom_type: None,
            size: None,
            precision: None,
            nullable: None,
            default: None,
            identity: false,
            primary_key: false,
            primary_key_name: None,
            expression: None,
            expression_stored: false,
            description: None,
            table_name: None,
            modification: ColumnModification::Create,
            features: AdditionalFeatures::new(),
        }
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn precision(mut self, size: u32, precision: u32) -> Self {
        self.size = Some(size);
        self.precision = Some(precision);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = Some(false);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = Some(true);
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    pub fn identity_with(mut self, seed: i64, increment: i64) -> Self {
        self.identity = true;
        self.features.set(features::IDENTITY_SEED, seed);
        self.features.set(features::IDENTITY_INCREMENT, increment);
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn primary_key_named(mut self, name: impl Into<String>) -> Self {
        self.primary_key = true;
        self.primary_key_name = Some(name.into());
        self
    }

    pub fn computed(mut self, expression: impl Into<String>, stored: bool) -> Self {
        self.expression = Some(expression.into());
        self.expression_stored = stored;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn sparse(mut self) -> Self {
        self.features.set(features::SPARSE, true);
        self
    }

    pub fn row_guid(mut self) -> Self {
        self.features.set(features::ROW_GUID, true);
        self
    }

    pub fn feature(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.features.set(key, value);
        self
    }

    pub fn on_table(mut self, table: impl Into<String>) -> Self {
        self.table_name = Some(table.into());
        self
    }

    pub fn for_alter(mut self) -> Self {
        self.modification = ColumnModification::Alter;
        self
    }

    pub fn is_computed(&self) -> bool {
        self.expression.is_some()
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    pub fn has_type(&self) -> bool {
        self.db_type.is_some() || self.custom_type.is_some()
    }

    pub(crate) fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        if self.name.trim().is_empty() {
            errors.push("The column name cannot be empty".to_string());
        }
        if !self.has_type() && !self.is_computed() && self.modification == ColumnModification::Create
        {
            errors.push(format!("The column '{}' does not have a type", self.name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_builder_pattern() {
        let column = ColumnDefinition::new("email", DbType::String)
            .size(255)
            .not_null();

        assert_eq!(column.name, "email");
        assert_eq!(column.size, Some(255));
        assert_eq!(column.nullable, Some(false));
        assert!(!column.primary_key);
    }

    #[test]
    fn nullability_starts_unspecified() {
        let column = ColumnDefinition::new("x", DbType::Int32);
        assert_eq!(column.nullable, None);
    }

    #[test]
    fn default_distinguishes_undefined_from_null() {
        let undefined = ColumnDefinition::new("x", DbType::Int32);
        let null = ColumnDefinition::new("x", DbType::Int32).default(Value::Null);

        assert!(!undefined.has_default());
        assert_eq!(null.default, Some(Value::Null));
    }

    #[test]
    fn identity_with_records_seed_and_increment() {
        let column = ColumnDefinition::new("id", DbType::Int64).identity_with(100, 5);

        assert!(column.identity);
        assert_eq!(column.features.int(features::IDENTITY_SEED), Some(100));
        assert_eq!(column.features.int(features::IDENTITY_INCREMENT), Some(5));
    }

    #[test]
    fn primary_key_named() {
        let column = ColumnDefinition::new("id", DbType::Int32).primary_key_named("PK_users");
        assert!(column.primary_key);
        assert_eq!(column.primary_key_name.as_deref(), Some("PK_users"));
    }

    #[test]
    fn computed_column() {
        let column = ColumnDefinition::named("total").computed("[price] * [qty]", true);
        assert!(column.is_computed());
        assert!(column.expression_stored);
    }

    #[test]
    fn untyped_create_column_is_invalid() {
        let mut errors = Vec::new();
        ColumnDefinition::named("x").collect_validation_errors(&mut errors);
        assert_eq!(errors, vec!["The column 'x' does not have a type"]);
    }

    #[test]
    fn untyped_alter_column_is_valid() {
        let mut errors = Vec::new();
        ColumnDefinition::named("x")
            .for_alter()
            .collect_validation_errors(&mut errors);
        assert!(errors.is_empty());
    }
}
