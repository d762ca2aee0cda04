#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferentialAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ReferentialAction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }
}

/// A foreign key from `foreign_table.foreign_columns` to
/// `primary_table.primary_columns`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForeignKeyDefinition {
    pub name: String,
    pub foreign_table: String,
    pub foreign_table_schema: Option<String>,
    pub foreign_columns: Vec<String>,
    pub primary_table: String,
    pub primary_table_schema: Option<String>,
    pub primary_columns: Vec<String>,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}

impl ForeignKeyDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_table(mut self, table: impl Into<String>) -> Self {
        self.foreign_table = table.into();
        self
    }

    pub fn from_schema(mut self, schema: impl Into<String>) -> Self {
        self.foreign_table_schema = Some(schema.into());
        self
    }

    pub fn foreign_columns(mut self, columns: &[&str]) -> Self {
        self.foreign_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn to_table(mut self, table: impl Into<String>) -> Self {
        self.primary_table = table.into();
        self
    }

    pub fn to_schema(mut self, schema: impl Into<String>) -> Self {
        self.primary_table_schema = Some(schema.into());
        self
    }

    pub fn primary_columns(mut self, columns: &[&str]) -> Self {
        self.primary_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = action;
        self
    }

    /// Both tables and both column lists are known.
    pub fn is_fully_specified(&self) -> bool {
        !self.foreign_table.is_empty()
            && !self.primary_table.is_empty()
            && !self.foreign_columns.is_empty()
            && !self.primary_columns.is_empty()
    }

    /// Exchanges the primary and foreign sides, keeping name and rules.
    pub fn swapped(&self) -> Self {
        Self {
            name: self.name.clone(),
            foreign_table: self.primary_table.clone(),
            foreign_table_schema: self.primary_table_schema.clone(),
            foreign_columns: self.primary_columns.clone(),
            primary_table: self.foreign_table.clone(),
            primary_table_schema: self.foreign_table_schema.clone(),
            primary_columns: self.foreign_columns.clone(),
            on_delete: self.on_delete,
            on_update: self.on_update,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_customer_fk() -> ForeignKeyDefinition {
        ForeignKeyDefinition::new("fk_orders_customers")
            .from_table("orders")
            .foreign_columns(&["customer_id"])
            .to_table("customers")
            .primary_columns(&["id"])
            .on_delete(ReferentialAction::Cascade)
    }

    #[test]
    fn fully_specified_requires_both_sides() {
        assert!(order_customer_fk().is_fully_specified());
        assert!(!ForeignKeyDefinition::new("fk_x")
            .from_table("orders")
            .is_fully_specified());
    }

    #[test]
    fn swapped_exchanges_sides_and_keeps_rules() {
        let swapped = order_customer_fk().swapped();

        assert_eq!(swapped.foreign_table, "customers");
        assert_eq!(swapped.foreign_columns, vec!["id"]);
        assert_eq!(swapped.primary_table, "orders");
        assert_eq!(swapped.primary_columns, vec!["customer_id"]);
        assert_eq!(swapped.on_delete, ReferentialAction::Cascade);
        assert_eq!(swapped.swapped(), order_customer_fk());
    }

    #[test]
    fn referential_action_as_sql() {
        assert_eq!(ReferentialAction::NoAction.as_sql(), "NO ACTION");
        assert_eq!(ReferentialAction::Restrict.as_sql(), "RESTRICT");
        assert_eq!(ReferentialAction::Cascade.as_sql(), "CASCADE");
        assert_eq!(ReferentialAction::SetNull.as_sql(), "SET NULL");
        assert_eq!(ReferentialAction::SetDefault.as_sql(), "SET DEFAULT");
    }

    #[test]
    fn referential_action_default() {
        assert_eq!(ReferentialAction::default(), ReferentialAction::NoAction);
    }
}
