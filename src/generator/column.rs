use crate::definition::{ColumnDefinition, ColumnModification};
use crate::error::Result;
use crate::generator::quoter::Quoter;
use crate::generator::type_map::TypeMap;
use crate::value::Value;

/// One clause of a column definition. Formatters render their steps in
/// order and join the non-empty results with a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnStep {
    Name,
    Type,
    Sparse,
    Nullable,
    DefaultValue,
    PrimaryKey,
    Identity,
    RowGuid,
    Description,
}

pub const DEFAULT_STEPS: &[ColumnStep] = &[
    ColumnStep::Name,
    ColumnStep::Type,
    ColumnStep::Nullable,
    ColumnStep::DefaultValue,
    ColumnStep::PrimaryKey,
    ColumnStep::Identity,
];

pub trait ColumnFormatter: Send + Sync {
    fn quoter(&self) -> &dyn Quoter;

    fn type_map(&self) -> &TypeMap;

    fn steps(&self) -> &[ColumnStep] {
        DEFAULT_STEPS
    }

    fn format(&self, column: &ColumnDefinition) -> Result<String> {
        let mut clauses = Vec::new();
        for step in self.steps() {
            let clause = self.format_step(*step, column)?;
            if !clause.is_empty() {
                clauses.push(clause);
            }
        }
        Ok(clauses.join(" "))
    }

    fn format_step(&self, step: ColumnStep, column: &ColumnDefinition) -> Result<String> {
        let computed = column.is_computed();
        match step {
            ColumnStep::Name => Ok(self.quoter().quote_column_name(&column.name)),
            ColumnStep::Type if computed => self.format_computed(column),
            ColumnStep::Type => self.format_type(column),
            ColumnStep::Sparse => Ok(self.format_sparse(column)),
            ColumnStep::Nullable => Ok(self.format_nullable(column)),
            ColumnStep::DefaultValue | ColumnStep::Identity if computed => Ok(String::new()),
            ColumnStep::DefaultValue => self.format_default_value(column),
            ColumnStep::PrimaryKey => Ok(self.format_primary_key(column)),
            ColumnStep::Identity => Ok(self.format_identity(column)),
            ColumnStep::RowGuid => Ok(self.format_row_guid(column)),
            ColumnStep::Description => self.format_description(column),
        }
    }

    /// Custom type text wins over the type map; an untyped column renders
    /// nothing.
    fn format_type(&self, column: &ColumnDefinition) -> Result<String> {
        if let Some(custom) = &column.custom_type {
            return Ok(custom.clone());
        }
        match column.db_type {
            Some(db_type) => self.type_map().get(db_type, column.size, column.precision),
            None => Ok(String::new()),
        }
    }

    fn format_computed(&self, column: &ColumnDefinition) -> Result<String> {
        let data_type = self.format_type(column)?;
        let clause = format!(
            "GENERATED ALWAYS AS ({}) {}",
            column.expression.as_deref().unwrap_or_default(),
            if column.expression_stored {
                "STORED"
            } else {
                "VIRTUAL"
            }
        );
        Ok(if data_type.is_empty() {
            clause
        } else {
            format!("{} {}", data_type, clause)
        })
    }

    fn format_nullable(&self, column: &ColumnDefinition) -> String {
        match (column.nullable, column.modification) {
            (Some(true), _) => String::new(),
            (None, ColumnModification::Alter) => String::new(),
            (Some(false), _) | (None, ColumnModification::Create) => "NOT NULL".to_string(),
        }
    }

    fn format_default_value(&self, column: &ColumnDefinition) -> Result<String> {
        match &column.default {
            None => Ok(String::new()),
            Some(value) => Ok(format!("DEFAULT {}", self.format_default_literal(value)?)),
        }
    }

    /// Strings that look like function calls are emitted verbatim.
    fn format_default_literal(&self, value: &Value) -> Result<String> {
        match value {
            Value::String(text) if text.ends_with("()") => Ok(text.clone()),
            other => self.quoter().quote_value(other),
        }
    }

    fn format_primary_key(&self, _column: &ColumnDefinition) -> String {
        String::new()
    }

    fn format_identity(&self, column: &ColumnDefinition) -> String {
        if column.identity {
            "GENERATED BY DEFAULT AS IDENTITY".to_string()
        } else {
            String::new()
        }
    }

    fn format_sparse(&self, _column: &ColumnDefinition) -> String {
        String::new()
    }

    fn format_row_guid(&self, _column: &ColumnDefinition) -> String {
        String::new()
    }

    fn format_description(&self, _column: &ColumnDefinition) -> Result<String> {
        Ok(String::new())
    }

    /// Whether the primary key was already rendered inside a column clause.
    fn renders_primary_key_inline(&self, _columns: &[ColumnDefinition]) -> bool {
        false
    }

    fn format_primary_key_constraint(&self, columns: &[ColumnDefinition]) -> String {
        let keys: Vec<&ColumnDefinition> = columns.iter().filter(|c| c.primary_key).collect();
        if keys.is_empty() || self.renders_primary_key_inline(columns) {
            return String::new();
        }
        let names = keys
            .iter()
            .map(|c| self.quoter().quote_column_name(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        match keys
            .iter()
            .find_map(|c| c.primary_key_name.as_deref())
            .filter(|name| !name.is_empty())
        {
            Some(name) => format!(
                "CONSTRAINT {} PRIMARY KEY ({})",
                self.quoter().quote_constraint_name(name),
                names
            ),
            None => format!("PRIMARY KEY ({})", names),
        }
    }

    /// Column clauses joined by `, `, followed by the primary key clause.
    fn format_all(&self, columns: &[ColumnDefinition]) -> Result<String> {
        let mut clauses = columns
            .iter()
            .map(|column| self.format(column))
            .collect::<Result<Vec<_>>>()?;
        let primary_key = self.format_primary_key_constraint(columns);
        if !primary_key.is_empty() {
            clauses.push(primary_key);
        }
        Ok(clauses.join(", "))
    }
}
