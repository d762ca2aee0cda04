use crate::definition::{features, ColumnDefinition, ColumnModification};
use crate::error::Result;
use crate::generator::{ColumnFormatter, ColumnStep, Quoter, TypeMap};

use super::quoter::SqlServerQuoter;
use super::types::type_map;
use super::SqlServerVersion;

const STEPS_2000: &[ColumnStep] = &[
    ColumnStep::Name,
    ColumnStep::Type,
    ColumnStep::Nullable,
    ColumnStep::DefaultValue,
    ColumnStep::PrimaryKey,
    ColumnStep::Identity,
];

const STEPS_2008: &[ColumnStep] = &[
    ColumnStep::Name,
    ColumnStep::Type,
    ColumnStep::Sparse,
    ColumnStep::Nullable,
    ColumnStep::DefaultValue,
    ColumnStep::PrimaryKey,
    ColumnStep::Identity,
    ColumnStep::RowGuid,
];

#[derive(Debug, Clone)]
pub struct SqlServerColumn {
    version: SqlServerVersion,
    quoter: SqlServerQuoter,
    type_map: TypeMap,
}

impl SqlServerColumn {
    pub fn new(version: SqlServerVersion) -> Self {
        Self {
            version,
            quoter: SqlServerQuoter::new(version),
            type_map: type_map(version),
        }
    }

    /// `DF_<table>_<column>`, the name given to inline default constraints.
    pub fn default_constraint_name(&self, table: &str, column: &str) -> String {
        self.quoter.quote_constraint_name(&format!("DF_{}_{}", table, column))
    }
}

impl ColumnFormatter for SqlServerColumn {
    fn quoter(&self) -> &dyn Quoter {
        &self.quoter
    }

    fn type_map(&self) -> &TypeMap {
        &self.type_map
    }

    fn steps(&self) -> &[ColumnStep] {
        if self.version >= SqlServerVersion::V2008 {
            STEPS_2008
        } else {
            STEPS_2000
        }
    }

    fn format_computed(&self, column: &ColumnDefinition) -> Result<String> {
        let mut clause = format!("AS ({})", column.expression.as_deref().unwrap_or_default());
        if column.expression_stored {
            clause.push_str(" PERSISTED");
        }
        Ok(clause)
    }

    /// `ALTER COLUMN` without `NULL` would make the column non-nullable
    /// again, so an explicit nullable alteration says so.
    fn format_nullable(&self, column: &ColumnDefinition) -> String {
        if column.is_computed() {
            return String::new();
        }
        match (column.nullable, column.modification) {
            (Some(true), ColumnModification::Alter) => "NULL".to_string(),
            (Some(true), ColumnModification::Create) => String::new(),
            (None, ColumnModification::Alter) => String::new(),
            (Some(false), _) | (None, ColumnModification::Create) => "NOT NULL".to_string(),
        }
    }

    /// Defaults become named constraints on create; alterations handle them
    /// as separate statements.
    fn format_default_value(&self, column: &ColumnDefinition) -> Result<String> {
        let value = match (&column.default, column.modification) {
            (Some(value), ColumnModification::Create) => value,
            _ => return Ok(String::new()),
        };
        let literal = self.format_default_literal(value)?;
        Ok(match column.table_name.as_deref() {
            Some(table) => format!(
                "CONSTRAINT {} DEFAULT {}",
                self.default_constraint_name(table, &column.name),
                literal
            ),
            None => format!("DEFAULT {}", literal),
        })
    }

    fn format_identity(&self, column: &ColumnDefinition) -> String {
        if !column.identity || column.modification == ColumnModification::Alter {
            return String::new();
        }
        format!(
            "IDENTITY({},{})",
            column.features.int(features::IDENTITY_SEED).unwrap_or(1),
            column.features.int(features::IDENTITY_INCREMENT).unwrap_or(1)
        )
    }

    fn format_sparse(&self, column: &ColumnDefinition) -> String {
        if column.features.flag(features::SPARSE) {
            "SPARSE".to_string()
        } else {
            String::new()
        }
    }

    fn format_row_guid(&self, column: &ColumnDefinition) -> String {
        if column.features.flag(features::ROW_GUID) {
            "ROWGUIDCOL".to_string()
        } else {
            String::new()
        }
    }
}
