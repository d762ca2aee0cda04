//! Default names and schemas filled in before generation.

use crate::definition::{
    ColumnDefinition, ConstraintDefinition, ConstraintKind, ForeignKeyDefinition,
    IndexDefinition,
};
use crate::expression::Expression;

pub trait Conventions: Send + Sync {
    fn default_schema(&self) -> Option<&str> {
        None
    }

    fn primary_key_name(&self, table: &str) -> String {
        format!("PK_{}", table)
    }

    fn constraint_name(&self, constraint: &ConstraintDefinition) -> String {
        match constraint.kind {
            ConstraintKind::PrimaryKey => self.primary_key_name(&constraint.table_name),
            ConstraintKind::Unique => format!(
                "UC_{}_{}",
                constraint.table_name,
                constraint.columns.join("_")
            ),
        }
    }

    fn index_name(&self, index: &IndexDefinition) -> String {
        format!("IX_{}_{}", index.table_name, index.column_names().join("_"))
    }

    fn foreign_key_name(&self, foreign_key: &ForeignKeyDefinition) -> String {
        format!(
            "FK_{}_{}_{}_{}",
            foreign_key.foreign_table,
            foreign_key.foreign_columns.join("_"),
            foreign_key.primary_table,
            foreign_key.primary_columns.join("_")
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct DefaultConventions {
    pub default_schema: Option<String>,
}

impl DefaultConventions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(schema: impl Into<String>) -> Self {
        Self {
            default_schema: Some(schema.into()),
        }
    }
}

impl Conventions for DefaultConventions {
    fn default_schema(&self) -> Option<&str> {
        self.default_schema.as_deref()
    }
}

pub(crate) fn apply(expression: &Expression, conventions: &dyn Conventions) -> Expression {
    let mut resolved = expression.clone();
    let schema = |current: &mut Option<String>| {
        if current.is_none() {
            *current = conventions.default_schema().map(str::to_string);
        }
    };

    match &mut resolved {
        Expression::CreateTable(e) => {
            schema(&mut e.schema_name);
            for column in &mut e.columns {
                resolve_column(column, &e.table_name, conventions);
            }
        }
        Expression::DeleteTable(e) => {
            schema(&mut e.schema_name);
            for column in &mut e.columns {
                resolve_column(column, &e.table_name, conventions);
            }
        }
        Expression::AlterTable(e) => schema(&mut e.schema_name),
        Expression::RenameTable(e) => schema(&mut e.schema_name),
        Expression::CreateColumn(e) => {
            schema(&mut e.schema_name);
            resolve_column(&mut e.column, &e.table_name, conventions);
        }
        Expression::AlterColumn(e) => {
            schema(&mut e.schema_name);
            resolve_column(&mut e.column, &e.table_name, conventions);
        }
        Expression::DeleteColumn(e) => schema(&mut e.schema_name),
        Expression::RenameColumn(e) => schema(&mut e.schema_name),
        Expression::CreateIndex(e) => resolve_index(&mut e.index, conventions),
        Expression::DeleteIndex(e) => resolve_index(&mut e.index, conventions),
        Expression::CreateConstraint(e) => resolve_constraint(&mut e.constraint, conventions),
        Expression::DeleteConstraint(e) => resolve_constraint(&mut e.constraint, conventions),
        Expression::CreateForeignKey(e) => resolve_foreign_key(&mut e.foreign_key, conventions),
        Expression::DeleteForeignKey(e) => {
            schema(&mut e.schema_name);
            if e.foreign_key.is_fully_specified() {
                resolve_foreign_key(&mut e.foreign_key, conventions);
            }
        }
        Expression::CreateSequence(e) => schema(&mut e.sequence.schema_name),
        Expression::DeleteSequence(e) => schema(&mut e.schema_name),
        Expression::InsertData(e) => schema(&mut e.schema_name),
        Expression::DeleteData(e) => schema(&mut e.schema_name),
        Expression::UpdateData(e) => schema(&mut e.schema_name),
        Expression::MergeData(e) => schema(&mut e.schema_name),
        Expression::AlterDefaultValue(e) => schema(&mut e.schema_name),
        Expression::DeleteDefaultConstraint(e) => schema(&mut e.schema_name),
        Expression::CreateSchema(_)
        | Expression::DeleteSchema(_)
        | Expression::AlterSchema(_)
        | Expression::ExecuteSql(_)
        | Expression::ExecuteSqlScript(_)
        | Expression::ExecuteEmbeddedSqlScript(_)
        | Expression::PerformDbOperation(_) => {}
    }

    resolved
}

fn resolve_column(column: &mut ColumnDefinition, table: &str, conventions: &dyn Conventions) {
    if column.table_name.is_none() {
        column.table_name = Some(table.to_string());
    }
    if column.primary_key && column.primary_key_name.is_none() {
        column.primary_key_name = Some(conventions.primary_key_name(table));
    }
}

fn resolve_index(index: &mut IndexDefinition, conventions: &dyn Conventions) {
    if index.schema_name.is_none() {
        index.schema_name = conventions.default_schema().map(str::to_string);
    }
    if index.name.is_empty() {
        index.name = conventions.index_name(index);
    }
}

fn resolve_constraint(constraint: &mut ConstraintDefinition, conventions: &dyn Conventions) {
    if constraint.schema_name.is_none() {
        constraint.schema_name = conventions.default_schema().map(str::to_string);
    }
    if constraint.name.is_empty() {
        constraint.name = conventions.constraint_name(constraint);
    }
}

fn resolve_foreign_key(foreign_key: &mut ForeignKeyDefinition, conventions: &dyn Conventions) {
    if foreign_key.foreign_table_schema.is_none() {
        foreign_key.foreign_table_schema = conventions.default_schema().map(str::to_string);
    }
    if foreign_key.primary_table_schema.is_none() {
        foreign_key.primary_table_schema = conventions.default_schema().map(str::to_string);
    }
    if foreign_key.name.is_empty() {
        foreign_key.name = conventions.foreign_key_name(foreign_key);
    }
}
