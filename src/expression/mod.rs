mod column;
mod constraint;
mod data;
mod default_value;
mod foreign_key;
mod index;
mod schema;
mod sequence;
mod sql;
mod table;

pub use column::{AlterColumn, CreateColumn, DeleteColumn, RenameColumn};
pub use constraint::{CreateConstraint, DeleteConstraint};
pub use data::{DeleteData, InsertData, MergeData, UpdateData};
pub use default_value::{AlterDefaultValue, DeleteDefaultConstraint};
pub use foreign_key::{CreateForeignKey, DeleteForeignKey};
pub use index::{CreateIndex, DeleteIndex};
pub use schema::{AlterSchema, CreateSchema, DeleteSchema};
pub use sequence::{CreateSequence, DeleteSequence};
pub use sql::{
    DbOperation, ExecuteEmbeddedSqlScript, ExecuteSql, ExecuteSqlScript, PerformDbOperation,
};
pub use table::{AlterTable, CreateTable, DeleteTable, RenameTable};

use crate::convention::Conventions;
use crate::error::{MigrationError, Result};
use crate::processor::Processor;

/// Behaviour shared by every expression kind.
pub trait MigrationExpression: Send + Sync {
    /// Kind name used in error messages.
    fn kind(&self) -> &'static str;

    fn describe(&self) -> String;

    /// Appends a message for every missing or inconsistent field.
    fn collect_validation_errors(&self, errors: &mut Vec<String>);

    fn reverse(&self) -> Result<Expression> {
        Err(MigrationError::Irreversible(self.kind()))
    }

    fn is_reversible(&self) -> bool {
        self.reverse().is_ok()
    }
}

/// One schema or data change.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    CreateSchema(CreateSchema),
    DeleteSchema(DeleteSchema),
    AlterSchema(AlterSchema),
    CreateTable(CreateTable),
    DeleteTable(DeleteTable),
    AlterTable(AlterTable),
    RenameTable(RenameTable),
    CreateColumn(CreateColumn),
    AlterColumn(AlterColumn),
    DeleteColumn(DeleteColumn),
    RenameColumn(RenameColumn),
    CreateIndex(CreateIndex),
    DeleteIndex(DeleteIndex),
    CreateConstraint(CreateConstraint),
    DeleteConstraint(DeleteConstraint),
    CreateForeignKey(CreateForeignKey),
    DeleteForeignKey(DeleteForeignKey),
    CreateSequence(CreateSequence),
    DeleteSequence(DeleteSequence),
    InsertData(InsertData),
    DeleteData(DeleteData),
    UpdateData(UpdateData),
    MergeData(MergeData),
    AlterDefaultValue(AlterDefaultValue),
    DeleteDefaultConstraint(DeleteDefaultConstraint),
    ExecuteSql(ExecuteSql),
    ExecuteSqlScript(ExecuteSqlScript),
    ExecuteEmbeddedSqlScript(ExecuteEmbeddedSqlScript),
    PerformDbOperation(PerformDbOperation),
}

impl Expression {
    fn inner(&self) -> &dyn MigrationExpression {
        match self {
            Expression::CreateSchema(e) => e,
            Expression::DeleteSchema(e) => e,
            Expression::AlterSchema(e) => e,
            Expression::CreateTable(e) => e,
            Expression::DeleteTable(e) => e,
            Expression::AlterTable(e) => e,
            Expression::RenameTable(e) => e,
            Expression::CreateColumn(e) => e,
            Expression::AlterColumn(e) => e,
            Expression::DeleteColumn(e) => e,
            Expression::RenameColumn(e) => e,
            Expression::CreateIndex(e) => e,
            Expression::DeleteIndex(e) => e,
            Expression::CreateConstraint(e) => e,
            Expression::DeleteConstraint(e) => e,
            Expression::CreateForeignKey(e) => e,
            Expression::DeleteForeignKey(e) => e,
            Expression::CreateSequence(e) => e,
            Expression::DeleteSequence(e) => e,
            Expression::InsertData(e) => e,
            Expression::DeleteData(e) => e,
            Expression::UpdateData(e) => e,
            Expression::MergeData(e) => e,
            Expression::AlterDefaultValue(e) => e,
            Expression::DeleteDefaultConstraint(e) => e,
            Expression::ExecuteSql(e) => e,
            Expression::ExecuteSqlScript(e) => e,
            Expression::ExecuteEmbeddedSqlScript(e) => e,
            Expression::PerformDbOperation(e) => e,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.inner().kind()
    }

    pub fn describe(&self) -> String {
        self.inner().describe()
    }

    pub fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        self.inner().collect_validation_errors(errors)
    }

    /// Turns the collected validation messages into an error.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        self.collect_validation_errors(&mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(MigrationError::Invalid(errors))
        }
    }

    pub fn reverse(&self) -> Result<Expression> {
        self.inner().reverse()
    }

    pub fn is_reversible(&self) -> bool {
        self.inner().is_reversible()
    }

    /// Returns a copy with unset names and schemas filled in.
    pub fn apply_conventions(&self, conventions: &dyn Conventions) -> Expression {
        crate::convention::apply(self, conventions)
    }

    pub fn execute_with(&self, processor: &mut dyn Processor) -> Result<()> {
        match self {
            Expression::CreateSchema(e) => processor.process_create_schema(e),
            Expression::DeleteSchema(e) => processor.process_delete_schema(e),
            Expression::AlterSchema(e) => processor.process_alter_schema(e),
            Expression::CreateTable(e) => processor.process_create_table(e),
            Expression::DeleteTable(e) => processor.process_delete_table(e),
            Expression::AlterTable(e) => processor.process_alter_table(e),
            Expression::RenameTable(e) => processor.process_rename_table(e),
            Expression::CreateColumn(e) => processor.process_create_column(e),
            Expression::AlterColumn(e) => processor.process_alter_column(e),
            Expression::DeleteColumn(e) => processor.process_delete_column(e),
            Expression::RenameColumn(e) => processor.process_rename_column(e),
            Expression::CreateIndex(e) => processor.process_create_index(e),
            Expression::DeleteIndex(e) => processor.process_delete_index(e),
            Expression::CreateConstraint(e) => processor.process_create_constraint(e),
            Expression::DeleteConstraint(e) => processor.process_delete_constraint(e),
            Expression::CreateForeignKey(e) => processor.process_create_foreign_key(e),
            Expression::DeleteForeignKey(e) => processor.process_delete_foreign_key(e),
            Expression::CreateSequence(e) => processor.process_create_sequence(e),
            Expression::DeleteSequence(e) => processor.process_delete_sequence(e),
            Expression::InsertData(e) => processor.process_insert_data(e),
            Expression::DeleteData(e) => processor.process_delete_data(e),
            Expression::UpdateData(e) => processor.process_update_data(e),
            Expression::MergeData(e) => processor.process_merge_data(e),
            Expression::AlterDefaultValue(e) => processor.process_alter_default_value(e),
            Expression::DeleteDefaultConstraint(e) => {
                processor.process_delete_default_constraint(e)
            }
            Expression::ExecuteSql(e) => processor.process_execute_sql(e),
            Expression::ExecuteSqlScript(e) => processor.process_execute_sql_script(e),
            Expression::ExecuteEmbeddedSqlScript(e) => {
                processor.process_execute_embedded_sql_script(e)
            }
            Expression::PerformDbOperation(e) => processor.process_perform_db_operation(e),
        }
    }
}

macro_rules! impl_from_expression {
    ($($kind:ident),* $(,)?) => {
        $(
            impl From<$kind> for Expression {
                fn from(expression: $kind) -> Self {
                    Expression::$kind(expression)
                }
            }
        )*
    };
}

impl_from_expression!(
    CreateSchema,
    DeleteSchema,
    AlterSchema,
    CreateTable,
    DeleteTable,
    AlterTable,
    RenameTable,
    CreateColumn,
    AlterColumn,
    DeleteColumn,
    RenameColumn,
    CreateIndex,
    DeleteIndex,
    CreateConstraint,
    DeleteConstraint,
    CreateForeignKey,
    DeleteForeignKey,
    CreateSequence,
    DeleteSequence,
    InsertData,
    DeleteData,
    UpdateData,
    MergeData,
    AlterDefaultValue,
    DeleteDefaultConstraint,
    ExecuteSql,
    ExecuteSqlScript,
    ExecuteEmbeddedSqlScript,
    PerformDbOperation,
);

pub(crate) fn require(errors: &mut Vec<String>, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.push(message.to_string());
    }
}
