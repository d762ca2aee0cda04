use sha2::{Digest, Sha256};

use crate::definition::{ColumnDefinition, DataRow};
use crate::error::{MigrationError, Result};
use crate::expression::Expression;

const PACKED_PREFIX: &str = "fk_";

/// Shortens identifiers that exceed a dialect's name length limit.
///
/// Ordinary names are cut; key, index and constraint names are packed
/// into a hash so different long names stay distinct.
#[derive(Debug, Clone, PartialEq)]
pub struct Truncator {
    pub dialect: &'static str,
    pub max_length: usize,
    pub truncate_names: bool,
    pub pack_key_names: bool,
}

impl Truncator {
    pub fn new(dialect: &'static str, max_length: usize) -> Self {
        Self {
            dialect,
            max_length,
            truncate_names: true,
            pack_key_names: true,
        }
    }

    fn too_long(&self, name: &str) -> MigrationError {
        MigrationError::NameTooLong {
            dialect: self.dialect,
            name: name.to_string(),
            max_length: self.max_length,
        }
    }

    fn fits(&self, name: &str) -> bool {
        name.chars().count() <= self.max_length
    }

    pub fn truncate(&self, name: &str) -> Result<String> {
        if self.fits(name) {
            return Ok(name.to_string());
        }
        if !self.truncate_names {
            return Err(self.too_long(name));
        }
        Ok(name.chars().take(self.max_length).collect())
    }

    /// `fk_` followed by as much of the name's SHA-256 hex digest as fits.
    pub fn pack(&self, name: &str) -> Result<String> {
        if self.fits(name) {
            return Ok(name.to_string());
        }
        if !self.pack_key_names {
            return Err(self.too_long(name));
        }
        let digest: String = Sha256::digest(name.as_bytes())
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        let room = self.max_length.saturating_sub(PACKED_PREFIX.len());
        let packed = format!("{}{}", PACKED_PREFIX, &digest[..room.min(digest.len())]);
        Ok(packed.chars().take(self.max_length).collect())
    }

    fn truncate_opt(&self, name: &mut Option<String>) -> Result<()> {
        if let Some(value) = name {
            *value = self.truncate(value)?;
        }
        Ok(())
    }

    fn truncate_in_place(&self, name: &mut String) -> Result<()> {
        *name = self.truncate(name)?;
        Ok(())
    }

    fn pack_in_place(&self, name: &mut String) -> Result<()> {
        *name = self.pack(name)?;
        Ok(())
    }

    fn truncate_all(&self, names: &mut [String]) -> Result<()> {
        for name in names {
            self.truncate_in_place(name)?;
        }
        Ok(())
    }

    fn truncate_column(&self, column: &mut ColumnDefinition) -> Result<()> {
        self.truncate_in_place(&mut column.name)?;
        self.truncate_opt(&mut column.table_name)?;
        if let Some(key) = &mut column.primary_key_name {
            self.pack_in_place(key)?;
        }
        Ok(())
    }

    fn truncate_row(&self, row: &DataRow) -> Result<DataRow> {
        row.iter()
            .map(|(column, value)| Ok((self.truncate(column)?, value.clone())))
            .collect()
    }

    fn truncate_rows(&self, rows: &mut [DataRow]) -> Result<()> {
        for row in rows {
            *row = self.truncate_row(row)?;
        }
        Ok(())
    }

    /// A copy of `expression` with every over-long identifier shortened.
    pub fn apply(&self, expression: &Expression) -> Result<Expression> {
        let mut resolved = expression.clone();
        match &mut resolved {
            Expression::CreateSchema(_) | Expression::DeleteSchema(_) => {}
            Expression::AlterSchema(e) => self.truncate_in_place(&mut e.table_name)?,
            Expression::CreateTable(e) => {
                self.truncate_in_place(&mut e.table_name)?;
                for column in &mut e.columns {
                    self.truncate_column(column)?;
                }
            }
            Expression::DeleteTable(e) => {
                self.truncate_in_place(&mut e.table_name)?;
                for column in &mut e.columns {
                    self.truncate_column(column)?;
                }
            }
            Expression::AlterTable(e) => self.truncate_in_place(&mut e.table_name)?,
            Expression::RenameTable(e) => {
                self.truncate_in_place(&mut e.old_name)?;
                self.truncate_in_place(&mut e.new_name)?;
            }
            Expression::CreateColumn(e) => {
                self.truncate_in_place(&mut e.table_name)?;
                self.truncate_column(&mut e.column)?;
            }
            Expression::AlterColumn(e) => {
                self.truncate_in_place(&mut e.table_name)?;
                self.truncate_column(&mut e.column)?;
            }
            Expression::DeleteColumn(e) => {
                self.truncate_in_place(&mut e.table_name)?;
                self.truncate_all(&mut e.column_names)?;
            }
            Expression::RenameColumn(e) => {
                self.truncate_in_place(&mut e.table_name)?;
                self.truncate_in_place(&mut e.old_name)?;
                self.truncate_in_place(&mut e.new_name)?;
            }
            Expression::CreateIndex(e) => {
                self.pack_in_place(&mut e.index.name)?;
                self.truncate_in_place(&mut e.index.table_name)?;
                for column in &mut e.index.columns {
                    self.truncate_in_place(&mut column.name)?;
                }
            }
            Expression::DeleteIndex(e) => {
                self.pack_in_place(&mut e.index.name)?;
                self.truncate_in_place(&mut e.index.table_name)?;
                for column in &mut e.index.columns {
                    self.truncate_in_place(&mut column.name)?;
                }
            }
            Expression::CreateConstraint(e) => {
                self.pack_in_place(&mut e.constraint.name)?;
                self.truncate_in_place(&mut e.constraint.table_name)?;
                self.truncate_all(&mut e.constraint.columns)?;
            }
            Expression::DeleteConstraint(e) => {
                self.pack_in_place(&mut e.constraint.name)?;
                self.truncate_in_place(&mut e.constraint.table_name)?;
                self.truncate_all(&mut e.constraint.columns)?;
            }
            Expression::CreateForeignKey(e) => {
                let fk = &mut e.foreign_key;
                self.pack_in_place(&mut fk.name)?;
                self.truncate_in_place(&mut fk.foreign_table)?;
                self.truncate_in_place(&mut fk.primary_table)?;
                self.truncate_all(&mut fk.foreign_columns)?;
                self.truncate_all(&mut fk.primary_columns)?;
            }
            Expression::DeleteForeignKey(e) => {
                self.truncate_in_place(&mut e.table_name)?;
                let fk = &mut e.foreign_key;
                self.pack_in_place(&mut fk.name)?;
                self.truncate_in_place(&mut fk.foreign_table)?;
                self.truncate_in_place(&mut fk.primary_table)?;
                self.truncate_all(&mut fk.foreign_columns)?;
                self.truncate_all(&mut fk.primary_columns)?;
            }
            Expression::CreateSequence(e) => self.truncate_in_place(&mut e.sequence.name)?,
            Expression::DeleteSequence(e) => self.truncate_in_place(&mut e.sequence_name)?,
            Expression::InsertData(e) => {
                self.truncate_in_place(&mut e.table_name)?;
                self.truncate_rows(&mut e.rows)?;
            }
            Expression::DeleteData(e) => {
                self.truncate_in_place(&mut e.table_name)?;
                self.truncate_rows(&mut e.rows)?;
            }
            Expression::UpdateData(e) => {
                self.truncate_in_place(&mut e.table_name)?;
                e.set = self.truncate_row(&e.set)?;
                e.filter = self.truncate_row(&e.filter)?;
            }
            Expression::MergeData(e) => {
                self.truncate_in_place(&mut e.table_name)?;
                self.truncate_rows(&mut e.rows)?;
                self.truncate_all(&mut e.match_columns)?;
            }
            Expression::AlterDefaultValue(e) => {
                self.truncate_in_place(&mut e.table_name)?;
                self.truncate_in_place(&mut e.column_name)?;
            }
            Expression::DeleteDefaultConstraint(e) => {
                self.truncate_in_place(&mut e.table_name)?;
                self.truncate_in_place(&mut e.column_name)?;
            }
            Expression::ExecuteSql(_)
            | Expression::ExecuteSqlScript(_)
            | Expression::ExecuteEmbeddedSqlScript(_)
            | Expression::PerformDbOperation(_) => {}
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{DbType, ForeignKeyDefinition};
    use crate::expression::{CreateForeignKey, CreateTable, InsertData};

    const LONG: &str = "a_table_name_that_is_clearly_longer_than_thirty_one";

    fn firebird() -> Truncator {
        Truncator::new("firebird", 31)
    }

    #[test]
    fn short_names_are_untouched() {
        assert_eq!(firebird().truncate("users").unwrap(), "users");
        assert_eq!(firebird().pack("FK_a_b").unwrap(), "FK_a_b");
    }

    #[test]
    fn truncate_cuts_to_max_length() {
        let cut = firebird().truncate(LONG).unwrap();
        assert_eq!(cut.len(), 31);
        assert!(LONG.starts_with(&cut));
    }

    #[test]
    fn pack_is_deterministic_and_bounded() {
        let truncator = firebird();
        let first = truncator.pack(LONG).unwrap();
        let second = truncator.pack(LONG).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 31);
        assert!(first.starts_with("fk_"));
        assert!(first[3..].chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn different_names_pack_differently() {
        let truncator = firebird();
        assert_ne!(
            truncator.pack(&format!("{}_one", LONG)).unwrap(),
            truncator.pack(&format!("{}_two", LONG)).unwrap()
        );
    }

    #[test]
    fn disabled_shortening_reports_the_name() {
        let truncator = Truncator {
            truncate_names: false,
            pack_key_names: false,
            ..firebird()
        };
        let err = truncator.truncate(LONG).unwrap_err();
        assert!(err.to_string().contains(LONG));
        assert!(matches!(
            truncator.pack(LONG).unwrap_err(),
            MigrationError::NameTooLong { max_length: 31, .. }
        ));
    }

    #[test]
    fn apply_returns_a_shortened_copy() {
        let expr: Expression = CreateTable::new(LONG)
            .column(ColumnDefinition::new(LONG, DbType::Int32).primary_key_named(LONG))
            .into();

        let Expression::CreateTable(table) = firebird().apply(&expr).unwrap() else {
            panic!("kind changed");
        };
        assert_eq!(table.table_name.len(), 31);
        assert_eq!(table.columns[0].name.len(), 31);
        assert!(table.columns[0]
            .primary_key_name
            .as_deref()
            .unwrap()
            .starts_with("fk_"));

        let Expression::CreateTable(original) = expr else {
            panic!("kind changed");
        };
        assert_eq!(original.table_name, LONG);
    }

    #[test]
    fn foreign_key_names_are_packed_and_tables_cut() {
        let expr: Expression = CreateForeignKey::new(
            ForeignKeyDefinition::new(format!("FK_{}", LONG))
                .from_table(LONG)
                .foreign_columns(&["parent_id"])
                .to_table("parent")
                .primary_columns(&["id"]),
        )
        .into();

        let Expression::CreateForeignKey(fk) = firebird().apply(&expr).unwrap() else {
            panic!("kind changed");
        };
        assert!(fk.foreign_key.name.starts_with("fk_"));
        assert_eq!(fk.foreign_key.foreign_table.len(), 31);
        assert_eq!(fk.foreign_key.primary_table, "parent");
    }

    #[test]
    fn data_row_columns_are_truncated() {
        let expr: Expression = InsertData::new("t")
            .row(DataRow::new().with(LONG, 1))
            .into();
        let Expression::InsertData(insert) = firebird().apply(&expr).unwrap() else {
            panic!("kind changed");
        };
        assert_eq!(insert.rows[0].columns().next().unwrap().len(), 31);
    }
}
