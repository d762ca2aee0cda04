//! SQL Server 2000 through 2016.
//!
//! One generator serves every version; capabilities switch on as the
//! version increases. Generated text may contain `GO` lines, and
//! [`Generator::split_batches`] splits on them.

mod column;
mod description;
mod quoter;
mod types;

pub use column::SqlServerColumn;
pub use description::ExtendedPropertyDescriptions;
pub use quoter::SqlServerQuoter;
pub use types::type_map;

use crate::definition::{features, ReferentialAction};
use crate::error::Result;
use crate::expression::*;
use crate::generator::{
    split_on_go, ColumnFormatter, DescriptionGenerator, DialectKind, Generator, GeneratorOptions,
    Quoter,
};

const BATCH_SEPARATOR: &str = "\nGO\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SqlServerVersion {
    V2000,
    V2005,
    V2008,
    V2012,
    V2014,
    V2016,
}

impl SqlServerVersion {
    pub fn from_kind(kind: DialectKind) -> Option<Self> {
        Some(match kind {
            DialectKind::SqlServer2000 => SqlServerVersion::V2000,
            DialectKind::SqlServer2005 => SqlServerVersion::V2005,
            DialectKind::SqlServer2008 => SqlServerVersion::V2008,
            DialectKind::SqlServer2012 => SqlServerVersion::V2012,
            DialectKind::SqlServer2014 => SqlServerVersion::V2014,
            DialectKind::SqlServer2016 => SqlServerVersion::V2016,
            _ => return None,
        })
    }

    pub fn kind(&self) -> DialectKind {
        match self {
            SqlServerVersion::V2000 => DialectKind::SqlServer2000,
            SqlServerVersion::V2005 => DialectKind::SqlServer2005,
            SqlServerVersion::V2008 => DialectKind::SqlServer2008,
            SqlServerVersion::V2012 => DialectKind::SqlServer2012,
            SqlServerVersion::V2014 => DialectKind::SqlServer2014,
            SqlServerVersion::V2016 => DialectKind::SqlServer2016,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

pub struct SqlServerGenerator {
    version: SqlServerVersion,
    options: GeneratorOptions,
    quoter: SqlServerQuoter,
    column: SqlServerColumn,
    describer: ExtendedPropertyDescriptions,
}

impl SqlServerGenerator {
    pub fn new(version: SqlServerVersion, options: GeneratorOptions) -> Self {
        Self {
            version,
            options,
            quoter: SqlServerQuoter::new(version),
            column: SqlServerColumn::new(version),
            describer: ExtendedPropertyDescriptions::new(version),
        }
    }

    pub fn version(&self) -> SqlServerVersion {
        self.version
    }

    /// Looks up the column's default constraint by catalog and drops it when
    /// one exists. Ends without a terminator so it can share a batch.
    fn drop_default_constraint(&self, table: &str, column: &str) -> String {
        let table_literal = self.quoter.format_string(table);
        let column_literal = self.quoter.format_string(column);
        let drop = format!("ALTER TABLE {} DROP CONSTRAINT ", table).replace('\'', "''");

        let lookup = if self.version >= SqlServerVersion::V2005 {
            format!(
                "DECLARE @default sysname, @sql nvarchar(max);\n\
                 SELECT @default = name FROM sys.default_constraints \
                 WHERE parent_object_id = OBJECT_ID({table}) AND type = 'D' \
                 AND parent_column_id = (SELECT column_id FROM sys.columns \
                 WHERE object_id = OBJECT_ID({table}) AND name = {column});",
                table = table_literal,
                column = column_literal
            )
        } else {
            format!(
                "DECLARE @default sysname, @sql nvarchar(4000);\n\
                 SELECT @default = so.name FROM sysobjects so \
                 INNER JOIN syscolumns sc ON so.id = sc.cdefault \
                 WHERE sc.id = OBJECT_ID({table}) AND sc.name = {column};",
                table = table_literal,
                column = column_literal
            )
        };
        format!(
            "{}\nIF @default IS NOT NULL\nBEGIN\n    SET @sql = N'{}' + QUOTENAME(@default);\n    EXEC sp_executesql @sql;\nEND",
            lookup, drop
        )
    }

    fn add_default_constraint(&self, table: &str, table_name: &str, column: &str, literal: &str) -> String {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} DEFAULT {} FOR {}",
            table,
            self.column.default_constraint_name(table_name, column),
            literal,
            self.quoter.quote_column_name(column)
        )
    }
}

impl Generator for SqlServerGenerator {
    fn dialect(&self) -> DialectKind {
        self.version.kind()
    }

    fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    fn quoter(&self) -> &dyn Quoter {
        &self.quoter
    }

    fn column(&self) -> &dyn ColumnFormatter {
        &self.column
    }

    fn describer(&self) -> &dyn DescriptionGenerator {
        &self.describer
    }

    fn supports_schemas(&self) -> bool {
        self.version >= SqlServerVersion::V2005
    }

    fn supports_sequences(&self) -> bool {
        self.version >= SqlServerVersion::V2012
    }

    fn supports_clustered_indexes(&self) -> bool {
        true
    }

    fn supports_included_columns(&self) -> bool {
        self.version >= SqlServerVersion::V2005
    }

    fn supports_filtered_indexes(&self) -> bool {
        self.version >= SqlServerVersion::V2008
    }

    fn supports_drop_if_exists(&self) -> bool {
        self.version >= SqlServerVersion::V2016
    }

    fn supports_referential_action(&self, _on_update: bool, action: ReferentialAction) -> bool {
        action != ReferentialAction::Restrict
    }

    fn split_batches(&self, sql: &str) -> Vec<String> {
        split_on_go(sql)
    }

    fn alter_schema(&self, expression: &AlterSchema) -> Result<String> {
        if !self.supports_schemas() {
            return self.handle("Moving tables between schemas");
        }
        Ok(format!(
            "ALTER SCHEMA {} TRANSFER {}",
            self.quoter
                .quote_schema_name(expression.destination_schema.as_deref()),
            self.table_name(&expression.table_name, expression.source_schema.as_deref())
        ))
    }

    fn delete_table(&self, expression: &DeleteTable) -> Result<String> {
        let table = self.table_name(&expression.table_name, expression.schema_name.as_deref());
        if !expression.if_exists {
            return Ok(format!("DROP TABLE {}", table));
        }
        if self.supports_drop_if_exists() {
            return Ok(format!("DROP TABLE IF EXISTS {}", table));
        }
        Ok(format!(
            "IF OBJECT_ID({}, N'U') IS NOT NULL DROP TABLE {}",
            self.quoter.format_string(&table),
            table
        ))
    }

    fn rename_table(&self, expression: &RenameTable) -> Result<String> {
        let table = self.table_name(&expression.old_name, expression.schema_name.as_deref());
        Ok(format!(
            "EXEC sp_rename {}, {}",
            self.quoter.format_string(&table),
            self.quoter.format_string(&expression.new_name)
        ))
    }

    fn add_column_keyword(&self) -> &'static str {
        "ADD"
    }

    fn alter_column(&self, expression: &AlterColumn) -> Result<String> {
        let column = self.prepare_column(&expression.owned_column())?;
        let schema = expression.schema_name.as_deref();
        let table = self.table_name(&expression.table_name, schema);

        let mut statements = Vec::new();
        if column.has_type() {
            statements.push(format!(
                "ALTER TABLE {} ALTER COLUMN {}",
                table,
                self.column.format(&column)?
            ));
        } else if column.nullable.is_some() {
            self.degrade("Changing nullability without a column type")?;
        }
        if let Some(default) = &column.default {
            statements.push(self.drop_default_constraint(&table, &column.name));
            statements.push(self.add_default_constraint(
                &table,
                &expression.table_name,
                &column.name,
                &self.column.format_default_literal(default)?,
            ));
        }
        if let Some(description) = column.description.as_deref().filter(|d| !d.is_empty()) {
            statements.extend(self.describer.alter_column_description(
                schema,
                &expression.table_name,
                &column.name,
                description,
            ));
        }
        Ok(self.join(statements))
    }

    /// Each column's default constraint is dropped in its own batch before
    /// the column itself.
    fn delete_column(&self, expression: &DeleteColumn) -> Result<String> {
        let table = self.table_name(&expression.table_name, expression.schema_name.as_deref());
        let batches: Vec<String> = expression
            .column_names
            .iter()
            .flat_map(|column| {
                [
                    self.drop_default_constraint(&table, column),
                    format!(
                        "ALTER TABLE {} DROP COLUMN {}",
                        table,
                        self.quoter.quote_column_name(column)
                    ),
                ]
            })
            .collect();
        Ok(batches.join(BATCH_SEPARATOR))
    }

    fn rename_column(&self, expression: &RenameColumn) -> Result<String> {
        let column = format!(
            "{}.{}",
            self.table_name(&expression.table_name, expression.schema_name.as_deref()),
            self.quoter.quote_column_name(&expression.old_name)
        );
        Ok(format!(
            "EXEC sp_rename {}, {}, N'COLUMN'",
            self.quoter.format_string(&column),
            self.quoter.format_string(&expression.new_name)
        ))
    }

    fn create_index(&self, expression: &CreateIndex) -> Result<String> {
        let index = &expression.index;
        let mut sql = String::from("CREATE ");
        if index.unique {
            sql.push_str("UNIQUE ");
        }
        sql.push_str(if index.clustered {
            "CLUSTERED "
        } else {
            "NONCLUSTERED "
        });
        sql.push_str(&format!(
            "INDEX {} ON {} ({})",
            self.quoter.quote(&index.name),
            self.table_name(&index.table_name, index.schema_name.as_deref()),
            self.index_columns(expression)
        ));

        let includes = index.includes();
        if !includes.is_empty() {
            if self.supports_included_columns() {
                sql.push_str(&format!(" INCLUDE ({})", self.column_list(&includes)));
            } else {
                self.degrade("Included index columns")?;
            }
        }
        if let Some(filter) = index.filter_predicate() {
            if self.supports_filtered_indexes() {
                sql.push_str(&format!(" WHERE {}", filter));
            } else {
                self.degrade("Filtered indexes")?;
            }
        }
        if index.features.flag(features::ONLINE) {
            if self.version >= SqlServerVersion::V2005 {
                sql.push_str(" WITH (ONLINE = ON)");
            } else {
                self.degrade("Online index operations")?;
            }
        }
        Ok(sql)
    }

    fn delete_index(&self, expression: &DeleteIndex) -> Result<String> {
        let index = &expression.index;
        let table = self.table_name(&index.table_name, index.schema_name.as_deref());
        if self.version >= SqlServerVersion::V2005 {
            Ok(format!("DROP INDEX {} ON {}", self.quoter.quote(&index.name), table))
        } else {
            Ok(format!("DROP INDEX {}.{}", table, self.quoter.quote(&index.name)))
        }
    }

    fn create_constraint(&self, expression: &CreateConstraint) -> Result<String> {
        let constraint = &expression.constraint;
        let clustering = match constraint
            .features
            .get(features::CLUSTERED)
            .and_then(serde_json::Value::as_bool)
        {
            Some(true) => " CLUSTERED",
            Some(false) => " NONCLUSTERED",
            None => "",
        };
        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} {}{} ({})",
            self.table_name(&constraint.table_name, constraint.schema_name.as_deref()),
            self.quoter.quote_constraint_name(&constraint.name),
            constraint.kind.as_sql(),
            clustering,
            self.column_list(&constraint.columns)
        ))
    }

    fn insert_data(&self, expression: &InsertData) -> Result<String> {
        let table = self.table_name(&expression.table_name, expression.schema_name.as_deref());
        let mut statements = expression
            .rows
            .iter()
            .map(|row| self.insert_row(&table, row))
            .collect::<Result<Vec<_>>>()?;
        if expression.features.flag(features::IDENTITY_INSERT) && !statements.is_empty() {
            statements.insert(0, format!("SET IDENTITY_INSERT {} ON", table));
            statements.push(format!("SET IDENTITY_INSERT {} OFF", table));
        }
        Ok(self.join(statements))
    }

    fn alter_default_value(&self, expression: &AlterDefaultValue) -> Result<String> {
        let table = self.table_name(&expression.table_name, expression.schema_name.as_deref());
        let mut statements = vec![self.drop_default_constraint(&table, &expression.column_name)];
        if let Some(default) = &expression.default {
            statements.push(self.add_default_constraint(
                &table,
                &expression.table_name,
                &expression.column_name,
                &self.column.format_default_literal(default)?,
            ));
        }
        Ok(self.join(statements))
    }

    fn delete_default_constraint(&self, expression: &DeleteDefaultConstraint) -> Result<String> {
        let table = self.table_name(&expression.table_name, expression.schema_name.as_deref());
        Ok(self.drop_default_constraint(&table, &expression.column_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{
        ColumnDefinition, ConstraintDefinition, DataRow, DbType, IndexDefinition,
        SequenceDefinition,
    };
    use crate::generator::GeneratorOptions;

    fn generator(version: SqlServerVersion) -> SqlServerGenerator {
        SqlServerGenerator::new(version, GeneratorOptions::default())
    }

    fn generate(version: SqlServerVersion, expression: impl Into<Expression>) -> String {
        generator(version).generate(&expression.into()).unwrap()
    }

    #[test]
    fn create_table_with_identity_primary_key() {
        let sql = generate(
            SqlServerVersion::V2005,
            CreateTable::new("T")
                .column(ColumnDefinition::new("Id", DbType::Int32).identity().primary_key())
                .column(ColumnDefinition::new("Name", DbType::String).size(50).not_null()),
        );
        assert_eq!(
            sql,
            "CREATE TABLE [dbo].[T] ([Id] INT NOT NULL IDENTITY(1,1), [Name] NVARCHAR(50) NOT NULL, PRIMARY KEY ([Id]))"
        );
    }

    #[test]
    fn delete_column_drops_default_constraint_first() {
        let generator = generator(SqlServerVersion::V2008);
        let sql = generator
            .generate(&DeleteColumn::new("T", "Name").into())
            .unwrap();
        assert!(sql.contains("\nGO\n"));

        let batches = generator.split_batches(&sql);
        assert_eq!(batches.len(), 2);
        assert!(batches[0].starts_with("DECLARE @default sysname"));
        assert!(batches[0].contains("FROM sys.default_constraints"));
        assert!(batches[0].contains("N'ALTER TABLE [dbo].[T] DROP CONSTRAINT ' + QUOTENAME(@default)"));
        assert_eq!(batches[1], "ALTER TABLE [dbo].[T] DROP COLUMN [Name]");
    }

    #[test]
    fn delete_column_on_2000_reads_legacy_catalog() {
        let sql = generate(SqlServerVersion::V2000, DeleteColumn::new("T", "Name"));
        assert!(sql.contains("INNER JOIN syscolumns sc ON so.id = sc.cdefault"));
        assert!(sql.ends_with("\nGO\nALTER TABLE [T] DROP COLUMN [Name]"));
    }

    #[test]
    fn delete_several_columns_alternates_batches() {
        let generator = generator(SqlServerVersion::V2012);
        let sql = generator
            .generate(&DeleteColumn::new("T", "A").column("B").into())
            .unwrap();
        let batches = generator.split_batches(&sql);
        assert_eq!(batches.len(), 4);
        assert_eq!(batches[1], "ALTER TABLE [dbo].[T] DROP COLUMN [A]");
        assert_eq!(batches[3], "ALTER TABLE [dbo].[T] DROP COLUMN [B]");
    }

    #[test]
    fn create_table_names_default_constraints() {
        let sql = generate(
            SqlServerVersion::V2008,
            CreateTable::new("Users")
                .column(ColumnDefinition::new("Active", DbType::Boolean).default(true)),
        );
        assert_eq!(
            sql,
            "CREATE TABLE [dbo].[Users] ([Active] BIT NOT NULL CONSTRAINT [DF_Users_Active] DEFAULT 1)"
        );
    }

    #[test]
    fn renames_use_sp_rename() {
        assert_eq!(
            generate(SqlServerVersion::V2008, RenameTable::new("Old", "New")),
            "EXEC sp_rename N'[dbo].[Old]', N'New'"
        );
        assert_eq!(
            generate(SqlServerVersion::V2008, RenameColumn::new("T", "A", "B")),
            "EXEC sp_rename N'[dbo].[T].[A]', N'B', N'COLUMN'"
        );
    }

    #[test]
    fn alter_schema_transfers() {
        let expression = AlterSchema::new("Users").from_schema("staging").to_schema("crm");
        assert_eq!(
            generate(SqlServerVersion::V2005, expression.clone()),
            "ALTER SCHEMA [crm] TRANSFER [staging].[Users]"
        );
        assert_eq!(generate(SqlServerVersion::V2000, expression), "");
    }

    #[test]
    fn alter_column_replaces_default_constraint() {
        let sql = generate(
            SqlServerVersion::V2008,
            AlterColumn::new(
                "Users",
                ColumnDefinition::new("Name", DbType::String)
                    .size(100)
                    .nullable()
                    .default("anon"),
            ),
        );
        assert!(sql.starts_with("ALTER TABLE [dbo].[Users] ALTER COLUMN [Name] NVARCHAR(100) NULL;\n"));
        assert!(sql.contains("DECLARE @default sysname"));
        assert!(sql.ends_with(
            "ALTER TABLE [dbo].[Users] ADD CONSTRAINT [DF_Users_Name] DEFAULT N'anon' FOR [Name]"
        ));
    }

    #[test]
    fn index_options_follow_version() {
        let index = CreateIndex::new(
            IndexDefinition::new("IX_Users_Email", "Users")
                .unique()
                .column("Email")
                .include("Name")
                .filter("[Email] IS NOT NULL")
                .online(),
        );
        assert_eq!(
            generate(SqlServerVersion::V2008, index.clone()),
            "CREATE UNIQUE NONCLUSTERED INDEX [IX_Users_Email] ON [dbo].[Users] ([Email] ASC) INCLUDE ([Name]) WHERE [Email] IS NOT NULL WITH (ONLINE = ON)"
        );
        assert_eq!(
            generate(SqlServerVersion::V2005, index.clone()),
            "CREATE UNIQUE NONCLUSTERED INDEX [IX_Users_Email] ON [dbo].[Users] ([Email] ASC) INCLUDE ([Name]) WITH (ONLINE = ON)"
        );

        let strict = SqlServerGenerator::new(SqlServerVersion::V2005, GeneratorOptions::strict());
        let err = strict.generate(&index.into()).unwrap_err();
        assert_eq!(err.to_string(), "Filtered indexes is not supported by sqlserver2005");
    }

    #[test]
    fn drop_index_syntax() {
        let index = DeleteIndex::new(IndexDefinition::new("IX_A", "T"));
        assert_eq!(generate(SqlServerVersion::V2005, index.clone()), "DROP INDEX [IX_A] ON [dbo].[T]");
        assert_eq!(generate(SqlServerVersion::V2000, index), "DROP INDEX [T].[IX_A]");
    }

    #[test]
    fn clustered_primary_key_constraint() {
        let sql = generate(
            SqlServerVersion::V2012,
            CreateConstraint::new(
                ConstraintDefinition::primary_key("T")
                    .named("PK_T")
                    .column("Id")
                    .clustered(false),
            ),
        );
        assert_eq!(sql, "ALTER TABLE [dbo].[T] ADD CONSTRAINT [PK_T] PRIMARY KEY NONCLUSTERED ([Id])");
    }

    #[test]
    fn drop_table_if_exists_before_and_after_2016() {
        let expression = DeleteTable::new("T").if_exists();
        assert_eq!(
            generate(SqlServerVersion::V2016, expression.clone()),
            "DROP TABLE IF EXISTS [dbo].[T]"
        );
        assert_eq!(
            generate(SqlServerVersion::V2014, expression),
            "IF OBJECT_ID(N'[dbo].[T]', N'U') IS NOT NULL DROP TABLE [dbo].[T]"
        );
    }

    #[test]
    fn sequences_from_2012() {
        let expression = CreateSequence::new(
            SequenceDefinition::new("OrderNumbers").start_with(1000).increment_by(1),
        );
        assert_eq!(
            generate(SqlServerVersion::V2012, expression.clone()),
            "CREATE SEQUENCE [dbo].[OrderNumbers] INCREMENT BY 1 START WITH 1000"
        );
        assert!(SqlServerGenerator::new(SqlServerVersion::V2008, GeneratorOptions::strict())
            .generate(&expression.into())
            .is_err());
    }

    #[test]
    fn identity_insert_wraps_rows() {
        let sql = generate(
            SqlServerVersion::V2008,
            InsertData::new("T")
                .row(DataRow::new().with("Id", 1).with("Name", "Just'in"))
                .feature(features::IDENTITY_INSERT, true),
        );
        assert_eq!(
            sql,
            "SET IDENTITY_INSERT [dbo].[T] ON;\n\
             INSERT INTO [dbo].[T] ([Id], [Name]) VALUES (1, N'Just''in');\n\
             SET IDENTITY_INSERT [dbo].[T] OFF"
        );
    }

    #[test]
    fn table_description_on_create() {
        let sql = generate(
            SqlServerVersion::V2005,
            CreateTable::new("T")
                .description("Things")
                .column(ColumnDefinition::new("Id", DbType::Int32)),
        );
        assert!(sql.ends_with(
            ";\nEXEC sys.sp_addextendedproperty @name = N'MS_Description', @value = N'Things', \
             @level0type = N'SCHEMA', @level0name = N'dbo', @level1type = N'TABLE', @level1name = N'T'"
        ));
    }

    #[test]
    fn restrict_is_degraded() {
        use crate::definition::ForeignKeyDefinition;
        let expression = CreateForeignKey::new(
            ForeignKeyDefinition::new("FK_A_B")
                .from_table("A")
                .foreign_columns(&["BId"])
                .to_table("B")
                .primary_columns(&["Id"])
                .on_delete(ReferentialAction::Restrict)
                .on_update(ReferentialAction::Cascade),
        );
        assert_eq!(
            generate(SqlServerVersion::V2008, expression),
            "ALTER TABLE [dbo].[A] ADD CONSTRAINT [FK_A_B] FOREIGN KEY ([BId]) REFERENCES [dbo].[B] ([Id]) ON UPDATE CASCADE"
        );
    }
}
