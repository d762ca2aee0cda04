use crate::generator::{DescriptionGenerator, Quoter};

use super::quoter::SqlServerQuoter;
use super::SqlServerVersion;

const PROPERTY: &str = "MS_Description";

/// Descriptions stored as `MS_Description` extended properties. 2000 has
/// no `sys` procedures and drops them.
#[derive(Debug, Clone, Copy)]
pub struct ExtendedPropertyDescriptions {
    version: SqlServerVersion,
    quoter: SqlServerQuoter,
}

impl ExtendedPropertyDescriptions {
    pub fn new(version: SqlServerVersion) -> Self {
        Self {
            version,
            quoter: SqlServerQuoter::new(version),
        }
    }

    fn enabled(&self) -> bool {
        self.version >= SqlServerVersion::V2005
    }

    /// `@level0type = N'SCHEMA', @level0name = N'dbo', ...`
    fn levels(&self, schema: Option<&str>, table: &str, column: Option<&str>) -> String {
        let schema = schema.filter(|s| !s.is_empty()).unwrap_or("dbo");
        let mut levels = format!(
            "@level0type = N'SCHEMA', @level0name = {}, @level1type = N'TABLE', @level1name = {}",
            self.quoter.format_string(schema),
            self.quoter.format_string(table)
        );
        if let Some(column) = column {
            levels.push_str(&format!(
                ", @level2type = N'COLUMN', @level2name = {}",
                self.quoter.format_string(column)
            ));
        }
        levels
    }

    fn add(&self, levels: &str, description: &str) -> String {
        format!(
            "EXEC sys.sp_addextendedproperty @name = N'{}', @value = {}, {}",
            PROPERTY,
            self.quoter.format_string(description),
            levels
        )
    }

    /// Drops the property only when `fn_listextendedproperty` finds it.
    fn drop_if_exists(&self, schema: Option<&str>, table: &str, column: Option<&str>) -> String {
        let schema = schema.filter(|s| !s.is_empty()).unwrap_or("dbo");
        let (column_type, column_name) = match column {
            Some(column) => ("N'COLUMN'".to_string(), self.quoter.format_string(column)),
            None => ("NULL".to_string(), "NULL".to_string()),
        };
        format!(
            "IF EXISTS (SELECT * FROM fn_listextendedproperty(N'{}', N'SCHEMA', {}, N'TABLE', {}, {}, {}))\n    EXEC sys.sp_dropextendedproperty @name = N'{}', {}",
            PROPERTY,
            self.quoter.format_string(schema),
            self.quoter.format_string(table),
            column_type,
            column_name,
            PROPERTY,
            self.levels(Some(schema), table, column)
        )
    }

    fn replace(
        &self,
        schema: Option<&str>,
        table: &str,
        column: Option<&str>,
        description: &str,
    ) -> Vec<String> {
        if !self.enabled() {
            return Vec::new();
        }
        vec![
            self.drop_if_exists(schema, table, column),
            self.add(&self.levels(schema, table, column), description),
        ]
    }
}

impl DescriptionGenerator for ExtendedPropertyDescriptions {
    fn table_description(
        &self,
        schema: Option<&str>,
        table: &str,
        description: &str,
    ) -> Option<String> {
        self.enabled()
            .then(|| self.add(&self.levels(schema, table, None), description))
    }

    fn column_description(
        &self,
        schema: Option<&str>,
        table: &str,
        column: &str,
        description: &str,
    ) -> Option<String> {
        self.enabled()
            .then(|| self.add(&self.levels(schema, table, Some(column)), description))
    }

    fn alter_table_description(
        &self,
        schema: Option<&str>,
        table: &str,
        description: &str,
    ) -> Vec<String> {
        self.replace(schema, table, None, description)
    }

    fn alter_column_description(
        &self,
        schema: Option<&str>,
        table: &str,
        column: &str,
        description: &str,
    ) -> Vec<String> {
        self.replace(schema, table, Some(column), description)
    }
}
