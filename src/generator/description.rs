use crate::expression::CreateTable;
use crate::generator::quoter::Quoter;

/// Statements attaching descriptions to tables and columns. Dialects with
/// nowhere to store them keep the provided methods, which drop the text.
pub trait DescriptionGenerator: Send + Sync {
    fn table_description(
        &self,
        _schema: Option<&str>,
        _table: &str,
        _description: &str,
    ) -> Option<String> {
        None
    }

    fn column_description(
        &self,
        _schema: Option<&str>,
        _table: &str,
        _column: &str,
        _description: &str,
    ) -> Option<String> {
        None
    }

    fn alter_table_description(
        &self,
        schema: Option<&str>,
        table: &str,
        description: &str,
    ) -> Vec<String> {
        self.table_description(schema, table, description)
            .into_iter()
            .collect()
    }

    fn alter_column_description(
        &self,
        schema: Option<&str>,
        table: &str,
        column: &str,
        description: &str,
    ) -> Vec<String> {
        self.column_description(schema, table, column, description)
            .into_iter()
            .collect()
    }

    /// The table's description followed by each described column's.
    fn create_table_descriptions(&self, expression: &CreateTable) -> Vec<String> {
        let schema = expression.schema_name.as_deref();
        let table = expression.table_name.as_str();
        let mut statements = Vec::new();

        if let Some(description) = non_empty(expression.description.as_deref()) {
            statements.extend(self.table_description(schema, table, description));
        }
        for column in &expression.columns {
            if let Some(description) = non_empty(column.description.as_deref()) {
                statements.extend(self.column_description(schema, table, &column.name, description));
            }
        }
        statements
    }
}

pub(crate) fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.is_empty())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoDescriptions;

impl DescriptionGenerator for NoDescriptions {}

/// `COMMENT ON TABLE` / `COMMENT ON COLUMN`.
#[derive(Debug, Clone, Default)]
pub struct CommentDescriptions<Q> {
    quoter: Q,
}

impl<Q: Quoter> CommentDescriptions<Q> {
    pub fn new(quoter: Q) -> Self {
        Self { quoter }
    }
}

impl<Q: Quoter> DescriptionGenerator for CommentDescriptions<Q> {
    fn table_description(
        &self,
        schema: Option<&str>,
        table: &str,
        description: &str,
    ) -> Option<String> {
        Some(format!(
            "COMMENT ON TABLE {} IS {}",
            self.quoter.quote_table_name(table, schema),
            self.quoter.format_string(description)
        ))
    }

    fn column_description(
        &self,
        schema: Option<&str>,
        table: &str,
        column: &str,
        description: &str,
    ) -> Option<String> {
        Some(format!(
            "COMMENT ON COLUMN {}.{} IS {}",
            self.quoter.quote_table_name(table, schema),
            self.quoter.quote_column_name(column),
            self.quoter.format_string(description)
        ))
    }
}
