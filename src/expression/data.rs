use crate::definition::{AdditionalFeatures, DataRow};
use crate::error::{MigrationError, Result};
use crate::expression::{require, Expression, MigrationExpression};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct InsertData {
    pub schema_name: Option<String>,
    pub table_name: String,
    pub rows: Vec<DataRow>,
    pub features: AdditionalFeatures,
}

impl InsertData {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            schema_name: None,
            table_name: table_name.into(),
            rows: Vec::new(),
            features: AdditionalFeatures::new(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    pub fn row(mut self, row: DataRow) -> Self {
        self.rows.push(row);
        self
    }

    pub fn feature(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.features.set(key, value);
        self
    }
}

impl MigrationExpression for InsertData {
    fn kind(&self) -> &'static str {
        "InsertData"
    }

    fn describe(&self) -> String {
        format!("Insert {} row(s) into {}", self.rows.len(), self.table_name)
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.table_name, "The table name cannot be empty");
    }

    fn reverse(&self) -> Result<Expression> {
        Ok(DeleteData {
            schema_name: self.schema_name.clone(),
            table_name: self.table_name.clone(),
            rows: self.rows.iter().rev().cloned().collect(),
            all_rows: false,
        }
        .into())
    }
}

/// Deletes every row matching one of `rows`, or the whole table when
/// `all_rows` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteData {
    pub schema_name: Option<String>,
    pub table_name: String,
    pub rows: Vec<DataRow>,
    pub all_rows: bool,
}

impl DeleteData {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            schema_name: None,
            table_name: table_name.into(),
            rows: Vec::new(),
            all_rows: false,
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    pub fn row(mut self, row: DataRow) -> Self {
        self.rows.push(row);
        self
    }

    pub fn all_rows(mut self) -> Self {
        self.all_rows = true;
        self
    }
}

impl MigrationExpression for DeleteData {
    fn kind(&self) -> &'static str {
        "DeleteData"
    }

    fn describe(&self) -> String {
        if self.all_rows {
            format!("Delete all rows from {}", self.table_name)
        } else {
            format!("Delete {} row(s) from {}", self.rows.len(), self.table_name)
        }
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.table_name, "The table name cannot be empty");
        if !self.all_rows && self.rows.is_empty() {
            errors.push("A delete must either match rows or affect all rows".to_string());
        }
    }

    fn reverse(&self) -> Result<Expression> {
        if self.all_rows || self.rows.is_empty() {
            return Err(MigrationError::Irreversible(self.kind()));
        }
        Ok(InsertData {
            schema_name: self.schema_name.clone(),
            table_name: self.table_name.clone(),
            rows: self.rows.iter().rev().cloned().collect(),
            features: AdditionalFeatures::new(),
        }
        .into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateData {
    pub schema_name: Option<String>,
    pub table_name: String,
    pub set: DataRow,
    pub filter: DataRow,
    pub all_rows: bool,
}

impl UpdateData {
    pub fn new(table_name: impl Into<String>, set: DataRow) -> Self {
        Self {
            schema_name: None,
            table_name: table_name.into(),
            set,
            filter: DataRow::new(),
            all_rows: false,
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    pub fn filter(mut self, filter: DataRow) -> Self {
        self.filter = filter;
        self
    }

    pub fn all_rows(mut self) -> Self {
        self.all_rows = true;
        self
    }
}

impl MigrationExpression for UpdateData {
    fn kind(&self) -> &'static str {
        "UpdateData"
    }

    fn describe(&self) -> String {
        format!("Update {}", self.table_name)
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.table_name, "The table name cannot be empty");
        if self.set.is_empty() {
            errors.push("An update must set at least one column".to_string());
        }
        match (self.filter.is_empty(), self.all_rows) {
            (true, false) => errors
                .push("An update must have either a WHERE clause or affect all rows".to_string()),
            (false, true) => errors
                .push("An update cannot have both a WHERE clause and affect all rows".to_string()),
            _ => {}
        }
    }
}

/// Upsert resolved against the rows already in the table: a row whose match
/// columns equal an existing row's becomes an update, anything else an insert.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeData {
    pub schema_name: Option<String>,
    pub table_name: String,
    pub rows: Vec<DataRow>,
    pub match_columns: Vec<String>,
    pub features: AdditionalFeatures,
}

impl MergeData {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            schema_name: None,
            table_name: table_name.into(),
            rows: Vec::new(),
            match_columns: Vec::new(),
            features: AdditionalFeatures::new(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    pub fn row(mut self, row: DataRow) -> Self {
        self.rows.push(row);
        self
    }

    pub fn match_on(mut self, columns: &[&str]) -> Self {
        self.match_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn feature(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.features.set(key, value);
        self
    }

    /// Turns each incoming row into an update or an insert. Rows whose only
    /// columns are match columns produce nothing when they already exist.
    pub fn resolve(&self, existing: &[DataRow]) -> Vec<Expression> {
        let mut resolved = Vec::new();
        for row in &self.rows {
            let matched = existing.iter().any(|current| self.is_match(row, current));
            if matched {
                let set = row.without(&self.match_columns);
                if set.is_empty() {
                    continue;
                }
                resolved.push(
                    UpdateData {
                        schema_name: self.schema_name.clone(),
                        table_name: self.table_name.clone(),
                        set,
                        filter: self.match_filter(row),
                        all_rows: false,
                    }
                    .into(),
                );
            } else {
                resolved.push(
                    InsertData {
                        schema_name: self.schema_name.clone(),
                        table_name: self.table_name.clone(),
                        rows: vec![row.clone()],
                        features: self.features.clone(),
                    }
                    .into(),
                );
            }
        }
        resolved
    }

    fn is_match(&self, row: &DataRow, current: &DataRow) -> bool {
        self.match_columns.iter().all(|column| {
            let incoming = row.get(column).unwrap_or(&Value::Null);
            let stored = current.get(column).unwrap_or(&Value::Null);
            incoming.matches(stored)
        })
    }

    fn match_filter(&self, row: &DataRow) -> DataRow {
        self.match_columns
            .iter()
            .map(|column| {
                (
                    column.clone(),
                    row.get(column).cloned().unwrap_or(Value::Null),
                )
            })
            .collect()
    }
}

impl MigrationExpression for MergeData {
    fn kind(&self) -> &'static str {
        "MergeData"
    }

    fn describe(&self) -> String {
        format!(
            "Merge {} row(s) into {} on {}",
            self.rows.len(),
            self.table_name,
            self.match_columns.join(", ")
        )
    }

    fn collect_validation_errors(&self, errors: &mut Vec<String>) {
        require(errors, &self.table_name, "The table name cannot be empty");
        if self.match_columns.is_empty() {
            errors.push("A merge must have at least one match column".to_string());
        }
    }
}
