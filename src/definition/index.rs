use crate::definition::features::{self, AdditionalFeatures};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexOrder {
    #[default]
    Asc,
    Desc,
}

impl IndexOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            IndexOrder::Asc => "ASC",
            IndexOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexColumn {
    pub name: String,
    pub order: IndexOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    pub name: String,
    pub schema_name: Option<String>,
    pub table_name: String,
    pub unique: bool,
    pub clustered: bool,
    pub columns: Vec<IndexColumn>,
    pub features: AdditionalFeatures,
}

impl IndexDefinition {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema_name: None,
            table_name: table.into(),
            unique: false,
            clustered: false,
            columns: Vec::new(),
            features: AdditionalFeatures::new(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    pub fn column(self, name: impl Into<String>) -> Self {
        self.column_with_order(name, IndexOrder::Asc)
    }

    pub fn column_desc(self, name: impl Into<String>) -> Self {
        self.column_with_order(name, IndexOrder::Desc)
    }

    pub fn column_with_order(mut self, name: impl Into<String>, order: IndexOrder) -> Self {
        self.columns.push(IndexColumn {
            name: name.into(),
            order,
        });
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn clustered(mut self) -> Self {
        self.clustered = true;
        self
    }

    pub fn include(mut self, column: impl Into<String>) -> Self {
        self.features.push(features::INCLUDES, column);
        self
    }

    pub fn filter(mut self, predicate: impl Into<String>) -> Self {
        self.features.set(features::FILTER, predicate.into());
        self
    }

    pub fn online(mut self) -> Self {
        self.features.set(features::ONLINE, true);
        self
    }

    pub fn includes(&self) -> Vec<String> {
        self.features.list(features::INCLUDES)
    }

    pub fn filter_predicate(&self) -> Option<&str> {
        self.features.text(features::FILTER)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
