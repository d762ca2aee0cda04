#[derive(Debug, Clone, PartialEq, Default)]
pub struct SequenceDefinition {
    pub name: String,
    pub schema_name: Option<String>,
    pub increment: Option<i64>,
    pub min_value: Option<i64>,
    pub max_value: Option<i64>,
    pub start_with: Option<i64>,
    pub cache: Option<i64>,
    pub cycle: bool,
}

impl SequenceDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema_name = Some(schema.into());
        self
    }

    pub fn increment_by(mut self, increment: i64) -> Self {
        self.increment = Some(increment);
        self
    }

    pub fn min_value(mut self, value: i64) -> Self {
        self.min_value = Some(value);
        self
    }

    pub fn max_value(mut self, value: i64) -> Self {
        self.max_value = Some(value);
        self
    }

    pub fn start_with(mut self, value: i64) -> Self {
        self.start_with = Some(value);
        self
    }

    pub fn cache(mut self, size: i64) -> Self {
        self.cache = Some(size);
        self
    }

    pub fn cycle(mut self) -> Self {
        self.cycle = true;
        self
    }
}
