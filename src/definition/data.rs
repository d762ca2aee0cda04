use crate::value::Value;

/// One row of `(column, value)` pairs in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataRow(Vec<(String, Value)>);

impl DataRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.push((column.into(), value.into()));
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(c, _)| c.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pairs whose column is not in `exclude`, order preserved.
    pub fn without(&self, exclude: &[String]) -> DataRow {
        self.0
            .iter()
            .filter(|(c, _)| !exclude.contains(c))
            .cloned()
            .collect()
    }

    /// Pairs whose column is in `keep`, in the order of `keep`.
    pub fn only(&self, keep: &[String]) -> DataRow {
        keep.iter()
            .filter_map(|c| self.get(c).map(|v| (c.clone(), v.clone())))
            .collect()
    }
}

impl FromIterator<(String, Value)> for DataRow {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        DataRow(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> DataRow {
        DataRow::new()
            .with("id", 1)
            .with("name", "Justin")
            .with("email", Value::Null)
    }

    #[test]
    fn preserves_declaration_order() {
        assert_eq!(row().columns().collect::<Vec<_>>(), vec!["id", "name", "email"]);
    }

    #[test]
    fn get_by_column() {
        assert_eq!(row().get("name"), Some(&Value::String("Justin".to_string())));
        assert_eq!(row().get("missing"), None);
    }

    #[test]
    fn without_and_only() {
        let keys = vec!["id".to_string()];
        assert_eq!(row().without(&keys).columns().collect::<Vec<_>>(), vec!["name", "email"]);
        assert_eq!(row().only(&keys).columns().collect::<Vec<_>>(), vec!["id"]);
    }
}
