use std::collections::BTreeMap;

use crate::definition::DbType;
use crate::error::{MigrationError, Result};

#[derive(Debug, Clone, PartialEq)]
struct TypeEntry {
    capacity: Option<u32>,
    template: String,
}

/// Abstract column types to dialect type text.
///
/// Each type may have one unbounded entry, used when no size is requested,
/// and any number of entries bounded by a capacity. A requested size picks
/// the smallest capacity that holds it, or the largest when none does.
/// Templates may reference `$size` and `$precision`; a missing precision
/// renders as 0.
#[derive(Debug, Clone)]
pub struct TypeMap {
    dialect: &'static str,
    entries: BTreeMap<DbType, Vec<TypeEntry>>,
}

impl TypeMap {
    pub fn new(dialect: &'static str) -> Self {
        Self {
            dialect,
            entries: BTreeMap::new(),
        }
    }

    /// Registers the unbounded entry, replacing any earlier one.
    pub fn set(&mut self, db_type: DbType, template: impl Into<String>) -> &mut Self {
        self.insert(db_type, None, template.into())
    }

    /// Registers an entry for sizes up to `capacity`.
    pub fn set_sized(
        &mut self,
        db_type: DbType,
        capacity: u32,
        template: impl Into<String>,
    ) -> &mut Self {
        self.insert(db_type, Some(capacity), template.into())
    }

    fn insert(&mut self, db_type: DbType, capacity: Option<u32>, template: String) -> &mut Self {
        let entries = self.entries.entry(db_type).or_default();
        entries.retain(|e| e.capacity != capacity);
        entries.push(TypeEntry { capacity, template });
        entries.sort_by_key(|e| e.capacity);
        self
    }

    pub fn contains(&self, db_type: DbType) -> bool {
        self.entries.contains_key(&db_type)
    }

    pub fn get(&self, db_type: DbType, size: Option<u32>, precision: Option<u32>) -> Result<String> {
        let missing = || MigrationError::MissingTypeMap {
            dialect: self.dialect,
            db_type: db_type.to_string(),
            size,
        };
        let entries = self.entries.get(&db_type).ok_or_else(missing)?;

        let entry = match size {
            None => entries.iter().find(|e| e.capacity.is_none()),
            Some(size) => entries
                .iter()
                .find(|e| e.capacity.is_some_and(|capacity| size <= capacity))
                .or_else(|| entries.iter().rev().find(|e| e.capacity.is_some()))
                .or_else(|| entries.iter().find(|e| e.capacity.is_none())),
        }
        .ok_or_else(missing)?;

        Ok(render(&entry.template, size, precision))
    }
}

fn render(template: &str, size: Option<u32>, precision: Option<u32>) -> String {
    let mut text = template.to_string();
    if let Some(size) = size {
        text = text.replace("$size", &size.to_string());
    }
    text.replace("$precision", &precision.unwrap_or(0).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings() -> TypeMap {
        let mut map = TypeMap::new("test");
        map.set(DbType::String, "NVARCHAR(255)")
            .set_sized(DbType::String, 4000, "NVARCHAR($size)")
            .set_sized(DbType::String, 255, "NCHAR VARYING($size)")
            .set_sized(DbType::String, u32::MAX, "NVARCHAR(MAX)")
            .set(DbType::Decimal, "DECIMAL(19,5)")
            .set_sized(DbType::Decimal, 38, "DECIMAL($size,$precision)");
        map
    }

    #[test]
    fn smallest_holding_capacity_wins() {
        let map = strings();
        assert_eq!(map.get(DbType::String, Some(100), None).unwrap(), "NCHAR VARYING(100)");
        assert_eq!(map.get(DbType::String, Some(300), None).unwrap(), "NVARCHAR(300)");
        assert_eq!(map.get(DbType::String, Some(4000), None).unwrap(), "NVARCHAR(4000)");
        assert_eq!(map.get(DbType::String, Some(5000), None).unwrap(), "NVARCHAR(MAX)");
    }

    #[test]
    fn no_size_uses_unbounded_entry() {
        assert_eq!(strings().get(DbType::String, None, None).unwrap(), "NVARCHAR(255)");
    }

    #[test]
    fn oversized_request_falls_back_to_largest() {
        let mut map = TypeMap::new("test");
        map.set_sized(DbType::Binary, 8000, "VARBINARY($size)");
        assert_eq!(map.get(DbType::Binary, Some(9000), None).unwrap(), "VARBINARY(9000)");
    }

    #[test]
    fn precision_is_substituted() {
        assert_eq!(
            strings().get(DbType::Decimal, Some(10), Some(2)).unwrap(),
            "DECIMAL(10,2)"
        );
        assert_eq!(strings().get(DbType::Decimal, None, None).unwrap(), "DECIMAL(19,5)");
    }

    #[test]
    fn missing_precision_defaults_to_zero() {
        assert_eq!(
            strings().get(DbType::Decimal, Some(10), None).unwrap(),
            "DECIMAL(10,0)"
        );
    }

    #[test]
    fn missing_mapping_fails_at_lookup() {
        let err = strings().get(DbType::Xml, None, None).unwrap_err();
        assert!(matches!(err, MigrationError::MissingTypeMap { .. }));
        assert_eq!(err.to_string(), "No type mapping for Xml (size None) in test");
    }

    #[test]
    fn later_registration_replaces_same_capacity() {
        let mut map = strings();
        map.set(DbType::String, "TEXT");
        assert_eq!(map.get(DbType::String, None, None).unwrap(), "TEXT");
    }
}
