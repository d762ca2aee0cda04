use rusqlite::types::ValueRef;
use rusqlite::Connection;
use sea_query::{QueryStatementWriter, SqliteQueryBuilder};
use sluice::prelude::*;
use sluice::processor::select_all_query;

/// Drives an in-memory database through the public `Processor` seam.
struct MemoryProcessor {
    conn: Connection,
    generator: SqliteGenerator,
}

impl MemoryProcessor {
    fn new() -> Self {
        Self::with_options(GeneratorOptions::default())
    }

    fn with_options(options: GeneratorOptions) -> Self {
        Self {
            conn: Connection::open_in_memory().unwrap(),
            generator: SqliteGenerator::new(options),
        }
    }

    fn table_exists(&self, table: &str) -> bool {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get::<_, i64>(0),
            )
            .unwrap()
            > 0
    }

    fn index_exists(&self, index: &str) -> bool {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = ?1",
                [index],
                |row| row.get::<_, i64>(0),
            )
            .unwrap()
            > 0
    }

    fn names(&self) -> Vec<String> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM people ORDER BY id")
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<Vec<String>>>()
            .unwrap()
    }
}

impl Processor for MemoryProcessor {
    fn generator(&self) -> &dyn Generator {
        &self.generator
    }

    fn execute(&mut self, sql: &str) -> Result<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| MigrationError::Processor(e.to_string()))
    }

    fn read_table_data(&mut self, schema: Option<&str>, table: &str) -> Result<Vec<DataRow>> {
        let sql = select_all_query(schema, table).to_string(SqliteQueryBuilder);
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| MigrationError::Processor(e.to_string()))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
        let rows = stmt
            .query_map([], |row| {
                let mut data = DataRow::new();
                for (index, column) in columns.iter().enumerate() {
                    let value = match row.get_ref(index)? {
                        ValueRef::Null => Value::Null,
                        ValueRef::Integer(v) => Value::Int(v),
                        ValueRef::Real(v) => Value::Float(v),
                        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
                        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
                    };
                    data.push(column.clone(), value);
                }
                Ok(data)
            })
            .map_err(|e| MigrationError::Processor(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| MigrationError::Processor(e.to_string()))?;
        Ok(rows)
    }

    fn process_perform_db_operation(&mut self, expression: &PerformDbOperation) -> Result<()> {
        expression.run(self)
    }
}

fn people_migration() -> Migration {
    Migration::new(1, "create people")
        .expression(
            CreateTable::new("people")
                .column(ColumnDefinition::new("id", DbType::Int32).identity().primary_key())
                .column(ColumnDefinition::new("name", DbType::String).size(100))
                .column(
                    ColumnDefinition::new("active", DbType::Boolean)
                        .default(true),
                ),
        )
        .expression(CreateIndex::new(
            IndexDefinition::new("ix_people_name", "people").column("name"),
        ))
}

#[test]
fn migration_up_and_down() {
    let mut processor = MemoryProcessor::new();
    let migration = people_migration();

    migration.run_up(&mut processor).unwrap();
    assert!(processor.table_exists("people"));
    assert!(processor.index_exists("ix_people_name"));

    migration.run_down(&mut processor).unwrap();
    assert!(!processor.table_exists("people"));
    assert!(!processor.index_exists("ix_people_name"));
}

#[test]
fn inserted_quotes_survive_the_round_trip() {
    let mut processor = MemoryProcessor::new();
    people_migration().run_up(&mut processor).unwrap();

    let insert: Expression = InsertData::new("people")
        .row(DataRow::new().with("name", "Just'in"))
        .row(DataRow::new().with("name", "Ada"))
        .into();
    insert.execute_with(&mut processor).unwrap();

    assert_eq!(processor.names(), vec!["Just'in", "Ada"]);
    let active: i64 = processor
        .conn
        .query_row("SELECT active FROM people WHERE name = 'Ada'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(active, 1);
}

#[test]
fn delete_data_matches_rows() {
    let mut processor = MemoryProcessor::new();
    people_migration().run_up(&mut processor).unwrap();
    let insert: Expression = InsertData::new("people")
        .row(DataRow::new().with("id", 1).with("name", "Ada"))
        .row(DataRow::new().with("id", 2).with("name", "Grace"))
        .into();
    insert.execute_with(&mut processor).unwrap();

    let delete: Expression = DeleteData::new("people")
        .row(DataRow::new().with("name", "Ada"))
        .into();
    delete.execute_with(&mut processor).unwrap();
    assert_eq!(processor.names(), vec!["Grace"]);
}

#[test]
fn merge_updates_existing_and_inserts_missing() {
    let mut processor = MemoryProcessor::new();
    people_migration().run_up(&mut processor).unwrap();
    let seed: Expression = InsertData::new("people")
        .row(DataRow::new().with("id", 1).with("name", "Ada"))
        .into();
    seed.execute_with(&mut processor).unwrap();

    let merge: Expression = MergeData::new("people")
        .row(DataRow::new().with("id", 1).with("name", "Ada Lovelace"))
        .row(DataRow::new().with("id", 2).with("name", "Grace Hopper"))
        .match_on(&["id"])
        .into();
    merge.execute_with(&mut processor).unwrap();

    assert_eq!(processor.names(), vec!["Ada Lovelace", "Grace Hopper"]);
}

#[test]
fn unique_constraint_rejects_duplicates() {
    let mut processor = MemoryProcessor::new();
    people_migration().run_up(&mut processor).unwrap();
    let constraint: Expression = CreateConstraint::new(
        ConstraintDefinition::unique("people")
            .named("UC_people_name")
            .column("name"),
    )
    .into();
    constraint.execute_with(&mut processor).unwrap();

    let insert: Expression = InsertData::new("people")
        .row(DataRow::new().with("name", "Ada"))
        .into();
    insert.execute_with(&mut processor).unwrap();
    assert!(insert.execute_with(&mut processor).is_err());
}

#[test]
fn loose_mode_skips_what_sqlite_cannot_do() {
    let mut processor = MemoryProcessor::new();
    people_migration().run_up(&mut processor).unwrap();

    let rename: Expression = RenameColumn::new("people", "name", "full_name").into();
    rename.execute_with(&mut processor).unwrap();
    let schema: Expression = CreateSchema::new("crm").into();
    schema.execute_with(&mut processor).unwrap();

    assert_eq!(processor.names(), Vec::<String>::new());
}

#[test]
fn strict_mode_fails_before_touching_the_database() {
    let mut processor = MemoryProcessor::with_options(GeneratorOptions::strict());
    people_migration().run_up(&mut processor).unwrap();

    let rename: Expression = RenameColumn::new("people", "name", "full_name").into();
    let err = rename.execute_with(&mut processor).unwrap_err();
    assert_eq!(err.to_string(), "Renaming columns is not supported by sqlite");
}

#[test]
fn table_rename_and_new_column() {
    let mut processor = MemoryProcessor::new();
    people_migration().run_up(&mut processor).unwrap();

    let migration = Migration::new(2, "rename people")
        .expression(RenameTable::new("people", "persons"))
        .expression(CreateColumn::new(
            "persons",
            ColumnDefinition::new("email", DbType::String).nullable(),
        ));
    migration.run_up(&mut processor).unwrap();
    assert!(processor.table_exists("persons"));
    let count: i64 = processor
        .conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info('persons') WHERE name = 'email'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1);

    migration.run_down(&mut processor).unwrap();
    assert!(processor.table_exists("people"));
}

#[test]
fn db_operation_uses_the_processor() {
    let mut processor = MemoryProcessor::new();
    people_migration().run_up(&mut processor).unwrap();

    let operation: Expression = PerformDbOperation::new("seed", |p| {
        p.execute("INSERT INTO people (name) VALUES ('seeded')")
    })
    .into();
    operation.execute_with(&mut processor).unwrap();
    assert_eq!(processor.names(), vec!["seeded"]);
}

#[cfg(feature = "sqlite")]
mod feature_processor {
    use super::*;

    #[test]
    fn sqlite_processor_reads_rows_for_merges() {
        let mut processor = SqliteProcessor::new(Connection::open_in_memory().unwrap());
        people_migration().run_up(&mut processor).unwrap();

        let merge: Expression = MergeData::new("people")
            .row(DataRow::new().with("id", 7).with("name", "Barbara"))
            .match_on(&["id"])
            .into();
        merge.execute_with(&mut processor).unwrap();
        merge.execute_with(&mut processor).unwrap();

        let rows = processor.read_table_data(None, "people").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&Value::from("Barbara")));
    }
}
