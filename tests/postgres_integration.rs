//! PostgreSQL integration tests
//!
//! These tests require a running PostgreSQL instance. They are ignored by default.
//! To run them:
//!
//! ```sh
//! # Set environment variables (optional, defaults shown)
//! export POSTGRES_HOST=localhost
//! export POSTGRES_USER=postgres
//! export POSTGRES_PASSWORD=postgres
//! export POSTGRES_DB=sluice_test
//!
//! # Run the ignored tests
//! cargo test --features postgres --test postgres_integration -- --ignored
//! ```

#![cfg(feature = "postgres")]

use postgres::{Client, NoTls};
use sluice::prelude::*;
use std::env;

fn get_test_client() -> Option<Client> {
    let host = env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string());
    let user = env::var("POSTGRES_USER").unwrap_or_else(|_| "postgres".to_string());
    let password = env::var("POSTGRES_PASSWORD").unwrap_or_else(|_| "postgres".to_string());
    let dbname = env::var("POSTGRES_DB").unwrap_or_else(|_| "sluice_test".to_string());

    let config = format!(
        "host={} user={} password={} dbname={}",
        host, user, password, dbname
    );

    Client::connect(&config, NoTls).ok()
}

fn cleanup_tables(client: &mut Client) {
    let _ = client.execute("DROP TABLE IF EXISTS orders CASCADE", &[]);
    let _ = client.execute("DROP TABLE IF EXISTS customers CASCADE", &[]);
    let _ = client.execute("DROP SEQUENCE IF EXISTS invoice_numbers", &[]);
}

fn processor() -> Option<PostgresProcessor> {
    let mut client = get_test_client()?;
    cleanup_tables(&mut client);
    Some(PostgresProcessor::new(client))
}

fn customers_and_orders() -> Migration {
    Migration::new(1, "customers and orders")
        .expression(
            CreateTable::new("customers")
                .description("People who buy things")
                .column(ColumnDefinition::new("id", DbType::Int32).identity().primary_key())
                .column(
                    ColumnDefinition::new("email", DbType::String)
                        .size(200)
                        .description("Login address"),
                ),
        )
        .expression(
            CreateTable::new("orders")
                .column(ColumnDefinition::new("id", DbType::Int32).identity().primary_key())
                .column(ColumnDefinition::new("customer_id", DbType::Int32))
                .column(ColumnDefinition::new("status", DbType::String).size(20).default("new")),
        )
        .expression(CreateForeignKey::new(
            ForeignKeyDefinition::new("fk_orders_customers")
                .from_table("orders")
                .foreign_columns(&["customer_id"])
                .to_table("customers")
                .primary_columns(&["id"])
                .on_delete(ReferentialAction::Cascade),
        ))
        .expression(CreateIndex::new(
            IndexDefinition::new("ix_orders_open", "orders")
                .column("customer_id")
                .filter("status <> 'closed'"),
        ))
}

fn table_exists(processor: &mut PostgresProcessor, table: &str) -> bool {
    let row = processor
        .client()
        .query_one(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = 'public' AND table_name = $1",
            &[&table],
        )
        .unwrap();
    row.get::<_, i64>(0) > 0
}

#[test]
#[ignore = "requires postgres connection"]
fn migration_up_and_down() {
    let Some(mut processor) = processor() else {
        eprintln!("Skipping test: could not connect to PostgreSQL");
        return;
    };

    let migration = customers_and_orders();
    migration.run_up(&mut processor).unwrap();
    assert!(table_exists(&mut processor, "customers"));
    assert!(table_exists(&mut processor, "orders"));

    let comment: Option<String> = processor
        .client()
        .query_one("SELECT obj_description('public.customers'::regclass)", &[])
        .unwrap()
        .get(0);
    assert_eq!(comment.as_deref(), Some("People who buy things"));

    migration.run_down(&mut processor).unwrap();
    assert!(!table_exists(&mut processor, "orders"));
    assert!(!table_exists(&mut processor, "customers"));
}

#[test]
#[ignore = "requires postgres connection"]
fn cascade_delete_follows_foreign_key() {
    let Some(mut processor) = processor() else {
        eprintln!("Skipping test: could not connect to PostgreSQL");
        return;
    };
    customers_and_orders().run_up(&mut processor).unwrap();

    let seed = Migration::new(2, "seed")
        .expression(
            InsertData::new("customers")
                .row(DataRow::new().with("email", "ada@example.com")),
        )
        .expression(InsertData::new("orders").row(DataRow::new().with("customer_id", 1)));
    seed.run_up(&mut processor).unwrap();

    let delete: Expression = DeleteData::new("customers").all_rows().into();
    delete.execute_with(&mut processor).unwrap();

    let remaining: i64 = processor
        .client()
        .query_one("SELECT COUNT(*) FROM orders", &[])
        .unwrap()
        .get(0);
    assert_eq!(remaining, 0);

    cleanup_tables(processor.client());
}

#[test]
#[ignore = "requires postgres connection"]
fn merge_reads_existing_rows() {
    let Some(mut processor) = processor() else {
        eprintln!("Skipping test: could not connect to PostgreSQL");
        return;
    };
    customers_and_orders().run_up(&mut processor).unwrap();

    let merge: Expression = MergeData::new("customers")
        .row(DataRow::new().with("id", 10).with("email", "grace@example.com"))
        .match_on(&["id"])
        .into();
    merge.execute_with(&mut processor).unwrap();

    let update: Expression = MergeData::new("customers")
        .row(DataRow::new().with("id", 10).with("email", "hopper@example.com"))
        .match_on(&["id"])
        .into();
    update.execute_with(&mut processor).unwrap();

    let rows = processor.read_table_data(None, "customers").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("email"), Some(&Value::from("hopper@example.com")));

    cleanup_tables(processor.client());
}

#[test]
#[ignore = "requires postgres connection"]
fn alter_and_rename_columns() {
    let Some(mut processor) = processor() else {
        eprintln!("Skipping test: could not connect to PostgreSQL");
        return;
    };
    customers_and_orders().run_up(&mut processor).unwrap();

    let migration = Migration::new(3, "widen status")
        .expression(AlterColumn::new(
            "orders",
            ColumnDefinition::new("status", DbType::String).size(50).nullable(),
        ))
        .expression(RenameColumn::new("orders", "status", "state"));
    migration.run_up(&mut processor).unwrap();

    let row = processor
        .client()
        .query_one(
            "SELECT character_maximum_length, is_nullable FROM information_schema.columns \
             WHERE table_name = 'orders' AND column_name = 'state'",
            &[],
        )
        .unwrap();
    assert_eq!(row.get::<_, Option<i32>>(0), Some(50));
    assert_eq!(row.get::<_, String>(1), "YES");

    cleanup_tables(processor.client());
}

#[test]
#[ignore = "requires postgres connection"]
fn sequences_are_created_and_dropped() {
    let Some(mut processor) = processor() else {
        eprintln!("Skipping test: could not connect to PostgreSQL");
        return;
    };

    let migration = Migration::new(4, "invoice numbers").expression(CreateSequence::new(
        SequenceDefinition::new("invoice_numbers")
            .start_with(1000)
            .increment_by(10),
    ));
    migration.run_up(&mut processor).unwrap();

    let next: i64 = processor
        .client()
        .query_one("SELECT nextval('invoice_numbers')", &[])
        .unwrap()
        .get(0);
    assert_eq!(next, 1000);

    migration.run_down(&mut processor).unwrap();
}
