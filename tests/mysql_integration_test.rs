// ABOUTME: Integration tests for SQLite-to-MySQL migration against a live server
// ABOUTME: Requires TEST_MYSQL_HOST, TEST_MYSQL_USER, TEST_MYSQL_PASSWORD and TEST_MYSQL_DATABASE

use mysql_async::prelude::*;
use rusqlite::Connection;
use sqlite_mysql_migrator::migration::{create_table, run_migration, BATCH_SIZE};
use sqlite_mysql_migrator::mysql::{connect_mysql, writer::MysqlTarget, TargetOptions};
use sqlite_mysql_migrator::sqlite::reader::describe_columns;
use std::env;

/// Helper to get test MySQL target options from environment
fn get_test_target() -> Option<TargetOptions> {
    TargetOptions::new(
        &env::var("TEST_MYSQL_HOST").ok()?,
        &env::var("TEST_MYSQL_USER").ok()?,
        &env::var("TEST_MYSQL_PASSWORD").ok()?,
        &env::var("TEST_MYSQL_DATABASE").ok()?,
    )
    .ok()
}

fn create_source(rows: i64) -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE it_products (id INTEGER, name TEXT, price REAL);
         INSERT INTO it_products VALUES (1, 'a', 1.5), (2, 'b', 2.5);
         CREATE TABLE it_events (id INTEGER, kind TEXT DEFAULT 'click');",
    )
    .unwrap();
    for id in 1..=rows {
        conn.execute("INSERT INTO it_events (id) VALUES (?1)", [id])
            .unwrap();
    }
    conn
}

async fn drop_test_tables(options: &TargetOptions) {
    let mut conn = connect_mysql(options).await.unwrap();
    conn.query_drop("DROP TABLE IF EXISTS it_products, it_events")
        .await
        .unwrap();
    conn.disconnect().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_round_trip_into_mysql() {
    let options = get_test_target().expect("TEST_MYSQL_* must be set");
    drop_test_tables(&options).await;

    let source = create_source(0);
    let mut target = MysqlTarget::connect(&options).await.unwrap();
    run_migration(&source, &mut target, BATCH_SIZE).await.unwrap();
    target.disconnect().await.unwrap();

    let mut conn = connect_mysql(&options).await.unwrap();
    let rows: Vec<(i64, String, f64)> = conn
        .query("SELECT id, name, price FROM it_products ORDER BY id")
        .await
        .unwrap();
    assert_eq!(
        rows,
        vec![(1, "a".to_string(), 1.5), (2, "b".to_string(), 2.5)]
    );
    conn.disconnect().await.unwrap();

    drop_test_tables(&options).await;
}

#[tokio::test]
#[ignore]
async fn test_create_table_is_idempotent() {
    let options = get_test_target().expect("TEST_MYSQL_* must be set");
    drop_test_tables(&options).await;

    let source = create_source(0);
    let columns = describe_columns(&source, "it_events").unwrap();
    let mut target = MysqlTarget::connect(&options).await.unwrap();

    create_table(&mut target, "it_events", &columns).await.unwrap();
    create_table(&mut target, "it_events", &columns).await.unwrap();
    target.disconnect().await.unwrap();

    let mut conn = connect_mysql(&options).await.unwrap();
    let described: Vec<(String, String)> = conn
        .query(
            "SELECT COLUMN_NAME, DATA_TYPE FROM INFORMATION_SCHEMA.COLUMNS \
             WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = 'it_events' \
             ORDER BY ORDINAL_POSITION",
        )
        .await
        .unwrap();
    assert_eq!(
        described,
        vec![
            ("id".to_string(), "bigint".to_string()),
            ("kind".to_string(), "text".to_string()),
        ]
    );
    conn.disconnect().await.unwrap();

    drop_test_tables(&options).await;
}

#[tokio::test]
#[ignore]
async fn test_conflicting_window_rolled_back() {
    let options = get_test_target().expect("TEST_MYSQL_* must be set");
    drop_test_tables(&options).await;

    // Pre-existing table with a primary key; create-if-missing leaves it alone
    let mut conn = connect_mysql(&options).await.unwrap();
    conn.query_drop("CREATE TABLE it_events (id BIGINT PRIMARY KEY, kind TEXT)")
        .await
        .unwrap();
    conn.query_drop("INSERT INTO it_events VALUES (1500, 'seed')")
        .await
        .unwrap();

    let source = create_source(2500);
    let mut target = MysqlTarget::connect(&options).await.unwrap();
    let reports = run_migration(&source, &mut target, BATCH_SIZE).await.unwrap();
    target.disconnect().await.unwrap();

    let events = reports.iter().find(|r| r.table == "it_events").unwrap();
    assert_eq!(events.stats.windows_rolled_back, 1);

    let count: Option<i64> = conn
        .query_first("SELECT COUNT(*) FROM it_events")
        .await
        .unwrap();
    // Windows 1 and 3 plus the seed row
    assert_eq!(count, Some(1501));
    let products: Option<i64> = conn
        .query_first("SELECT COUNT(*) FROM it_products")
        .await
        .unwrap();
    assert_eq!(products, Some(2));
    conn.disconnect().await.unwrap();

    drop_test_tables(&options).await;
}
