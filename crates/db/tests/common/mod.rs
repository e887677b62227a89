#![allow(dead_code)]

use std::path::Path;

use sqlx::PgPool;
use stageload_core::identifier::Identifier;
use stageload_db::schema::apply_schema;
use stageload_db::ConnectionScope;
use tempfile::TempDir;

/// Dataset subdirectory used by every test descriptor.
pub const DATASET_DIR: &str = "shop-files";

/// A small namespace exercising every strategy:
///
/// - `sellers`: referenced by `deals`
/// - `reviews`: primary key with duplicates in the source
/// - `deals`: nullable foreign key to `sellers`
/// - `places`: generated id absent from the source file
pub const SHOP_SCHEMA: &str = r#"
DROP SCHEMA IF EXISTS shop CASCADE;
CREATE SCHEMA shop;

CREATE TABLE shop.sellers (
    seller_id   TEXT PRIMARY KEY,
    seller_city TEXT
);

CREATE TABLE shop.reviews (
    review_id    TEXT PRIMARY KEY,
    order_id     TEXT NOT NULL,
    review_score SMALLINT
);

CREATE TABLE shop.deals (
    mql_id    TEXT PRIMARY KEY,
    seller_id TEXT REFERENCES shop.sellers (seller_id),
    won_date  DATE
);

CREATE TABLE shop.places (
    place_id BIGSERIAL PRIMARY KEY,
    zip      TEXT NOT NULL,
    city     TEXT
);
"#;

/// Open a connection scope against the per-test database.
pub async fn open_scope(pool: &PgPool) -> ConnectionScope {
    ConnectionScope::connect_with(&pool.connect_options())
        .await
        .expect("test database should accept connections")
}

/// Open a scope and create the `shop` namespace.
pub async fn shop_scope(pool: &PgPool) -> ConnectionScope {
    let mut scope = open_scope(pool).await;
    apply_schema(&mut scope, &Identifier::new("shop").unwrap(), SHOP_SCHEMA)
        .await
        .expect("shop schema should apply");
    scope
}

/// A temporary data root with an empty dataset directory.
pub fn data_root() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(DATASET_DIR)).unwrap();
    dir
}

/// Write `contents` to `<root>/<DATASET_DIR>/<name>`.
pub fn write_csv(root: &Path, name: &str, contents: &str) {
    std::fs::write(root.join(DATASET_DIR).join(name), contents).unwrap();
}

/// Row count of a table, read through the pool (i.e. committed data only).
pub async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap_or_else(|e| panic!("count on {table} failed: {e}"))
}
