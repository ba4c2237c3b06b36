//! Helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use rust_decimal::Decimal;
use tempfile::TempDir;

use pushkind_store::db::{DbPool, establish_connection_pool};
use pushkind_store::domain::category::{Category, NewCategory};
use pushkind_store::domain::product::{NewProduct, Product};
use pushkind_store::repository::{CategoryWriter, DieselRepository, ProductWriter};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!(); // assumes migrations/ exists

/// File-backed SQLite database living in a temporary directory.
pub struct TestDb {
    dir: TempDir,
    path: PathBuf,
    pool: DbPool,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory.");
        let path = dir.path().join(filename);

        let pool = establish_connection_pool(path.to_str().expect("UTF-8 path"))
            .expect("Failed to establish SQLite connection.");
        let mut conn = pool
            .get()
            .expect("Failed to get SQLite connection from pool.");
        conn.run_pending_migrations(MIGRATIONS)
            .expect("Migrations failed");

        TestDb { dir, path, pool }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }

    pub fn repo(&self) -> DieselRepository {
        DieselRepository::new(self.pool())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

pub fn price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

pub fn seed_category(repo: &DieselRepository, name: &str) -> Category {
    repo.create_category(&NewCategory::new(
        name,
        format!("https://cdn.example.com/{}.png", name.to_lowercase()),
    ))
    .expect("category should be created")
}

pub fn seed_product(
    repo: &DieselRepository,
    category_id: i32,
    name: &str,
    cents: i64,
    stock: i64,
) -> Product {
    repo.create_product(&NewProduct::new(category_id, name, price(cents)).with_stock(stock))
        .expect("product should be created")
}
