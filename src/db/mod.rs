use std::str::FromStr;
use std::time::Duration;

use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub use sqlx::sqlite::SqlitePool;

pub mod photos;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Error, Debug)]
pub enum Error {
    #[error("sqlx error")]
    Sqlx(#[from] sqlx::Error),
    #[error("migration error")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Opens a pool for `database_url`, creating the database file if needed.
///
/// Every connection to an in-memory database is a separate database, so such
/// pools are pinned to a single connection that is never recycled.
pub async fn get_pool(database_url: &str) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool_options = if is_in_memory(database_url) {
        SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections((num_cpus::get_physical() * 2) as u32)
    };

    let pool = pool_options
        .acquire_timeout(Duration::from_secs(2))
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Brings the schema up to date.
pub async fn migrate(pool: &SqlitePool) -> Result<(), Error> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use sqlx::sqlite::SqlitePool;

    use super::photos::PhotoProvider;
    use crate::models::photos::{NewPhoto, PhotoId};

    pub(crate) async fn memory_pool() -> SqlitePool {
        let pool = super::get_pool("sqlite::memory:").await.unwrap();
        super::migrate(&pool).await.unwrap();
        pool
    }

    pub(crate) fn new_photo(filename: &str, title: &str, tags: &[&str]) -> NewPhoto {
        NewPhoto {
            filename: filename.to_string(),
            title: title.to_string(),
            description: Some(format!("{} description", title)),
            location: Some(format!("{} location", title)),
            taken_timestamp: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Inserts Sunset, Mountain and Lake, in that order.
    pub(crate) async fn seeded_pool() -> (SqlitePool, Vec<PhotoId>) {
        let pool = memory_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut ids = Vec::new();
        for photo in [
            new_photo("sunset.jpg", "Sunset", &["sky", "evening"]),
            new_photo("mountain.jpg", "Mountain", &["landscape", "snow"]),
            new_photo("lake.jpg", "Lake", &["water"]),
        ] {
            ids.push(conn.insert_photo(&photo).await.unwrap());
        }
        drop(conn);
        (pool, ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_in_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://gallery?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://gallery.db"));
    }

    #[async_std::test]
    async fn migrations_are_idempotent() {
        let pool = get_pool("sqlite::memory:").await.unwrap();
        migrate(&pool).await.unwrap();
        migrate(&pool).await.unwrap();
    }
}
