use crate::config::{DBSettings, SqliteConfigSerde};
use log::debug;
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Row, Sqlite, SqlitePool,
};
use std::{
    hash::{DefaultHasher, Hash, Hasher},
    time::Duration as StdDuration,
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteMode {
    ReadWriteCreate, // rwc - Read + Write + Create if missing
    ReadWrite,       // rw  - Read + Write (must exist)
    Memory,          // memory - In-memory database
}

#[derive(Debug, Clone)]
pub struct SqliteConfig {
    pub mode: SqliteMode,
    pub busy_timeout_ms: u32,
    pub journal_mode: String,
    pub synchronous: String,
    pub foreign_keys: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            mode: SqliteMode::ReadWriteCreate,
            busy_timeout_ms: 5000,
            journal_mode: String::from("WAL"),
            synchronous: String::from("NORMAL"),
            foreign_keys: true,
        }
    }
}

impl SqliteConfig {
    pub fn testing() -> Self {
        Self {
            mode: SqliteMode::Memory,
            busy_timeout_ms: 1000,
            journal_mode: String::from("MEMORY"),
            synchronous: String::from("OFF"),
            ..Default::default()
        }
    }

    pub fn build_connect_options(&self, database_path: &str) -> SqliteConnectOptions {
        let options = match self.mode {
            SqliteMode::Memory => {
                // Shared cache keeps every connection of the pool on the same tables,
                // the hash keeps path characters out of the uri
                let mut hasher = DefaultHasher::new();
                database_path.hash(&mut hasher);
                let memory_uri = format!(
                    "file:memdb_{}?mode=memory&cache=shared",
                    hasher.finish()
                );
                SqliteConnectOptions::new()
                    .filename(&memory_uri)
                    .shared_cache(true)
                    .create_if_missing(true)
            }
            SqliteMode::ReadWrite => SqliteConnectOptions::new()
                .filename(database_path)
                .read_only(false),
            SqliteMode::ReadWriteCreate => SqliteConnectOptions::new()
                .filename(database_path)
                .read_only(false)
                .create_if_missing(true),
        };

        let options = options
            .busy_timeout(StdDuration::from_millis(self.busy_timeout_ms as u64))
            .pragma("journal_mode", self.journal_mode.clone())
            .pragma("synchronous", self.synchronous.clone());

        if self.foreign_keys {
            options.pragma("foreign_keys", "true")
        } else {
            options
        }
    }
}

impl From<SqliteConfigSerde> for SqliteConfig {
    fn from(config: SqliteConfigSerde) -> Self {
        Self {
            mode: match config.mode.as_str() {
                "ReadWrite" => SqliteMode::ReadWrite,
                "Memory" => SqliteMode::Memory,
                _ => SqliteMode::ReadWriteCreate,
            },
            busy_timeout_ms: config.busy_timeout_ms,
            journal_mode: config.journal_mode,
            synchronous: config.synchronous,
            foreign_keys: config.foreign_keys,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabasePoolConfig {
    pub read_max_connections: u32,
    pub read_min_connections: u32,
    pub write_max_connections: u32,
    pub write_min_connections: u32,
    pub idle_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
    pub sqlite_config: SqliteConfig,
}

impl Default for DatabasePoolConfig {
    fn default() -> Self {
        DBSettings::default().into()
    }
}

impl DatabasePoolConfig {
    pub fn testing() -> Self {
        Self {
            read_max_connections: 2,
            read_min_connections: 1,
            write_max_connections: 1,
            write_min_connections: 1,
            acquire_timeout_secs: 5,
            sqlite_config: SqliteConfig::testing(),
            ..Default::default()
        }
    }
}

impl From<DBSettings> for DatabasePoolConfig {
    fn from(config: DBSettings) -> Self {
        Self {
            read_max_connections: config.read_max_connections,
            read_min_connections: config.read_min_connections,
            write_max_connections: config.write_max_connections,
            write_min_connections: config.write_min_connections,
            idle_timeout_secs: config.idle_timeout_secs,
            acquire_timeout_secs: config.acquire_timeout_secs,
            sqlite_config: config.sqlite_config.into(),
        }
    }
}

static PHOTOS_MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations/photos");

#[derive(Clone, Debug)]
pub struct DBConnection {
    pub database_name: String,
    pub database_path: String,
    read_pool: SqlitePool,
    write_pool: SqlitePool,
}

impl DBConnection {
    pub async fn new(
        path: &str,
        db_name: &str,
        database_pool_config: DatabasePoolConfig,
    ) -> Result<Self, sqlx::Error> {
        let database_path = format!("{}/{}.db", path, db_name);

        if database_pool_config.sqlite_config.mode != SqliteMode::Memory {
            let database_url = format!("sqlite:{}", database_path);
            if !Sqlite::database_exists(&database_url).await? {
                Sqlite::create_database(&database_url).await?;
            }
        }

        let (read_pool, write_pool) =
            Self::create_pools(&database_path, &database_pool_config).await?;

        PHOTOS_MIGRATOR
            .run(&write_pool)
            .await
            .map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;

        Ok(Self {
            database_name: db_name.to_string(),
            database_path,
            read_pool,
            write_pool,
        })
    }

    #[cfg(test)]
    pub fn new_with_pools(
        database_name: String,
        database_path: String,
        read_pool: SqlitePool,
        write_pool: SqlitePool,
    ) -> Self {
        Self {
            database_name,
            database_path,
            read_pool,
            write_pool,
        }
    }

    async fn create_pools(
        database_path: &str,
        database_pool_config: &DatabasePoolConfig,
    ) -> Result<(SqlitePool, SqlitePool), sqlx::Error> {
        let write_config = match database_pool_config.sqlite_config.mode {
            SqliteMode::Memory => database_pool_config.sqlite_config.clone(),
            _ => SqliteConfig {
                mode: SqliteMode::ReadWrite,
                ..database_pool_config.sqlite_config.clone()
            },
        };

        let write_connection = write_config.build_connect_options(database_path);
        debug!("Write connection: {:?}", write_connection);

        let write_pool = SqlitePoolOptions::new()
            .max_connections(database_pool_config.write_max_connections)
            .min_connections(database_pool_config.write_min_connections)
            .acquire_timeout(StdDuration::from_secs(
                database_pool_config.acquire_timeout_secs,
            ))
            .idle_timeout(StdDuration::from_secs(
                database_pool_config.idle_timeout_secs,
            ))
            .connect_with(write_connection)
            .await?;

        if write_config.mode == SqliteMode::Memory {
            // One pool keeps the in-memory tables alive for both sides
            return Ok((write_pool.clone(), write_pool));
        }

        let read_connection = write_config
            .build_connect_options(database_path)
            .read_only(true);
        debug!("Read connection: {:?}", read_connection);

        let read_pool = SqlitePoolOptions::new()
            .max_connections(database_pool_config.read_max_connections)
            .min_connections(database_pool_config.read_min_connections)
            .acquire_timeout(StdDuration::from_secs(
                database_pool_config.acquire_timeout_secs,
            ))
            .idle_timeout(StdDuration::from_secs(
                database_pool_config.idle_timeout_secs,
            ))
            .connect_with(read_connection)
            .await?;

        Ok((read_pool, write_pool))
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        let _: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.read_pool)
            .await?;
        let _: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.write_pool)
            .await?;

        Ok(())
    }

    pub async fn close(self) {
        self.read_pool.close().await;
        self.write_pool.close().await;
    }

    pub fn read(&self) -> &SqlitePool {
        &self.read_pool
    }

    pub fn write(&self) -> &SqlitePool {
        &self.write_pool
    }
}

pub fn parse_required_datetime(
    row: &SqliteRow,
    column: &str,
) -> Result<OffsetDateTime, sqlx::Error> {
    let date_str: String = row.get(column);
    OffsetDateTime::parse(&date_str, &Rfc3339).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

pub fn create_folder(path: &str) -> Result<(), std::io::Error> {
    std::fs::create_dir_all(path)
}
