use crate::config::Config;
use rusqlite::{Connection, OptionalExtension, Result};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GuildSettingsRecord {
    pub guild_id: String,
    pub news_channel_id: Option<String>,
    pub last_news_check: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildRecord {
    pub name: String,
    pub info: String,
    pub author: String,
    pub author_id: String,
    pub created_at: String,
}

/// A guild with a news channel configured, as seen by the poller.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsDestination {
    pub guild_id: String,
    pub channel_id: String,
    pub last_news_check: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    Forbidden,
}

impl Database {
    pub fn new(config: &Config) -> Result<Self> {
        let conn = Connection::open(&config.database_url)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))
    }

    /// Runs a blocking database closure on the blocking thread pool.
    pub async fn run_blocking<F, T>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || f(&db)).await?
    }

    pub fn execute_init(&self) -> anyhow::Result<()> {
        info!("Database: Initializing schema...");
        let sql = "
            CREATE TABLE IF NOT EXISTS guild_settings (
                guild_id TEXT PRIMARY KEY,
                news_channel_id TEXT,
                last_news_check TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS builds (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id TEXT NOT NULL,
                name TEXT NOT NULL,
                info TEXT NOT NULL,
                author TEXT NOT NULL,
                author_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (guild_id, name)
            );
            CREATE INDEX IF NOT EXISTS idx_builds_guild ON builds (guild_id, id);

            CREATE TABLE IF NOT EXISTS user_favorites (
                user_id TEXT NOT NULL,
                guild_id TEXT NOT NULL,
                build_name TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (user_id, guild_id, build_name)
            );
        ";
        let conn = self.lock()?;
        conn.execute_batch(sql)?;
        debug!("Database: Schema initialized successfully");
        Ok(())
    }

    // --- Guild settings ---

    /// Returns the guild's settings, inserting the defaults on first access.
    pub fn ensure_guild_settings(&self, guild_id: &str) -> anyhow::Result<GuildSettingsRecord> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO guild_settings (guild_id) VALUES (?1)",
            (guild_id,),
        )?;
        let record = conn.query_row(
            "SELECT guild_id, news_channel_id, last_news_check, created_at
             FROM guild_settings WHERE guild_id = ?1",
            [guild_id],
            |row| {
                Ok(GuildSettingsRecord {
                    guild_id: row.get(0)?,
                    news_channel_id: row.get(1)?,
                    last_news_check: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )?;
        Ok(record)
    }

    pub fn set_news_channel(&self, guild_id: &str, channel_id: Option<&str>) -> anyhow::Result<()> {
        debug!("Database: Setting news channel for guild {} to {:?}", guild_id, channel_id);
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO guild_settings (guild_id, news_channel_id) VALUES (?1, ?2)
             ON CONFLICT(guild_id) DO UPDATE SET news_channel_id = ?2",
            (guild_id, channel_id),
        )?;
        Ok(())
    }

    pub fn set_last_news_check(&self, guild_id: &str, marker: &str) -> anyhow::Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO guild_settings (guild_id, last_news_check) VALUES (?1, ?2)
             ON CONFLICT(guild_id) DO UPDATE SET last_news_check = ?2",
            (guild_id, marker),
        )?;
        Ok(())
    }

    pub fn list_news_destinations(&self) -> anyhow::Result<Vec<NewsDestination>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT guild_id, news_channel_id, last_news_check FROM guild_settings
             WHERE news_channel_id IS NOT NULL ORDER BY guild_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(NewsDestination {
                guild_id: row.get(0)?,
                channel_id: row.get(1)?,
                last_news_check: row.get(2)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    // --- Builds ---

    /// Inserts a build unless the name is taken in this guild.
    /// Returns `false` when a build with that name already exists.
    pub fn insert_build(&self, guild_id: &str, build: &BuildRecord) -> anyhow::Result<bool> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO guild_settings (guild_id) VALUES (?1)",
            (guild_id,),
        )?;
        let inserted = conn.execute(
            "INSERT INTO builds (guild_id, name, info, author, author_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(guild_id, name) DO NOTHING",
            (
                guild_id,
                &build.name,
                &build.info,
                &build.author,
                &build.author_id,
                &build.created_at,
            ),
        )?;
        debug!("Database: insert_build {} in guild {} -> {}", build.name, guild_id, inserted);
        Ok(inserted == 1)
    }

    pub fn get_build(&self, guild_id: &str, name: &str) -> anyhow::Result<Option<BuildRecord>> {
        let conn = self.lock()?;
        let record = conn
            .query_row(
                "SELECT name, info, author, author_id, created_at FROM builds
                 WHERE guild_id = ?1 AND name = ?2",
                (guild_id, name),
                map_build,
            )
            .optional()?;
        Ok(record)
    }

    /// All builds of a guild in insertion order.
    pub fn list_builds(&self, guild_id: &str) -> anyhow::Result<Vec<BuildRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT name, info, author, author_id, created_at FROM builds
             WHERE guild_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([guild_id], map_build)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub fn count_builds(&self, guild_id: &str) -> anyhow::Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM builds WHERE guild_id = ?1",
            [guild_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Deletes a build if the requester wrote it or is privileged.
    /// The ownership check and the delete share one transaction.
    pub fn delete_build(
        &self,
        guild_id: &str,
        name: &str,
        requester_id: &str,
        privileged: bool,
    ) -> anyhow::Result<DeleteOutcome> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let author_id: Option<String> = tx
            .query_row(
                "SELECT author_id FROM builds WHERE guild_id = ?1 AND name = ?2",
                (guild_id, name),
                |row| row.get(0),
            )
            .optional()?;

        let outcome = match author_id {
            None => DeleteOutcome::NotFound,
            Some(author_id) if author_id != requester_id && !privileged => {
                DeleteOutcome::Forbidden
            }
            Some(_) => {
                tx.execute(
                    "DELETE FROM builds WHERE guild_id = ?1 AND name = ?2",
                    (guild_id, name),
                )?;
                DeleteOutcome::Deleted
            }
        };

        tx.commit()?;
        Ok(outcome)
    }

    // --- User favorites ---

    /// Adds the build to the user's favorites in this guild, or removes it if
    /// already there. Returns `true` when the build is a favorite afterwards.
    pub fn toggle_favorite(
        &self,
        user_id: &str,
        guild_id: &str,
        build_name: &str,
    ) -> anyhow::Result<bool> {
        let conn = self.lock()?;
        let removed = conn.execute(
            "DELETE FROM user_favorites
             WHERE user_id = ?1 AND guild_id = ?2 AND build_name = ?3",
            (user_id, guild_id, build_name),
        )?;
        if removed > 0 {
            return Ok(false);
        }
        conn.execute(
            "INSERT INTO user_favorites (user_id, guild_id, build_name) VALUES (?1, ?2, ?3)",
            (user_id, guild_id, build_name),
        )?;
        Ok(true)
    }

    pub fn list_favorites(&self, user_id: &str, guild_id: &str) -> anyhow::Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT build_name FROM user_favorites
             WHERE user_id = ?1 AND guild_id = ?2 ORDER BY rowid",
        )?;
        let rows = stmt.query_map([user_id, guild_id], |row| row.get(0))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}

fn map_build(row: &rusqlite::Row<'_>) -> Result<BuildRecord> {
    Ok(BuildRecord {
        name: row.get(0)?,
        info: row.get(1)?,
        author: row.get(2)?,
        author_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
pub(crate) fn test_db() -> Database {
    let db = Database::new(&crate::config::test_config()).unwrap();
    db.execute_init().unwrap();
    db
}
