use crate::db::{BuildRecord, Database, DeleteOutcome};
use crate::error::BotError;
use chrono::Utc;
use tracing::info;

/// Embed descriptions hold at most 4096 characters.
pub const MAX_BUILD_INFO_CHARS: usize = 4000;
pub const MAX_BUILD_NAME_CHARS: usize = 100;

/// A favourite entry; `build` is `None` once the build has been deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Favorite {
    pub name: String,
    pub build: Option<BuildRecord>,
}

pub struct BuildService {
    db: Database,
}

impl BuildService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create_build(
        &self,
        guild_id: u64,
        name: &str,
        info: &str,
        author: &str,
        author_id: u64,
    ) -> Result<BuildRecord, BotError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BotError::Validation("Build name cannot be empty.".to_string()));
        }
        if name.chars().count() > MAX_BUILD_NAME_CHARS {
            return Err(BotError::Validation(format!(
                "Build name is too long (max {} characters).",
                MAX_BUILD_NAME_CHARS
            )));
        }
        if info.trim().is_empty() {
            return Err(BotError::Validation("Build info cannot be empty.".to_string()));
        }
        if info.chars().count() > MAX_BUILD_INFO_CHARS {
            return Err(BotError::Validation(format!(
                "Build info is too long (max {} characters).",
                MAX_BUILD_INFO_CHARS
            )));
        }

        let record = BuildRecord {
            name: name.to_string(),
            info: info.to_string(),
            author: author.to_string(),
            author_id: author_id.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        let guild = guild_id.to_string();
        let to_insert = record.clone();
        let inserted = self
            .db
            .run_blocking(move |db| db.insert_build(&guild, &to_insert))
            .await?;
        if !inserted {
            return Err(BotError::DuplicateName(record.name));
        }

        info!("Saved build '{}' in guild {} by {}", record.name, guild_id, author_id);
        Ok(record)
    }

    pub async fn get_build(&self, guild_id: u64, name: &str) -> Result<BuildRecord, BotError> {
        let guild = guild_id.to_string();
        let key = name.trim().to_string();
        self.db
            .run_blocking(move |db| db.get_build(&guild, &key))
            .await?
            .ok_or_else(|| BotError::NotFound(format!("build `{}`", name.trim())))
    }

    /// Builds in insertion order, at most `limit`, plus the full count.
    pub async fn list_builds(
        &self,
        guild_id: u64,
        limit: usize,
    ) -> Result<(Vec<BuildRecord>, usize), BotError> {
        let guild = guild_id.to_string();
        let mut builds = self
            .db
            .run_blocking(move |db| db.list_builds(&guild))
            .await?;
        let total = builds.len();
        builds.truncate(limit);
        Ok((builds, total))
    }

    pub async fn count_builds(&self, guild_id: u64) -> Result<usize, BotError> {
        let guild = guild_id.to_string();
        Ok(self
            .db
            .run_blocking(move |db| db.count_builds(&guild))
            .await?)
    }

    /// Deletes a build written by `requester_id`, or any build when
    /// `privileged` is set.
    pub async fn delete_build(
        &self,
        guild_id: u64,
        name: &str,
        requester_id: u64,
        privileged: bool,
    ) -> Result<(), BotError> {
        let guild = guild_id.to_string();
        let key = name.trim().to_string();
        let requester = requester_id.to_string();
        let outcome = self
            .db
            .run_blocking(move |db| db.delete_build(&guild, &key, &requester, privileged))
            .await?;

        match outcome {
            DeleteOutcome::Deleted => {
                info!("Deleted build '{}' in guild {} by {}", name.trim(), guild_id, requester_id);
                Ok(())
            }
            DeleteOutcome::NotFound => Err(BotError::NotFound(format!("build `{}`", name.trim()))),
            DeleteOutcome::Forbidden => Err(BotError::Forbidden(
                "You can only delete your own builds (or you need Manage Messages permission)."
                    .to_string(),
            )),
        }
    }

    /// Toggles a build in the user's favourites for this guild. The build must
    /// exist.
    /// Returns `true` when it was added.
    pub async fn toggle_favorite(
        &self,
        guild_id: u64,
        user_id: u64,
        name: &str,
    ) -> Result<(String, bool), BotError> {
        let build = self.get_build(guild_id, name).await?;
        let user = user_id.to_string();
        let guild = guild_id.to_string();
        let key = build.name.clone();
        let added = self
            .db
            .run_blocking(move |db| db.toggle_favorite(&user, &guild, &key))
            .await?;
        Ok((build.name, added))
    }

    /// The user's favourites resolved against this guild's builds.
    pub async fn favorites(&self, guild_id: u64, user_id: u64) -> Result<Vec<Favorite>, BotError> {
        let guild = guild_id.to_string();
        let user = user_id.to_string();
        let favorites = self
            .db
            .run_blocking(move |db| {
                let names = db.list_favorites(&user, &guild)?;
                let mut resolved = Vec::with_capacity(names.len());
                for name in names {
                    let build = db.get_build(&guild, &name)?;
                    resolved.push(Favorite { name, build });
                }
                Ok(resolved)
            })
            .await?;
        Ok(favorites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;

    #[tokio::test]
    async fn test_create_then_duplicate() {
        let service = BuildService::new(test_db());

        let saved = service
            .create_build(1, "Lightning Arrow", "Deadeye, LA + Tornado", "exile", 10)
            .await
            .unwrap();
        assert_eq!(saved.author_id, "10");

        let err = service
            .create_build(1, "Lightning Arrow", "other text", "someone", 11)
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::DuplicateName(ref n) if n == "Lightning Arrow"));

        // First build is kept
        let stored = service.get_build(1, "Lightning Arrow").await.unwrap();
        assert_eq!(stored.info, "Deadeye, LA + Tornado");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let service = BuildService::new(test_db());
        let err = service.get_build(1, "Nope").await.unwrap_err();
        assert_eq!(err.user_message(), "❌ Could not find build `Nope`.");
    }

    #[tokio::test]
    async fn test_bad_input_is_rejected() {
        let service = BuildService::new(test_db());
        assert!(matches!(
            service.create_build(1, "  ", "info", "a", 1).await,
            Err(BotError::Validation(_))
        ));
        assert!(matches!(
            service.create_build(1, "name", "", "a", 1).await,
            Err(BotError::Validation(_))
        ));
        let long_info = "x".repeat(MAX_BUILD_INFO_CHARS + 1);
        assert!(matches!(
            service.create_build(1, "name", &long_info, "a", 1).await,
            Err(BotError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_is_truncated_for_display() {
        let service = BuildService::new(test_db());
        for i in 0..30 {
            service
                .create_build(1, &format!("build-{}", i), "info", "a", 1)
                .await
                .unwrap();
        }
        let (builds, total) = service.list_builds(1, 25).await.unwrap();
        assert_eq!(builds.len(), 25);
        assert_eq!(total, 30);
        assert_eq!(builds[0].name, "build-0");
        assert_eq!(service.count_builds(1).await.unwrap(), 30);
    }

    #[tokio::test]
    async fn test_delete_permissions() {
        let service = BuildService::new(test_db());
        service.create_build(1, "Monk", "info", "author", 10).await.unwrap();

        assert!(matches!(
            service.delete_build(1, "Missing", 10, false).await,
            Err(BotError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_build(1, "Monk", 20, false).await,
            Err(BotError::Forbidden(_))
        ));
        service.delete_build(1, "Monk", 10, false).await.unwrap();
        assert!(service.get_build(1, "Monk").await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_creates_only_one_wins() {
        let service = std::sync::Arc::new(BuildService::new(test_db()));
        let mut handles = Vec::new();
        for author in 0..8u64 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.create_build(1, "Race", "info", "a", author).await
            }));
        }
        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }

    #[tokio::test]
    async fn test_favorites_survive_deleted_builds() {
        let service = BuildService::new(test_db());
        service.create_build(1, "Monk", "info", "a", 10).await.unwrap();
        service.create_build(1, "Ranger", "info", "a", 10).await.unwrap();

        assert_eq!(
            service.toggle_favorite(1, 50, "Monk").await.unwrap(),
            ("Monk".to_string(), true)
        );
        service.toggle_favorite(1, 50, "Ranger").await.unwrap();
        service.delete_build(1, "Monk", 10, false).await.unwrap();

        let favorites = service.favorites(1, 50).await.unwrap();
        assert_eq!(favorites.len(), 2);
        assert!(favorites[0].build.is_none());
        assert_eq!(favorites[1].build.as_ref().unwrap().name, "Ranger");

        // Unknown build cannot be favourited
        assert!(service.toggle_favorite(1, 50, "Ghost").await.is_err());
    }

    #[tokio::test]
    async fn test_favorites_do_not_leak_across_guilds() {
        let service = BuildService::new(test_db());
        service.create_build(1, "Monk", "guild one monk", "a", 10).await.unwrap();
        service.create_build(1, "Ranger", "guild one ranger", "a", 10).await.unwrap();
        service.create_build(2, "Monk", "guild two monk", "b", 20).await.unwrap();

        service.toggle_favorite(1, 50, "Monk").await.unwrap();
        service.toggle_favorite(1, 50, "Ranger").await.unwrap();

        assert!(service.favorites(2, 50).await.unwrap().is_empty());

        // Favouriting the same name in guild 2 adds, and leaves guild 1 alone
        let (_, added) = service.toggle_favorite(2, 50, "Monk").await.unwrap();
        assert!(added);
        let in_two = service.favorites(2, 50).await.unwrap();
        assert_eq!(in_two.len(), 1);
        assert_eq!(in_two[0].build.as_ref().unwrap().info, "guild two monk");

        let in_one: Vec<_> = service
            .favorites(1, 50)
            .await
            .unwrap()
            .into_iter()
            .map(|f| (f.name, f.build.map(|b| b.info)))
            .collect();
        assert_eq!(
            in_one,
            vec![
                ("Monk".to_string(), Some("guild one monk".to_string())),
                ("Ranger".to_string(), Some("guild one ranger".to_string())),
            ]
        );
    }
}
