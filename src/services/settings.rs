use crate::db::{Database, GuildSettingsRecord};
use crate::error::BotError;
use tracing::info;

/// Per-guild configuration, created with defaults on first access.
pub struct GuildSettingsService {
    db: Database,
}

impl GuildSettingsService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn get(&self, guild_id: u64) -> Result<GuildSettingsRecord, BotError> {
        let guild = guild_id.to_string();
        Ok(self
            .db
            .run_blocking(move |db| db.ensure_guild_settings(&guild))
            .await?)
    }

    pub async fn set_news_channel(&self, guild_id: u64, channel_id: u64) -> Result<(), BotError> {
        let guild = guild_id.to_string();
        let channel = channel_id.to_string();
        self.db
            .run_blocking(move |db| db.set_news_channel(&guild, Some(&channel)))
            .await?;
        info!("News channel for guild {} set to {}", guild_id, channel_id);
        Ok(())
    }

    /// Stops news posting for the guild. The marker is kept.
    pub async fn unset_news_channel(&self, guild_id: u64) -> Result<(), BotError> {
        let guild = guild_id.to_string();
        self.db
            .run_blocking(move |db| db.set_news_channel(&guild, None))
            .await?;
        info!("News channel for guild {} unset", guild_id);
        Ok(())
    }
}
