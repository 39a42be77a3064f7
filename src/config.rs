use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Clone, Deserialize)]
pub struct Config {
    pub discord_token: String,
    pub owner_id: Option<u64>,
    pub database_url: String,
    pub currency_api_url: String,
    pub news_feed_url: String,
    pub news_poll_interval_secs: u64,
    pub default_league: String,
    pub reference_currency: String,
    /// Fixed rate used by the crafting cost card, not a live price.
    pub chaos_per_divine_estimate: f64,
    pub http_user_agent: String,
    pub status_message: String,
    pub dev_guild_id: Option<u64>,
    pub register_commands: bool,
}

pub const DEFAULT_CURRENCY_API_URL: &str = "https://poe.ninja/api/data/currencyoverview";
pub const DEFAULT_NEWS_FEED_URL: &str = "https://www.pathofexile.com/news/rss";

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            owner_id: env::var("OWNER_ID").ok().and_then(|id| id.parse().ok()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "data/poe2bot.db".to_string()),
            currency_api_url: env::var("CURRENCY_API_URL")
                .unwrap_or_else(|_| DEFAULT_CURRENCY_API_URL.to_string()),
            news_feed_url: env::var("NEWS_FEED_URL")
                .unwrap_or_else(|_| DEFAULT_NEWS_FEED_URL.to_string()),
            news_poll_interval_secs: env::var("NEWS_POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "1800".to_string())
                .parse()
                .unwrap_or(1800),
            default_league: env::var("DEFAULT_LEAGUE").unwrap_or_else(|_| "Standard".to_string()),
            reference_currency: env::var("REFERENCE_CURRENCY")
                .unwrap_or_else(|_| "Divine Orb".to_string()),
            chaos_per_divine_estimate: env::var("CHAOS_PER_DIVINE_ESTIMATE")
                .unwrap_or_else(|_| "180".to_string())
                .parse::<f64>()
                .ok()
                .filter(|v| *v > 0.0)
                .unwrap_or(180.0),
            http_user_agent: env::var("HTTP_USER_AGENT")
                .unwrap_or_else(|_| format!("poe2bot/{}", env!("CARGO_PKG_VERSION"))),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "Wraeclast awaits".to_string()),
            dev_guild_id: env::var("DEV_GUILD_ID").ok().and_then(|id| id.parse().ok()),
            register_commands: env::var("REGISTER_COMMANDS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("owner_id", &self.owner_id)
            .field("database_url", &self.database_url)
            .field("currency_api_url", &self.currency_api_url)
            .field("news_feed_url", &self.news_feed_url)
            .field("news_poll_interval_secs", &self.news_poll_interval_secs)
            .field("default_league", &self.default_league)
            .field("reference_currency", &self.reference_currency)
            .field("chaos_per_divine_estimate", &self.chaos_per_divine_estimate)
            .field("http_user_agent", &self.http_user_agent)
            .field("status_message", &self.status_message)
            .field("dev_guild_id", &self.dev_guild_id)
            .field("register_commands", &self.register_commands)
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        discord_token: "test".to_string(),
        owner_id: Some(1),
        database_url: ":memory:".to_string(),
        currency_api_url: "http://localhost/currency".to_string(),
        news_feed_url: "http://localhost/rss".to_string(),
        news_poll_interval_secs: 1800,
        default_league: "Standard".to_string(),
        reference_currency: "Divine Orb".to_string(),
        chaos_per_divine_estimate: 180.0,
        http_user_agent: "poe2bot-test".to_string(),
        status_message: "test".to_string(),
        dev_guild_id: None,
        register_commands: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_logic() {
        // 1. Missing token
        env::remove_var("DISCORD_TOKEN");
        let result = Config::build();
        assert!(result.is_err(), "Should fail when DISCORD_TOKEN is missing");

        // 2. Defaults
        env::set_var("DISCORD_TOKEN", "test_token");
        env::set_var("NEWS_POLL_INTERVAL_SECS", "not-a-number");
        env::set_var("CHAOS_PER_DIVINE_ESTIMATE", "-5");
        let config = Config::build().unwrap();
        assert_eq!(config.discord_token, "test_token");
        assert_eq!(config.news_poll_interval_secs, 1800);
        assert_eq!(config.chaos_per_divine_estimate, 180.0);
        assert_eq!(config.default_league, "Standard");
        assert_eq!(config.reference_currency, "Divine Orb");
        assert_eq!(config.news_feed_url, DEFAULT_NEWS_FEED_URL);

        // 3. Debug redaction
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("test_token"));
        assert!(debug_output.contains("[REDACTED]"));

        env::remove_var("DISCORD_TOKEN");
        env::remove_var("NEWS_POLL_INTERVAL_SECS");
        env::remove_var("CHAOS_PER_DIVINE_ESTIMATE");
    }
}
