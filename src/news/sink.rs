use super::NewsItem;
use crate::text::{strip_html, truncate_chars};
use async_trait::async_trait;
use serenity::all::{ChannelId, CreateEmbed, CreateEmbedFooter, CreateMessage};
use serenity::http::Http;
use std::sync::Arc;
use tracing::debug;

const NEWS_DESCRIPTION_CHARS: usize = 500;
const NEWS_TITLE_CHARS: usize = 250;
pub const NEWS_COLOR: u32 = 0xF1C40F;

/// Where the poller delivers news items.
#[async_trait]
pub trait NewsSink: Send + Sync {
    async fn post(&self, channel_id: u64, item: &NewsItem) -> anyhow::Result<()>;
}

/// Posts each item as an embed card in a Discord channel.
pub struct DiscordNewsSink {
    http: Arc<Http>,
}

impl DiscordNewsSink {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

/// Plain-text card body: tags removed, cut to 500 characters.
pub fn news_description(raw: &str) -> String {
    truncate_chars(&strip_html(raw), NEWS_DESCRIPTION_CHARS)
}

pub fn news_embed(item: &NewsItem) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(truncate_chars(&item.title, NEWS_TITLE_CHARS))
        .url(&item.link)
        .color(NEWS_COLOR)
        .footer(CreateEmbedFooter::new("Path of Exile 2 News"));

    let description = news_description(&item.description);
    if !description.is_empty() {
        embed = embed.description(description);
    }
    embed
}

#[async_trait]
impl NewsSink for DiscordNewsSink {
    async fn post(&self, channel_id: u64, item: &NewsItem) -> anyhow::Result<()> {
        debug!("Posting news '{}' to channel {}", item.title, channel_id);
        ChannelId::new(channel_id)
            .send_message(&self.http, CreateMessage::new().embed(news_embed(item)))
            .await?;
        Ok(())
    }
}
