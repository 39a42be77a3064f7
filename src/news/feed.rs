use super::{NewsItem, MAX_FEED_ITEMS};
use async_trait::async_trait;
use tracing::debug;

/// Source of the raw RSS document.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_feed(&self) -> anyhow::Result<String>;
}

pub struct RssFeedClient {
    http: reqwest::Client,
    url: String,
}

impl RssFeedClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl FeedSource for RssFeedClient {
    async fn fetch_feed(&self) -> anyhow::Result<String> {
        debug!("Fetching news feed {}", self.url);
        let response = self.http.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("news feed {} returned {}", self.url, status);
        }

        Ok(response.text().await?)
    }
}

/// Parses the first few items of an RSS document. Items without a title or
/// link are dropped.
pub fn parse_feed(xml: &str) -> anyhow::Result<Vec<NewsItem>> {
    let channel = rss::Channel::read_from(xml.as_bytes())?;

    Ok(channel
        .items()
        .iter()
        .take(MAX_FEED_ITEMS)
        .filter_map(|item| {
            Some(NewsItem {
                title: item.title()?.to_string(),
                link: item.link()?.to_string(),
                description: item.description().unwrap_or_default().to_string(),
                published_at: item.pub_date().unwrap_or_default().to_string(),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Path of Exile News</title>
    <link>https://www.pathofexile.com/news</link>
    <description>News</description>
    <item>
      <title>Path of Exile 2 Early Access Patch Notes</title>
      <link>https://www.pathofexile.com/forum/view-thread/1</link>
      <description><![CDATA[<p>Patch <b>0.1.0</b></p>]]></description>
      <pubDate>Wed, 04 Dec 2024 12:00:00 +0000</pubDate>
    </item>
    <item>
      <title>No link here</title>
      <pubDate>Tue, 03 Dec 2024 12:00:00 +0000</pubDate>
    </item>
    <item>
      <title>Bare item</title>
      <link>https://www.pathofexile.com/forum/view-thread/3</link>
    </item>
    <item><title>4</title><link>https://example.com/4</link></item>
    <item><title>5</title><link>https://example.com/5</link></item>
    <item><title>6</title><link>https://example.com/6</link></item>
  </channel>
</rss>"#;

    #[test]
    fn parses_head_of_feed() {
        let items = parse_feed(FEED).unwrap();
        // Five considered, one dropped for missing link
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].title, "Path of Exile 2 Early Access Patch Notes");
        assert_eq!(items[0].published_at, "Wed, 04 Dec 2024 12:00:00 +0000");
        assert_eq!(items[0].description, "<p>Patch <b>0.1.0</b></p>");
        assert_eq!(items[1].title, "Bare item");
        assert_eq!(items[1].description, "");
        assert_eq!(items[1].published_at, "");
        assert!(items.iter().all(|i| i.title != "6"));
    }

    #[test]
    fn rejects_non_rss() {
        assert!(parse_feed("not xml at all").is_err());
    }
}
