pub mod feed;
pub mod poller;
pub mod sink;

pub use feed::{FeedSource, RssFeedClient};
pub use poller::{NewsPoller, PollerHandle};
pub use sink::{DiscordNewsSink, NewsSink};

/// Only the head of the feed is considered each cycle.
pub const MAX_FEED_ITEMS: usize = 5;

/// Lowercase phrases a title must contain to be posted.
pub const NEWS_KEYWORDS: [&str; 2] = ["path of exile 2", "poe2"];

/// A feed entry, alive for one poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub description: String,
    /// Feed-native publication date, never parsed.
    pub published_at: String,
}

pub fn is_relevant(title: &str) -> bool {
    let lowered = title.to_lowercase();
    NEWS_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

/// Picks the items to post, oldest first.
///
/// An item is new when its raw date string sorts after the raw marker; no
/// calendar parsing happens, so feeds with mixed date formats or month names
/// can be misjudged. A missing marker admits every item with a date.
pub fn select_new_items(items: &[NewsItem], marker: Option<&str>) -> Vec<NewsItem> {
    let marker = marker.unwrap_or("");
    items
        .iter()
        .filter(|item| item.published_at.as_str() > marker)
        .filter(|item| is_relevant(&item.title))
        .rev()
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, date: &str) -> NewsItem {
        NewsItem {
            title: title.to_string(),
            link: format!("https://example.com/{}", date),
            description: String::new(),
            published_at: date.to_string(),
        }
    }

    #[test]
    fn only_items_after_marker_are_new() {
        let items = vec![
            item("Path of Exile 2 patch notes", "2023-12-31"),
            item("Path of Exile 2 patch notes", "2024-01-02"),
        ];
        let fresh = select_new_items(&items, Some("2024-01-01"));
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].published_at, "2024-01-02");
    }

    #[test]
    fn only_keyword_titles_are_posted() {
        let items = vec![
            item("PoE2 0.1.1 hotfix", "2024-01-05"),
            item("Settlers league recap", "2024-01-04"),
            item("Path of Exile 2: Early Access", "2024-01-03"),
        ];
        let titles: Vec<_> = select_new_items(&items, Some("2024-01-01"))
            .into_iter()
            .map(|i| i.title)
            .collect();
        // Feed lists newest first; posting goes oldest first
        assert_eq!(titles, vec!["Path of Exile 2: Early Access", "PoE2 0.1.1 hotfix"]);
    }

    #[test]
    fn missing_marker_admits_dated_items() {
        let items = vec![item("poe2 news", "Wed, 04 Dec 2024"), item("poe2 undated", "")];
        let fresh = select_new_items(&items, None);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].title, "poe2 news");
    }

    #[test]
    fn comparison_is_lexicographic() {
        // "Wed, ..." sorts after any ISO marker: the known limitation of raw comparison
        let items = vec![item("poe2 old news", "Mon, 01 Jan 2001 00:00:00 +0000")];
        assert_eq!(select_new_items(&items, Some("2024-12-31T00:00:00+00:00")).len(), 1);
    }
}
