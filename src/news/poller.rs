use super::feed::parse_feed;
use super::{select_new_items, FeedSource, NewsItem, NewsSink};
use crate::db::{Database, NewsDestination};
use anyhow::Context as AnyhowContext;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info};

/// Republishes relevant feed items to every guild with a news channel.
pub struct NewsPoller {
    db: Database,
    feed: Arc<dyn FeedSource>,
    sink: Arc<dyn NewsSink>,
    poll_interval: Duration,
}

/// Owner of a running poller. Dropping it without `shutdown` also stops the
/// loop at its next wait, but nothing awaits the task.
pub struct PollerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Interrupts the wait for the next cycle and waits for the task to end.
    /// A cycle already in flight is allowed to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            error!("News poller task ended abnormally: {}", e);
        }
    }
}

impl NewsPoller {
    pub fn new(
        db: Database,
        feed: Arc<dyn FeedSource>,
        sink: Arc<dyn NewsSink>,
        poll_interval_secs: u64,
    ) -> Self {
        Self {
            db,
            feed,
            sink,
            poll_interval: Duration::from_secs(poll_interval_secs.max(1)),
        }
    }

    pub fn spawn(self) -> PollerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        PollerHandle { shutdown_tx, task }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("News poller started (every {:?})", self.poll_interval);
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }
            match self.poll_once().await {
                Ok(0) => debug!("News poller: nothing to post"),
                Ok(n) => info!("News poller: posted {} items", n),
                Err(e) => error!("News poll cycle failed: {:#}", e),
            }
        }

        info!("News poller stopped");
    }

    /// Runs one cycle: one feed fetch shared by all destinations. A failing
    /// destination is logged and skipped. Returns the number of posts made.
    pub async fn poll_once(&self) -> anyhow::Result<usize> {
        let destinations = self
            .db
            .run_blocking(|db| db.list_news_destinations())
            .await?;
        if destinations.is_empty() {
            return Ok(0);
        }

        let xml = self.feed.fetch_feed().await?;
        let items = parse_feed(&xml).context("parsing news feed")?;

        let mut posted = 0;
        for destination in destinations {
            match self.poll_destination(&destination, &items).await {
                Ok(n) => posted += n,
                Err(e) => error!(
                    "News poll for guild {} failed: {:#}",
                    destination.guild_id, e
                ),
            }
        }
        Ok(posted)
    }

    async fn poll_destination(
        &self,
        destination: &NewsDestination,
        items: &[NewsItem],
    ) -> anyhow::Result<usize> {
        let channel_id: u64 = destination
            .channel_id
            .parse()
            .ok()
            .filter(|id| *id != 0)
            .with_context(|| format!("Invalid news channel_id '{}'", destination.channel_id))?;

        let fresh = select_new_items(items, destination.last_news_check.as_deref());
        for item in &fresh {
            self.sink.post(channel_id, item).await?;
        }

        let guild_id = destination.guild_id.clone();
        let marker = Utc::now().to_rfc3339();
        self.db
            .run_blocking(move |db| db.set_last_news_check(&guild_id, &marker))
            .await?;

        debug!(
            "News poll for guild {}: {} new items",
            destination.guild_id,
            fresh.len()
        );
        Ok(fresh.len())
    }
}
