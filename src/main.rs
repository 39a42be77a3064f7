use poe2bot::currency::{CurrencyService, NinjaClient};
use poe2bot::db::Database;
use poe2bot::news::{DiscordNewsSink, NewsPoller, PollerHandle, RssFeedClient};
use poe2bot::{commands, config::Config, Data};
use poise::serenity_prelude as serenity;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration: {:?}", config);
    let discord_token = config.discord_token.clone();

    if let Some(parent) = Path::new(&config.database_url).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let db = Database::new(&config)?;
    db.execute_init()?;

    // One outbound session; the currency and feed clients share its pool
    let http_client = reqwest::Client::builder()
        .user_agent(config.http_user_agent.clone())
        .build()?;
    let currency = CurrencyService::new(
        Arc::new(NinjaClient::new(http_client.clone(), config.currency_api_url.clone())),
        config.reference_currency.clone(),
    );

    let owners: HashSet<serenity::UserId> = config
        .owner_id
        .filter(|id| *id != 0)
        .map(serenity::UserId::new)
        .into_iter()
        .collect();

    // Filled once the gateway is ready; taken again on shutdown.
    let poller_slot: Arc<Mutex<Option<PollerHandle>>> = Arc::new(Mutex::new(None));
    let setup_slot = poller_slot.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            owners,
            on_error: |error| {
                Box::pin(async move {
                    if let poise::FrameworkError::Command { error, ctx, .. } = &error {
                        error!("Command /{} failed: {}", ctx.command().qualified_name, error);
                    }
                    if let Err(e) = poise::builtins::on_error(error).await {
                        error!("Error while handling error: {}", e);
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot is ready as {}!", ready.user.name);

                if config.register_commands {
                    let commands = &framework.options().commands;
                    match config.dev_guild_id.filter(|id| *id != 0) {
                        Some(guild_id) => {
                            poise::builtins::register_in_guild(ctx, commands, serenity::GuildId::new(guild_id))
                                .await?;
                            info!("Registered commands in guild {}", guild_id);
                        }
                        None => {
                            poise::builtins::register_globally(ctx, commands).await?;
                            info!("Registered commands globally");
                        }
                    }
                }

                // Set bot status
                ctx.set_activity(Some(serenity::ActivityData::custom(&config.status_message)));

                let poller = NewsPoller::new(
                    db.clone(),
                    Arc::new(RssFeedClient::new(http_client.clone(), config.news_feed_url.clone())),
                    Arc::new(DiscordNewsSink::new(ctx.http.clone())),
                    config.news_poll_interval_secs,
                );
                match setup_slot.lock() {
                    Ok(mut slot) if slot.is_none() => *slot = Some(poller.spawn()),
                    Ok(_) => warn!("News poller already running, not starting another"),
                    Err(_) => error!("Poller slot poisoned, news poller not started"),
                }

                Ok(Data {
                    config,
                    db,
                    currency,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, shutting down...");
                shard_manager.shutdown_all().await;
            }
            Err(e) => error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    let handle = poller_slot.lock().ok().and_then(|mut slot| slot.take());
    if let Some(handle) = handle {
        info!("Stopping news poller...");
        handle.shutdown().await;
    }

    info!("Shutdown complete");
    Ok(())
}
