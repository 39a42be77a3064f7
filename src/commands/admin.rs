use crate::{Context, Error};
use tracing::info;

/// Stop the bot and its news poller (owner only)
#[poise::command(slash_command, owners_only, hide_in_help)]
pub async fn shutdown(ctx: Context<'_>) -> Result<(), Error> {
    info!(
        "Shutdown requested by {} ({}) in {:?}",
        ctx.author().name,
        ctx.author().id,
        ctx.guild_id()
    );
    ctx.send(
        poise::CreateReply::default()
            .content("👋 Stopping shards and the news poller...")
            .ephemeral(true),
    )
    .await?;
    // Client::start returns once every shard is down; main then stops the poller
    ctx.framework().shard_manager().shutdown_all().await;
    Ok(())
}
