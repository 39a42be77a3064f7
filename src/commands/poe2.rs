use super::{league_or_default, reply_error, send_embed, wiki_url};
use super::{COLOR_BLUE, COLOR_GOLD, COLOR_PURPLE, COLOR_RED};
use crate::services::{BuildService, GuildSettingsService};
use crate::text::format_number;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;
use tracing::info;

const TOP_RATES: usize = 10;

/// Path of Exile 2 commands
#[poise::command(
    slash_command,
    subcommands(
        "wiki", "league", "guides", "passive", "gems", "price", "currency", "setnews",
        "unsetnews", "settings"
    ),
    subcommand_required
)]
pub async fn poe2(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Search the Path of Exile 2 wiki
#[poise::command(slash_command)]
pub async fn wiki(
    ctx: Context<'_>,
    #[description = "Search query for the PoE2 wiki"] query: String,
) -> Result<(), Error> {
    let embed = serenity::CreateEmbed::new()
        .title(format!("PoE2 Wiki: {}", query.trim()))
        .description(format!("[Click here to view on wiki]({})", wiki_url(&query)))
        .color(COLOR_GOLD)
        .footer(serenity::CreateEmbedFooter::new("Path of Exile 2 Wiki"));
    send_embed(ctx, embed).await
}

/// Current Path of Exile 2 status
#[poise::command(slash_command)]
pub async fn league(ctx: Context<'_>) -> Result<(), Error> {
    let embed = serenity::CreateEmbed::new()
        .title("Path of Exile 2 - Current Status")
        .description("Path of Exile 2 is currently in Early Access")
        .field(
            "Early Access Info",
            "PoE2 is available for Early Access supporters",
            false,
        )
        .color(COLOR_RED)
        .footer(serenity::CreateEmbedFooter::new("Visit pathofexile.com for more info"));
    send_embed(ctx, embed).await
}

/// Links to useful guides and tools
#[poise::command(slash_command)]
pub async fn guides(ctx: Context<'_>) -> Result<(), Error> {
    let embed = serenity::CreateEmbed::new()
        .title("Path of Exile 2 - Guides & Resources")
        .field(
            "Official Resources",
            "[Official Website](https://www.pathofexile.com/poe2)\n\
             [PoE2 Wiki](https://www.poewiki.net/)",
            false,
        )
        .field(
            "Community",
            "[Reddit: r/PathOfExile2](https://reddit.com/r/pathofexile2)\n\
             [Official Forums](https://www.pathofexile.com/forum)",
            false,
        )
        .field(
            "Tools",
            "[Path of Building](https://pathofbuilding.community/)\n\
             [poe.ninja Builds](https://poe.ninja/poe2/builds)\n\
             [Trade Site](https://www.pathofexile.com/trade2/search)",
            false,
        )
        .color(COLOR_PURPLE);
    send_embed(ctx, embed).await
}

/// Link to the passive skill tree
#[poise::command(slash_command)]
pub async fn passive(ctx: Context<'_>) -> Result<(), Error> {
    let embed = serenity::CreateEmbed::new()
        .title("Path of Exile 2 - Passive Tree")
        .description("[View the Passive Skill Tree](https://www.pathofexile.com/passive-skill-tree/poe2)")
        .color(COLOR_BLUE);
    send_embed(ctx, embed).await
}

/// Look up a skill gem on the wiki
#[poise::command(slash_command)]
pub async fn gems(
    ctx: Context<'_>,
    #[description = "Skill gem name"] gem_name: String,
) -> Result<(), Error> {
    let embed = serenity::CreateEmbed::new()
        .title(format!("💎 Skill Gem: {}", gem_name.trim()))
        .description(format!("[View gem details on wiki]({})", wiki_url(&gem_name)))
        .color(COLOR_PURPLE);
    send_embed(ctx, embed).await
}

/// Check a currency price from poe.ninja
#[poise::command(slash_command)]
pub async fn price(
    ctx: Context<'_>,
    #[description = "Currency name, e.g. Divine Orb"] item_name: String,
    #[description = "League name (default: configured league)"] league: Option<String>,
) -> Result<(), Error> {
    let league = league_or_default(ctx, league);
    ctx.defer().await?;

    let record = match ctx.data().currency.price(&league, item_name.trim()).await {
        Ok(record) => record,
        Err(e) => return reply_error(ctx, &e).await,
    };

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("💰 {}", record.name))
        .field(
            "Chaos Value",
            format!("{} Chaos Orbs", format_number(record.chaos_equivalent, 2)),
            false,
        )
        .color(COLOR_GOLD)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "League: {} | Data from poe.ninja",
            league
        )));

    if let Some(change) = record.seven_day_change.filter(|c| *c != 0.0) {
        let trend = if change > 0.0 { "📈" } else { "📉" };
        embed = embed.field("7-Day Change", format!("{} {:.2}%", trend, change), true);
    }

    send_embed(ctx, embed).await
}

/// Top currency values in chaos orbs
#[poise::command(slash_command)]
pub async fn currency(
    ctx: Context<'_>,
    #[description = "League name (default: configured league)"] league: Option<String>,
) -> Result<(), Error> {
    let league = league_or_default(ctx, league);
    ctx.defer().await?;

    let top = match ctx.data().currency.top_rates(&league, TOP_RATES).await {
        Ok(top) => top,
        Err(e) => return reply_error(ctx, &e).await,
    };

    let embed = serenity::CreateEmbed::new()
        .title(format!("💱 Currency Rates - {}", league))
        .description("Top currency values in Chaos Orbs")
        .fields(top.iter().map(|record| {
            (
                record.name.clone(),
                format!("{} Chaos", format_number(record.chaos_equivalent, 2)),
                true,
            )
        }))
        .color(COLOR_GOLD)
        .footer(serenity::CreateEmbedFooter::new("Data from poe.ninja"));
    send_embed(ctx, embed).await
}

/// Set the channel for PoE2 news posts
#[poise::command(slash_command, required_permissions = "MANAGE_GUILD", guild_only)]
pub async fn setnews(
    ctx: Context<'_>,
    #[description = "Channel to post news in"]
    #[channel_types("Text", "News")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;
    if channel.guild_id != guild_id {
        ctx.say("❌ That channel is not in this server.").await?;
        return Ok(());
    }

    let service = GuildSettingsService::new(ctx.data().db.clone());
    if let Err(e) = service.set_news_channel(guild_id.get(), channel.id.get()).await {
        return reply_error(ctx, &e).await;
    }

    info!("{} set news channel {} in guild {}", ctx.author().name, channel.id, guild_id);
    ctx.say(format!("✅ PoE2 news will be posted in <#{}>", channel.id))
        .await?;
    Ok(())
}

/// Stop posting PoE2 news
#[poise::command(slash_command, required_permissions = "MANAGE_GUILD", guild_only)]
pub async fn unsetnews(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;

    let service = GuildSettingsService::new(ctx.data().db.clone());
    if let Err(e) = service.unset_news_channel(guild_id.get()).await {
        return reply_error(ctx, &e).await;
    }

    ctx.say("✅ PoE2 news feed disabled.").await?;
    Ok(())
}

/// Show this server's PoE2 settings
#[poise::command(slash_command, required_permissions = "MANAGE_GUILD", guild_only)]
pub async fn settings(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;
    let db = ctx.data().db.clone();

    let settings = GuildSettingsService::new(db.clone()).get(guild_id.get()).await;
    let builds = BuildService::new(db).count_builds(guild_id.get()).await;
    let (settings, builds) = match (settings, builds) {
        (Ok(s), Ok(b)) => (s, b),
        (Err(e), _) | (_, Err(e)) => return reply_error(ctx, &e).await,
    };

    let channel = settings
        .news_channel_id
        .as_deref()
        .map(|id| format!("<#{}>", id))
        .unwrap_or_else(|| "Not set".to_string());
    let marker = settings
        .last_news_check
        .as_deref()
        .map(|m| format!("`{}`", m))
        .unwrap_or_else(|| "Never".to_string());

    let embed = serenity::CreateEmbed::new()
        .title("⚙️ PoE2 Settings")
        .field("News Channel", channel, true)
        .field("Last News Check", marker, true)
        .field("Saved Builds", builds.to_string(), true)
        .field("Default League", format!("`{}`", ctx.data().config.default_league), true)
        .color(COLOR_BLUE);

    send_embed(ctx, embed).await
}
