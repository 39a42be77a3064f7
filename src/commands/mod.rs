pub mod admin;
pub mod build;
pub mod calc;
pub mod craft;
pub mod poe2;

use crate::error::BotError;
use crate::{Context, Data, Error};
use poise::serenity_prelude as serenity;
use tracing::{error, warn};

pub const COLOR_GOLD: u32 = 0xF1C40F;
pub const COLOR_RED: u32 = 0xE74C3C;
pub const COLOR_PURPLE: u32 = 0x9B59B6;
pub const COLOR_BLUE: u32 = 0x3498DB;
pub const COLOR_ORANGE: u32 = 0xE67E22;

/// Discord caps an embed at 25 fields.
pub const DISCORD_EMBED_FIELD_LIMIT: usize = 25;

/// Every top-level command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        poe2::poe2(),
        calc::calc(),
        build::build(),
        craft::craft(),
        admin::shutdown(),
    ]
}

/// Shows a domain failure to the invoking user.
pub(crate) async fn reply_error(ctx: Context<'_>, err: &BotError) -> Result<(), Error> {
    match err {
        BotError::Storage(e) => error!("Command /{} storage failure: {:#}", ctx.command().qualified_name, e),
        BotError::FetchFailed(detail) => {
            warn!("Command /{} upstream failure: {}", ctx.command().qualified_name, detail)
        }
        _ => {}
    }
    ctx.send(
        poise::CreateReply::default()
            .content(err.user_message())
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

pub(crate) async fn send_embed(ctx: Context<'_>, embed: serenity::CreateEmbed) -> Result<(), Error> {
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// The league argument, or the configured default when omitted.
pub(crate) fn league_or_default(ctx: Context<'_>, league: Option<String>) -> String {
    league
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| ctx.data().config.default_league.clone())
}

pub(crate) fn rates_footer(league: &str) -> serenity::CreateEmbedFooter {
    serenity::CreateEmbedFooter::new(format!("League: {} | Rates from poe.ninja", league))
}

/// Wiki page for a free-text title.
pub fn wiki_url(query: &str) -> String {
    format!("https://www.poewiki.net/wiki/{}", query.trim().replace(' ', "_"))
}
