use super::{reply_error, send_embed};
use super::{COLOR_GOLD, COLOR_ORANGE, COLOR_PURPLE};
use crate::crafting::{craft_cost, craft_odds};
use crate::text::format_number;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

/// Crafting helper commands
#[poise::command(
    slash_command,
    subcommands("cost", "odds", "guide"),
    subcommand_required
)]
pub async fn craft(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Total cost of a number of crafting attempts
#[poise::command(slash_command)]
pub async fn cost(
    ctx: Context<'_>,
    #[description = "Number of crafting attempts"] attempts: i64,
    #[description = "Cost per attempt in chaos orbs"] cost_per_attempt: f64,
) -> Result<(), Error> {
    let rate = ctx.data().config.chaos_per_divine_estimate;
    let cost = match craft_cost(attempts, cost_per_attempt, rate) {
        Ok(cost) => cost,
        Err(e) => return reply_error(ctx, &e).await,
    };

    let embed = serenity::CreateEmbed::new()
        .title("🔨 Crafting Cost Calculator")
        .field("Attempts", format_number(cost.attempts as f64, 0), true)
        .field("Cost per Attempt", format!("{} Chaos", cost.unit_cost), true)
        .field("Total Cost", format!("{} Chaos", format_number(cost.total, 2)), false)
        .field(
            "In Divine Orbs",
            format!("≈ {} Divine", format_number(cost.secondary_total, 2)),
            true,
        )
        .color(COLOR_ORANGE)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Assuming {} chaos per divine",
            rate
        )));
    send_embed(ctx, embed).await
}

/// Chance of at least one success over several attempts
#[poise::command(slash_command)]
pub async fn odds(
    ctx: Context<'_>,
    #[description = "Success chance per attempt in percent (0-100)"] success_chance: f64,
    #[description = "Number of attempts"] attempts: i64,
) -> Result<(), Error> {
    let odds = match craft_odds(success_chance / 100.0, attempts) {
        Ok(odds) => odds,
        Err(e) => return reply_error(ctx, &e).await,
    };

    let embed = serenity::CreateEmbed::new()
        .title("🎲 Crafting Probability Calculator")
        .field("Success Chance per Attempt", format!("{}%", success_chance), true)
        .field("Number of Attempts", format_number(odds.attempts as f64, 0), true)
        .field(
            "Chance of At Least 1 Success",
            format!("{:.2}%", odds.at_least_one * 100.0),
            false,
        )
        .field(
            "Expected Attempts for Success",
            format!("{:.1} attempts", odds.expected_attempts),
            true,
        )
        .color(COLOR_PURPLE);
    send_embed(ctx, embed).await
}

/// Links to crafting guides
#[poise::command(slash_command)]
pub async fn guide(ctx: Context<'_>) -> Result<(), Error> {
    let embed = serenity::CreateEmbed::new()
        .title("🔨 Crafting Guides & Resources")
        .field(
            "Official Resources",
            "[PoE2 Wiki - Crafting](https://www.poewiki.net/wiki/Crafting)\n\
             [Item Mods Database](https://www.poewiki.net/wiki/Modifiers)",
            false,
        )
        .field(
            "Community Guides",
            "Check [Reddit](https://reddit.com/r/pathofexile2) for community crafting guides",
            false,
        )
        .color(COLOR_GOLD);
    send_embed(ctx, embed).await
}
