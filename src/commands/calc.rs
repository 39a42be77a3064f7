use super::{league_or_default, rates_footer, reply_error, send_embed};
use super::{COLOR_BLUE, COLOR_GOLD, COLOR_PURPLE, DISCORD_EMBED_FIELD_LIMIT};
use crate::currency::{calc::parse_bulk_pairs, BulkReport};
use crate::text::{format_number, split_args};
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

/// Currency calculators
#[poise::command(
    slash_command,
    subcommands("convert", "worth", "ratio", "bulk"),
    subcommand_required
)]
pub async fn calc(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Convert an amount of one currency into another
#[poise::command(slash_command)]
pub async fn convert(
    ctx: Context<'_>,
    #[description = "Amount to convert"] amount: f64,
    #[description = "Currency to convert from"] from_currency: String,
    #[description = "Currency to convert to"] to_currency: String,
    #[description = "League name (default: configured league)"] league: Option<String>,
) -> Result<(), Error> {
    let league = league_or_default(ctx, league);
    ctx.defer().await?;

    let conversion = match ctx
        .data()
        .currency
        .convert(&league, amount, &from_currency, &to_currency)
        .await
    {
        Ok(conversion) => conversion,
        Err(e) => return reply_error(ctx, &e).await,
    };

    let embed = serenity::CreateEmbed::new()
        .title("💱 Currency Conversion")
        .field(
            "From",
            format!("{} {}", format_number(conversion.amount, 2), conversion.from_name),
            true,
        )
        .field(
            "To",
            format!("{} {}", format_number(conversion.result, 2), conversion.to_name),
            true,
        )
        .field(
            "Via Chaos",
            format!("{} Chaos Orbs", format_number(conversion.chaos_value, 2)),
            false,
        )
        .color(COLOR_BLUE)
        .footer(rates_footer(&league));
    send_embed(ctx, embed).await
}

/// Value of a stack of currency
#[poise::command(slash_command)]
pub async fn worth(
    ctx: Context<'_>,
    #[description = "Stack size"] amount: f64,
    #[description = "Currency name"] currency_name: String,
    #[description = "League name (default: configured league)"] league: Option<String>,
) -> Result<(), Error> {
    let league = league_or_default(ctx, league);
    ctx.defer().await?;

    let currency = &ctx.data().currency;
    let worth = match currency.worth(&league, amount, &currency_name).await {
        Ok(worth) => worth,
        Err(e) => return reply_error(ctx, &e).await,
    };

    let embed = serenity::CreateEmbed::new()
        .title(format!(
            "💰 Stack Value: {} {}",
            format_number(worth.amount, 0),
            worth.name
        ))
        .field(
            "Worth in Chaos Orbs",
            format!("{} Chaos", format_number(worth.chaos_worth, 2)),
            false,
        )
        .field(
            format!("Worth in {}", currency.reference_name()),
            format!("{} {}", format_number(worth.reference_worth, 2), currency.reference_name()),
            false,
        )
        .color(COLOR_GOLD)
        .footer(rates_footer(&league));
    send_embed(ctx, embed).await
}

/// Exchange ratio between two currencies
#[poise::command(slash_command)]
pub async fn ratio(
    ctx: Context<'_>,
    #[description = "First currency"] currency1: String,
    #[description = "Second currency"] currency2: String,
    #[description = "League name (default: configured league)"] league: Option<String>,
) -> Result<(), Error> {
    let league = league_or_default(ctx, league);
    ctx.defer().await?;

    let ratio = match ctx.data().currency.ratio(&league, &currency1, &currency2).await {
        Ok(ratio) => ratio,
        Err(e) => return reply_error(ctx, &e).await,
    };

    let embed = serenity::CreateEmbed::new()
        .title("📊 Currency Exchange Ratio")
        .field(
            format!("1 {} =", ratio.first_name),
            format!("{} {}", format_number(ratio.first_in_second, 2), ratio.second_name),
            false,
        )
        .field(
            format!("1 {} =", ratio.second_name),
            format!("{} {}", format_number(ratio.second_in_first, 4), ratio.first_name),
            false,
        )
        .field(
            "Chaos Values",
            format!(
                "{}: {}c\n{}: {}c",
                ratio.first_name,
                format_number(ratio.first_rate, 2),
                ratio.second_name,
                format_number(ratio.second_rate, 2)
            ),
            false,
        )
        .color(COLOR_PURPLE)
        .footer(rates_footer(&league));
    send_embed(ctx, embed).await
}

/// Total value of several currency stacks
#[poise::command(slash_command)]
pub async fn bulk(
    ctx: Context<'_>,
    #[description = "Amount/currency pairs, e.g. 10 divine 500 \"chaos orb\""] items: String,
    #[description = "League name (default: configured league)"] league: Option<String>,
) -> Result<(), Error> {
    let league = league_or_default(ctx, league);

    let pairs = match parse_bulk_pairs(&split_args(&items)) {
        Ok(pairs) => pairs,
        Err(e) => return reply_error(ctx, &e).await,
    };

    ctx.defer().await?;
    let currency = &ctx.data().currency;
    let report = match currency.bulk(&league, &pairs).await {
        Ok(report) => report,
        Err(e) => return reply_error(ctx, &e).await,
    };

    let embed = bulk_embed(&report, currency.reference_name()).footer(rates_footer(&league));
    let mut reply = poise::CreateReply::default().embed(embed);
    if !report.missing.is_empty() {
        reply = reply.content(format!(
            "⚠️ Could not find: {}",
            report
                .missing
                .iter()
                .map(|m| format!("`{}`", m))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    ctx.send(reply).await?;
    Ok(())
}

fn bulk_embed(report: &BulkReport, reference: &str) -> serenity::CreateEmbed {
    // Two fields are reserved for the separator and the total
    let shown = DISCORD_EMBED_FIELD_LIMIT - 2;
    serenity::CreateEmbed::new()
        .title("💼 Bulk Currency Calculator")
        .fields(report.lines.iter().take(shown).map(|line| {
            (
                format!("{} {}", format_number(line.amount, 0), line.name),
                format!("{} Chaos", format_number(line.value, 2)),
                true,
            )
        }))
        .field("━━━━━━━━━━━━━━━", "** **", false)
        .field(
            "💰 Total Value",
            format!(
                "**{} Chaos Orbs**\n**{} {}**",
                format_number(report.total_chaos, 2),
                format_number(report.total_reference, 2),
                reference
            ),
            false,
        )
        .color(COLOR_BLUE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::BulkLine;

    #[test]
    fn test_bulk_card_stays_within_field_limit() {
        let report = BulkReport {
            lines: (0..40)
                .map(|i| BulkLine {
                    amount: 1.0,
                    name: format!("Currency {}", i),
                    value: 1.0,
                })
                .collect(),
            missing: Vec::new(),
            total_chaos: 40.0,
            total_reference: 40.0 / 180.0,
        };

        let embed = serde_json::to_value(bulk_embed(&report, "Divine Orb")).unwrap();
        let fields = embed["fields"].as_array().unwrap();
        assert_eq!(fields.len(), DISCORD_EMBED_FIELD_LIMIT);
        assert_eq!(fields.last().unwrap()["name"], "💰 Total Value");
    }
}
