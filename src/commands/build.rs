use super::{reply_error, send_embed};
use super::{COLOR_BLUE, COLOR_GOLD, DISCORD_EMBED_FIELD_LIMIT};
use crate::db::BuildRecord;
use crate::services::BuildService;
use crate::text::truncate_chars;
use crate::{Context, Error};
use poise::serenity_prelude as serenity;

const COLOR_GREEN: u32 = 0x2ECC71;
const LIST_SNIPPET_CHARS: usize = 50;

/// Build management commands
#[poise::command(
    slash_command,
    subcommands("save", "get", "list", "delete", "share", "favorite", "favorites"),
    subcommand_required,
    guild_only
)]
pub async fn build(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Save a build to the server database
#[poise::command(slash_command, guild_only)]
pub async fn save(
    ctx: Context<'_>,
    #[description = "Name for your build"] build_name: String,
    #[description = "Build details (class, skills, PoB code, etc.)"] build_info: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;
    let author = ctx.author();

    let service = BuildService::new(ctx.data().db.clone());
    let saved = match service
        .create_build(guild_id.get(), &build_name, &build_info, &author.name, author.id.get())
        .await
    {
        Ok(saved) => saved,
        Err(e) => return reply_error(ctx, &e).await,
    };

    ctx.say(format!(
        "✅ Build `{}` has been saved to the server database!",
        saved.name
    ))
    .await?;
    Ok(())
}

/// Retrieve a saved build
#[poise::command(slash_command, guild_only)]
pub async fn get(
    ctx: Context<'_>,
    #[description = "Name of the build to retrieve"] build_name: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;

    let service = BuildService::new(ctx.data().db.clone());
    match service.get_build(guild_id.get(), &build_name).await {
        Ok(build) => send_embed(ctx, build_card(&build)).await,
        Err(e) => reply_error(ctx, &e).await,
    }
}

/// List the builds saved in this server
#[poise::command(slash_command, guild_only)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;

    let service = BuildService::new(ctx.data().db.clone());
    let (builds, total) = match service
        .list_builds(guild_id.get(), DISCORD_EMBED_FIELD_LIMIT)
        .await
    {
        Ok(listing) => listing,
        Err(e) => return reply_error(ctx, &e).await,
    };

    if builds.is_empty() {
        ctx.say("📭 No builds saved yet! Use `/build save` to add one.")
            .await?;
        return Ok(());
    }

    let mut embed = serenity::CreateEmbed::new()
        .title("📚 Saved Builds")
        .fields(builds.iter().map(|build| {
            (
                build.name.clone(),
                format!(
                    "By: {}\n{}",
                    build.author,
                    truncate_chars(&build.info, LIST_SNIPPET_CHARS)
                ),
                false,
            )
        }))
        .color(COLOR_GREEN);
    if total > builds.len() {
        embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
            "Showing {} of {} builds",
            builds.len(),
            total
        )));
    }

    send_embed(ctx, embed).await
}

/// Delete a saved build (author or Manage Messages only)
#[poise::command(slash_command, guild_only)]
pub async fn delete(
    ctx: Context<'_>,
    #[description = "Name of the build to delete"] build_name: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;
    let privileged = ctx
        .author_member()
        .await
        .and_then(|member| member.permissions)
        .map(|perms| perms.contains(serenity::Permissions::MANAGE_MESSAGES))
        .unwrap_or(false);

    let service = BuildService::new(ctx.data().db.clone());
    if let Err(e) = service
        .delete_build(guild_id.get(), &build_name, ctx.author().id.get(), privileged)
        .await
    {
        return reply_error(ctx, &e).await;
    }

    ctx.say(format!("🗑️ Build `{}` has been deleted.", build_name.trim()))
        .await?;
    Ok(())
}

/// Share a Path of Building code or link
#[poise::command(slash_command)]
pub async fn share(
    ctx: Context<'_>,
    #[description = "Path of Building code or pastebin link"] pob_code: String,
) -> Result<(), Error> {
    let code = pob_code.trim();
    if code.is_empty() {
        ctx.say("❌ Please provide a Path of Building (PoB) code or pastebin link!")
            .await?;
        return Ok(());
    }

    let embed = serenity::CreateEmbed::new()
        .title("📊 Path of Building Build")
        .description(format!("**Code/Link:** {}", truncate_chars(code, 3900)))
        .field(
            "How to Import",
            "1. Open Path of Building\n2. Click 'Import/Export Build'\n3. Paste the code or URL",
            false,
        )
        .color(COLOR_BLUE)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Shared by {}",
            ctx.author().name
        )));
    send_embed(ctx, embed).await
}

/// Add or remove a build from your favourites
#[poise::command(slash_command, guild_only)]
pub async fn favorite(
    ctx: Context<'_>,
    #[description = "Name of the build"] build_name: String,
) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;

    let service = BuildService::new(ctx.data().db.clone());
    let (name, added) = match service
        .toggle_favorite(guild_id.get(), ctx.author().id.get(), &build_name)
        .await
    {
        Ok(toggled) => toggled,
        Err(e) => return reply_error(ctx, &e).await,
    };

    let message = if added {
        format!("⭐ Added `{}` to your favourites.", name)
    } else {
        format!("Removed `{}` from your favourites.", name)
    };
    ctx.send(poise::CreateReply::default().content(message).ephemeral(true))
        .await?;
    Ok(())
}

/// List your favourite builds
#[poise::command(slash_command, guild_only)]
pub async fn favorites(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("Must be run in a guild")?;

    let service = BuildService::new(ctx.data().db.clone());
    let favorites = match service.favorites(guild_id.get(), ctx.author().id.get()).await {
        Ok(favorites) => favorites,
        Err(e) => return reply_error(ctx, &e).await,
    };

    if favorites.is_empty() {
        ctx.send(
            poise::CreateReply::default()
                .content("📭 You have no favourite builds yet.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let lines: Vec<String> = favorites
        .iter()
        .map(|fav| match &fav.build {
            Some(build) => format!("• **{}** by {}", build.name, build.author),
            None => format!("• ~~{}~~ (no longer saved here)", fav.name),
        })
        .collect();

    let embed = serenity::CreateEmbed::new()
        .title("⭐ Your Favourite Builds")
        .description(truncate_chars(&lines.join("\n"), 4000))
        .color(COLOR_GOLD);
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

fn build_card(build: &BuildRecord) -> serenity::CreateEmbed {
    let created: String = build.created_at.chars().take(10).collect();
    serenity::CreateEmbed::new()
        .title(format!("🏹 {}", build.name))
        .description(&build.info)
        .field("Author", &build.author, true)
        .field("Created", created, true)
        .color(COLOR_BLUE)
}
