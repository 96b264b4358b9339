#![deny(clippy::all, clippy::pedantic)]

use postdeck::application::remote::PostsApi;
use postdeck::domain::posts::{PostDraft, PostFilter, PostPatch};
use postdeck_api_types::PostId;
use tracing::debug;

use crate::args::Commands;
use crate::client::{CliError, Ctx};
use crate::io::{read_opt_value, read_value};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: Commands) -> Result<(), CliError> {
    match cmd {
        Commands::List { user_id } => list(ctx, PostFilter::from_input(user_id.as_deref())).await,
        Commands::Get { id } => get(ctx, &PostId::parse(&id)).await,
        Commands::Create {
            title,
            body,
            body_file,
            user_id,
        } => {
            let body = read_value(body, body_file)?;
            let draft = PostDraft::new(&title, &body, &user_id)?;
            create(ctx, &draft).await
        }
        Commands::Replace {
            id,
            title,
            body,
            body_file,
            user_id,
        } => {
            let body = read_value(body, body_file)?;
            let draft = PostDraft::new(&title, &body, &user_id)?;
            replace(ctx, &PostId::parse(&id), &draft).await
        }
        Commands::Patch {
            id,
            title,
            body,
            body_file,
            user_id,
        } => {
            let body = read_opt_value(body, body_file)?;
            let patch = PostPatch::new(title, body, user_id)?;
            patch_post(ctx, &PostId::parse(&id), &patch).await
        }
        Commands::Delete { id } => delete(ctx, &PostId::parse(&id)).await,
    }
}

async fn list(ctx: &Ctx, filter: PostFilter) -> Result<(), CliError> {
    debug!(%filter, "listing posts");
    let posts = ctx.api.list_posts(filter).await?;
    print_json(&posts)
}

async fn get(ctx: &Ctx, id: &PostId) -> Result<(), CliError> {
    let post = ctx.api.get_post(id).await?;
    print_json(&post)
}

async fn create(ctx: &Ctx, draft: &PostDraft) -> Result<(), CliError> {
    let post = ctx.api.create_post(draft).await?;
    print_json(&post)
}

async fn replace(ctx: &Ctx, id: &PostId, draft: &PostDraft) -> Result<(), CliError> {
    let post = ctx.api.replace_post(id, draft).await?;
    print_json(&post)
}

async fn patch_post(ctx: &Ctx, id: &PostId, patch: &PostPatch) -> Result<(), CliError> {
    let post = ctx.api.patch_post(id, patch).await?;
    print_json(&post)
}

async fn delete(ctx: &Ctx, id: &PostId) -> Result<(), CliError> {
    ctx.api.delete_post(id).await?;
    println!("deleted");
    Ok(())
}
