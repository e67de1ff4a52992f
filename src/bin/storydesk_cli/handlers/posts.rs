#![deny(clippy::all, clippy::pedantic)]

use storydesk::api_types::Post;
use storydesk::application::posts::PostForm;
use tracing::warn;

use crate::args::PostsCmd;
use crate::client::{CliError, Ctx};
use crate::handlers::entities;
use crate::io::read_json;
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: PostsCmd) -> Result<(), CliError> {
    match cmd {
        PostsCmd::List(args) => entities::list::<Post>(ctx, args).await,
        PostsCmd::Get { id } => entities::get::<Post>(ctx, &id).await,
        PostsCmd::Save {
            payload,
            contexts,
            include_in_container,
        } => {
            let post: Post = read_json(payload)?;
            save(
                ctx,
                PostForm {
                    post,
                    contexts,
                    include_in_container,
                },
            )
            .await
        }
        PostsCmd::Contexts { id } => {
            let ids = ctx.post_editor().contexts_for(&id).await?;
            print_json(&ids)
        }
        PostsCmd::Delete { id, policy } => {
            let editor = ctx.post_editor();
            let policy = policy.map_or(editor.policy(), Into::into);
            let deleted = editor.delete_with(&id, policy).await?;
            print_json(&deleted)
        }
    }
}

/// Prints the outcome even when some contexts failed, then reports the failure.
async fn save(ctx: &Ctx, form: PostForm) -> Result<(), CliError> {
    let saved = ctx.post_editor().save(form).await?;
    print_json(&saved)?;

    if saved.sync.is_complete() {
        return Ok(());
    }
    let failed = saved.sync.failed_ids().join(", ");
    warn!(post_id = saved.post.id.as_str(), failed = %failed, "post saved with unsynced contexts");
    Err(CliError::PartialSync {
        post_id: saved.post.id,
        failed,
    })
}
