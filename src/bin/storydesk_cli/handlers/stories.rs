#![deny(clippy::all, clippy::pedantic)]

use crate::args::StoriesCmd;
use crate::client::{CliError, Ctx};
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, cmd: StoriesCmd) -> Result<(), CliError> {
    let stories = ctx.stories();
    match cmd {
        StoriesCmd::View {
            context_id,
            page,
            limit,
        } => {
            let view = stories
                .view(&context_id, page, ctx.limit_or_default(limit))
                .await?;
            print_json(&view)
        }
        StoriesCmd::Reorder { context_id, order } => {
            let context = stories.reorder(&context_id, &order).await?;
            print_json(&context.posts)
        }
        StoriesCmd::Include {
            context_id,
            post_id,
        } => {
            let context = stories.set_included(&context_id, &post_id, true).await?;
            print_json(&context.posts)
        }
        StoriesCmd::Exclude {
            context_id,
            post_id,
        } => {
            let context = stories.set_included(&context_id, &post_id, false).await?;
            print_json(&context.posts)
        }
    }
}
