#![deny(clippy::all, clippy::pedantic)]

use serde_json::json;
use storydesk::application::master_data::MasterData;

use crate::args::MasterDataCmd;
use crate::client::{CliError, Ctx};
use crate::print::print_json;

/// A collection that fails to load is reported next to the others, not fatal.
pub async fn handle(ctx: &Ctx, cmd: MasterDataCmd) -> Result<(), CliError> {
    let data = MasterData::load(
        &ctx.repos.master_data(),
        ctx.settings.pagination.full_fetch_limit,
    )
    .await;

    match cmd {
        MasterDataCmd::Summary => print_json(&json!({
            "counts": data.summary(),
            "failures": data.failures,
        })),
        MasterDataCmd::Dump => print_json(&data),
    }
}
