#![deny(clippy::all, clippy::pedantic)]

use serde_json::{Value, json};
use storydesk::api_types::Entity;
use storydesk::application::{
    error::AppError,
    pagination::{ListQuery, fetch_all},
};

use crate::args::{EntityCmd, ListArgs};
use crate::client::{CliError, Ctx};
use crate::io::{merge_fields, read_json};
use crate::print::print_json;

pub async fn handle<E: Entity>(ctx: &Ctx, cmd: EntityCmd) -> Result<(), CliError> {
    match cmd {
        EntityCmd::List(args) => list::<E>(ctx, args).await,
        EntityCmd::Get { id } => get::<E>(ctx, &id).await,
        EntityCmd::Create(payload) => {
            let entity: E = read_json(payload)?;
            let created = ctx.store::<E>().add(entity).await?;
            print_json(&created)
        }
        EntityCmd::Update { id, payload } => {
            let patch: Value = read_json(payload)?;
            update::<E>(ctx, &id, patch).await
        }
        EntityCmd::Delete { id } => {
            ctx.store::<E>().remove(&id).await?;
            print_json(&json!({ "deleted": id, "collection": E::COLLECTION }))
        }
    }
}

pub async fn list<E: Entity>(ctx: &Ctx, args: ListArgs) -> Result<(), CliError> {
    if args.all {
        let items = fetch_all(&*ctx.repo::<E>(), ctx.settings.pagination.full_fetch_limit)
            .await
            .map_err(AppError::from)?;
        return print_json(&items);
    }

    let query = ListQuery::new(args.page, ctx.limit_or_default(args.limit), args.search);
    let page = ctx.store::<E>().load(&query).await?;
    print_json(&page)
}

pub async fn get<E: Entity>(ctx: &Ctx, id: &str) -> Result<(), CliError> {
    let entity = ctx.store::<E>().fetch(id).await?;
    print_json(&entity)
}

/// Fetch the stored record, overlay the given fields and write it back whole.
async fn update<E: Entity>(ctx: &Ctx, id: &str, patch: Value) -> Result<(), CliError> {
    let mut store = ctx.store::<E>();
    let current = store.fetch(id).await?;
    let mut merged: E = merge_fields(&current, patch)?;
    merged.set_id(id.to_string());
    let saved = store.update(merged).await?;
    print_json(&saved)
}
