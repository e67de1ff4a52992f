//! storydesk-cli: command-line admin panel for the Storydesk CMS backend.
#![deny(clippy::all, clippy::pedantic)]

mod args;
mod client;
mod handlers;
mod io;
mod print;
#[cfg(test)]
mod tests;

use clap::Parser;
use storydesk::api_types::{
    ClarificationGuidance, Company, Context, Country, MarketData, QueryRefiner, Region, Sector,
    Signal, Source, SubSector, SubSignal, Theme, User,
};
use storydesk::config;
use storydesk::infra::telemetry;

use args::{Cli, Commands};
use client::{CliError, build_ctx};
use handlers::{auth, entities, master_data, posts, stories};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let settings = config::load(&cli.global)?;
    telemetry::init(&settings.logging)?;
    let ctx = build_ctx(settings)?;

    match cli.command {
        Commands::Regions(cmd) => entities::handle::<Region>(&ctx, cmd.action).await?,
        Commands::Countries(cmd) => entities::handle::<Country>(&ctx, cmd.action).await?,
        Commands::Sectors(cmd) => entities::handle::<Sector>(&ctx, cmd.action).await?,
        Commands::SubSectors(cmd) => entities::handle::<SubSector>(&ctx, cmd.action).await?,
        Commands::Signals(cmd) => entities::handle::<Signal>(&ctx, cmd.action).await?,
        Commands::SubSignals(cmd) => entities::handle::<SubSignal>(&ctx, cmd.action).await?,
        Commands::Companies(cmd) => entities::handle::<Company>(&ctx, cmd.action).await?,
        Commands::Sources(cmd) => entities::handle::<Source>(&ctx, cmd.action).await?,
        Commands::Themes(cmd) => entities::handle::<Theme>(&ctx, cmd.action).await?,
        Commands::MarketData(cmd) => entities::handle::<MarketData>(&ctx, cmd.action).await?,
        Commands::QueryRefiners(cmd) => {
            entities::handle::<QueryRefiner>(&ctx, cmd.action).await?;
        }
        Commands::ClarificationGuidance(cmd) => {
            entities::handle::<ClarificationGuidance>(&ctx, cmd.action).await?;
        }
        Commands::Users(cmd) => entities::handle::<User>(&ctx, cmd.action).await?,
        Commands::Contexts(cmd) => entities::handle::<Context>(&ctx, cmd.action).await?,
        Commands::Posts(cmd) => posts::handle(&ctx, cmd.action).await?,
        Commands::Stories(cmd) => stories::handle(&ctx, cmd.action).await?,
        Commands::Auth(cmd) => auth::handle(&ctx, cmd.action).await?,
        Commands::MasterData(cmd) => master_data::handle(&ctx, cmd.action).await?,
    }

    Ok(())
}
