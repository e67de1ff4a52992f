//! Reference collections loaded together for forms and lookups.

use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::sync::Arc;

use serde::Serialize;
use storydesk_api_types::{
    Company, Country, Entity, Region, Sector, Signal, Source, SubSector, SubSignal, Theme,
};
use tracing::{info, warn};

use crate::application::{
    pagination::fetch_all,
    repos::{EntityRepo, RepoError},
};

#[derive(Clone)]
pub struct MasterDataRepos {
    pub regions: Arc<dyn EntityRepo<Region>>,
    pub countries: Arc<dyn EntityRepo<Country>>,
    pub sectors: Arc<dyn EntityRepo<Sector>>,
    pub sub_sectors: Arc<dyn EntityRepo<SubSector>>,
    pub signals: Arc<dyn EntityRepo<Signal>>,
    pub sub_signals: Arc<dyn EntityRepo<SubSignal>>,
    pub themes: Arc<dyn EntityRepo<Theme>>,
    pub companies: Arc<dyn EntityRepo<Company>>,
    pub sources: Arc<dyn EntityRepo<Source>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    pub collection: &'static str,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MasterData {
    pub regions: Vec<Region>,
    pub countries: Vec<Country>,
    pub sectors: Vec<Sector>,
    pub sub_sectors: Vec<SubSector>,
    pub signals: Vec<Signal>,
    pub sub_signals: Vec<SubSignal>,
    pub themes: Vec<Theme>,
    pub companies: Vec<Company>,
    pub sources: Vec<Source>,
    /// Collections that could not be loaded and were left empty.
    pub failures: Vec<LoadFailure>,
}

impl MasterData {
    /// Load every reference collection concurrently.
    ///
    /// A failing collection is logged, recorded and left empty; the others
    /// still load.
    pub async fn load(repos: &MasterDataRepos, page_size: NonZeroU32) -> Self {
        let (
            regions,
            countries,
            sectors,
            sub_sectors,
            signals,
            sub_signals,
            themes,
            companies,
            sources,
        ) = futures::join!(
            fetch_all(repos.regions.as_ref(), page_size),
            fetch_all(repos.countries.as_ref(), page_size),
            fetch_all(repos.sectors.as_ref(), page_size),
            fetch_all(repos.sub_sectors.as_ref(), page_size),
            fetch_all(repos.signals.as_ref(), page_size),
            fetch_all(repos.sub_signals.as_ref(), page_size),
            fetch_all(repos.themes.as_ref(), page_size),
            fetch_all(repos.companies.as_ref(), page_size),
            fetch_all(repos.sources.as_ref(), page_size),
        );

        let mut failures = Vec::new();
        let data = Self {
            regions: settle(regions, &mut failures),
            countries: settle(countries, &mut failures),
            sectors: settle(sectors, &mut failures),
            sub_sectors: settle(sub_sectors, &mut failures),
            signals: settle(signals, &mut failures),
            sub_signals: settle(sub_signals, &mut failures),
            themes: settle(themes, &mut failures),
            companies: settle(companies, &mut failures),
            sources: settle(sources, &mut failures),
            failures,
        };
        info!(failed = data.failures.len(), "master data loaded");
        data
    }

    pub fn summary(&self) -> BTreeMap<&'static str, usize> {
        BTreeMap::from([
            (Region::COLLECTION, self.regions.len()),
            (Country::COLLECTION, self.countries.len()),
            (Sector::COLLECTION, self.sectors.len()),
            (SubSector::COLLECTION, self.sub_sectors.len()),
            (Signal::COLLECTION, self.signals.len()),
            (SubSignal::COLLECTION, self.sub_signals.len()),
            (Theme::COLLECTION, self.themes.len()),
            (Company::COLLECTION, self.companies.len()),
            (Source::COLLECTION, self.sources.len()),
        ])
    }

    pub fn countries_in<'a>(&'a self, region_id: &'a str) -> impl Iterator<Item = &'a Country> {
        self.countries
            .iter()
            .filter(move |country| country.region_id.as_deref() == Some(region_id))
    }

    pub fn sub_sectors_of<'a>(&'a self, sector_id: &'a str) -> impl Iterator<Item = &'a SubSector> {
        self.sub_sectors
            .iter()
            .filter(move |sub| sub.sector_id.as_deref() == Some(sector_id))
    }

    pub fn sub_signals_of<'a>(&'a self, signal_id: &'a str) -> impl Iterator<Item = &'a SubSignal> {
        self.sub_signals
            .iter()
            .filter(move |sub| sub.signal_id.as_deref() == Some(signal_id))
    }
}

fn settle<E: Entity>(result: Result<Vec<E>, RepoError>, failures: &mut Vec<LoadFailure>) -> Vec<E> {
    match result {
        Ok(items) => items,
        Err(err) => {
            warn!(collection = E::COLLECTION, error = %err, "failed to load master data");
            failures.push(LoadFailure {
                collection: E::COLLECTION,
                error: err.to_string(),
            });
            Vec::new()
        }
    }
}
