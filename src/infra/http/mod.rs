//! HTTP adapters for the admin REST backend.

mod auth;
mod client;
mod repos;

use std::sync::Arc;

use storydesk_api_types::{
    Company, Context, Country, Entity, Region, Sector, Signal, Source, SubSector, SubSignal,
    Theme,
};

pub use auth::HttpAuthGateway;
pub use client::{
    ApiClient, ApiError, Auth, METRIC_HTTP_REQUEST_MS, METRIC_HTTP_REQUESTS_TOTAL,
};
pub use repos::HttpEntityRepo;

use crate::application::master_data::MasterDataRepos;

/// Hands out repositories that share one client and session store.
#[derive(Clone)]
pub struct HttpRepositories {
    client: ApiClient,
}

impl HttpRepositories {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn entity<E: Entity>(&self) -> Arc<HttpEntityRepo<E>> {
        Arc::new(HttpEntityRepo::new(self.client.clone()))
    }

    pub fn contexts(&self) -> Arc<HttpEntityRepo<Context>> {
        self.entity::<Context>()
    }

    pub fn auth(&self) -> Arc<HttpAuthGateway> {
        Arc::new(HttpAuthGateway::new(self.client.clone()))
    }

    pub fn master_data(&self) -> MasterDataRepos {
        MasterDataRepos {
            regions: self.entity::<Region>(),
            countries: self.entity::<Country>(),
            sectors: self.entity::<Sector>(),
            sub_sectors: self.entity::<SubSector>(),
            signals: self.entity::<Signal>(),
            sub_signals: self.entity::<SubSignal>(),
            themes: self.entity::<Theme>(),
            companies: self.entity::<Company>(),
            sources: self.entity::<Source>(),
        }
    }
}
