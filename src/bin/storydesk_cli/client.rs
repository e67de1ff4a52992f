#![deny(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use storydesk::application::{
    auth::AuthService,
    error::AppError,
    notify::{Notifier, TracingNotifier},
    posts::PostEditor,
    session::SessionStore,
    store::EntityStore,
    stories::StoryService,
    sync::ContextSync,
};
use storydesk::api_types::Entity;
use storydesk::config::{LoadError, Settings};
use storydesk::infra::{
    error::InfraError,
    http::{ApiClient, ApiError, HttpEntityRepo, HttpRepositories},
    session::FileSessionStore,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("site URL is required (use --site, STORYDESK_SITE_URL or api.base_url)")]
    MissingSite,
    #[error("password is required (use --password-file or STORYDESK_PASSWORD)")]
    MissingPassword,
    #[error("failed to read input file {path}: {source}")]
    InputFile {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{}", .0.presentation_message())]
    App(#[from] AppError),
    #[error("post `{post_id}` saved, but these contexts were not updated: {failed}")]
    PartialSync { post_id: String, failed: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to render output: {0}")]
    Output(String),
}

/// Everything a command handler needs, built once per invocation.
#[derive(Clone)]
pub struct Ctx {
    pub settings: Settings,
    pub repos: HttpRepositories,
    pub session: Arc<dyn SessionStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl Ctx {
    pub fn new(
        site: &str,
        settings: Settings,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self, CliError> {
        let client = ApiClient::new(site, settings.api.timeout, session.clone())?;
        Ok(Self {
            settings,
            repos: HttpRepositories::new(client),
            session,
            notifier: Arc::new(TracingNotifier),
        })
    }

    pub fn repo<E: Entity>(&self) -> Arc<HttpEntityRepo<E>> {
        self.repos.entity::<E>()
    }

    pub fn store<E: Entity>(&self) -> EntityStore<E> {
        EntityStore::new(
            self.repo::<E>(),
            self.settings.pagination,
            self.notifier.clone(),
        )
    }

    pub fn sync(&self) -> ContextSync {
        ContextSync::new(
            self.repos.contexts(),
            self.settings.pagination.full_fetch_limit,
        )
    }

    pub fn post_editor(&self) -> PostEditor {
        PostEditor::new(
            self.repo(),
            self.sync(),
            self.settings.sync.delete_policy,
            self.notifier.clone(),
        )
    }

    pub fn stories(&self) -> StoryService {
        StoryService::new(self.repos.contexts(), self.repo(), self.notifier.clone())
    }

    pub fn auth(&self) -> AuthService {
        AuthService::new(self.repos.auth(), self.session.clone())
    }

    /// Page size for a command that did not pass `--limit`.
    pub fn limit_or_default(&self, limit: Option<u32>) -> u32 {
        limit
            .filter(|limit| *limit > 0)
            .unwrap_or(self.settings.pagination.default_limit.get())
    }
}

pub fn build_ctx(settings: Settings) -> Result<Ctx, CliError> {
    let site = settings
        .api
        .base_url
        .clone()
        .ok_or(CliError::MissingSite)?;
    let session: Arc<dyn SessionStore> =
        Arc::new(FileSessionStore::new(settings.session.path.clone()));
    Ctx::new(site.as_str(), settings, session)
}
