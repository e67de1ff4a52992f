//! One keyed-collection store shared by every entity type.
//!
//! [`Collection`] is plain state driven by [`CollectionAction`]s.
//! [`EntityStore`] pairs it with a repository: writes go to the server first
//! and are mirrored locally only after the server accepted them.

use std::sync::Arc;

use storydesk_api_types::Entity;
use tracing::{debug, error, info};

use crate::{
    application::{
        error::AppError,
        notify::{Notifier, Toast},
        pagination::{
            ListPage, ListQuery, PaginationPolicy, QueryStrategy, fetch_all, local_search,
        },
        repos::EntityRepo,
    },
    domain::{error::DomainError, validation::ensure_complete},
};

#[derive(Debug, Clone)]
pub enum CollectionAction<E> {
    Set {
        items: Vec<E>,
        total: Option<u64>,
        page: u32,
    },
    Add(E),
    Update(E),
    Remove(String),
    SetEditTarget(Option<String>),
}

#[derive(Debug, Clone)]
pub struct Collection<E> {
    items: Vec<E>,
    edit_target: Option<String>,
    total: Option<u64>,
    page: u32,
}

impl<E> Default for Collection<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            edit_target: None,
            total: None,
            page: 1,
        }
    }
}

impl<E: Entity> Collection<E> {
    pub fn apply(&mut self, action: CollectionAction<E>) {
        match action {
            CollectionAction::Set { items, total, page } => {
                self.items = items;
                self.total = total;
                self.page = page;
            }
            CollectionAction::Add(entity) => {
                match self.position(entity.id()) {
                    Some(index) => self.items[index] = entity,
                    None => {
                        self.items.push(entity);
                        self.total = self.total.map(|total| total + 1);
                    }
                }
            }
            CollectionAction::Update(entity) => {
                if let Some(index) = self.position(entity.id()) {
                    self.items[index] = entity;
                }
            }
            CollectionAction::Remove(id) => {
                if let Some(index) = self.position(&id) {
                    self.items.remove(index);
                    self.total = self.total.map(|total| total.saturating_sub(1));
                }
                if self.edit_target.as_deref() == Some(id.as_str()) {
                    self.edit_target = None;
                }
            }
            CollectionAction::SetEditTarget(target) => self.edit_target = target,
        }
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&E> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn edit_target(&self) -> Option<&E> {
        self.edit_target.as_deref().and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

pub struct EntityStore<E: Entity> {
    repo: Arc<dyn EntityRepo<E>>,
    policy: PaginationPolicy,
    notifier: Arc<dyn Notifier>,
    state: Collection<E>,
    /// Whole collection, kept once a local search needed it.
    full: Option<Vec<E>>,
    /// Size of the unfiltered collection as last reported by the server.
    collection_total: Option<u64>,
}

impl<E: Entity> EntityStore<E> {
    pub fn new(
        repo: Arc<dyn EntityRepo<E>>,
        policy: PaginationPolicy,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            repo,
            policy,
            notifier,
            state: Collection::default(),
            full: None,
            collection_total: None,
        }
    }

    pub fn state(&self) -> &Collection<E> {
        &self.state
    }

    pub fn policy(&self) -> &PaginationPolicy {
        &self.policy
    }

    /// Replace local state with one page of results.
    pub async fn load(&mut self, query: &ListQuery) -> Result<ListPage<E>, AppError> {
        match self.load_page(query).await {
            Ok(page) => {
                self.state.apply(CollectionAction::Set {
                    items: page.items.clone(),
                    total: page.total,
                    page: page.page,
                });
                Ok(page)
            }
            Err(err) => Err(self.report("load", err)),
        }
    }

    async fn load_page(&mut self, query: &ListQuery) -> Result<ListPage<E>, AppError> {
        let known_total = match query.search_term() {
            Some(_) => self.known_total().await?,
            None => None,
        };
        let strategy = self.policy.select(query, known_total);
        debug!(
            collection = E::COLLECTION,
            ?strategy,
            page = query.page,
            limit = query.limit,
            "loading collection"
        );

        match strategy {
            QueryStrategy::LocalSearch => {
                if self.full.is_none() {
                    let all = fetch_all(self.repo.as_ref(), self.policy.full_fetch_limit).await?;
                    self.collection_total = Some(all.len() as u64);
                    self.full = Some(all);
                }
                let all = self.full.as_deref().unwrap_or_default();
                Ok(local_search(all, query))
            }
            QueryStrategy::ServerPaged => {
                let response = self.repo.list(query).await?;
                if query.search_term().is_none() {
                    self.collection_total = response.total;
                }
                Ok(ListPage::from_server(query, response))
            }
        }
    }

    async fn known_total(&mut self) -> Result<Option<u64>, AppError> {
        if let Some(all) = &self.full {
            return Ok(Some(all.len() as u64));
        }
        if self.collection_total.is_some() {
            return Ok(self.collection_total);
        }

        let probe = self.repo.list(&ListQuery::page(1, 1)).await?;
        match probe.total {
            Some(total) => {
                self.collection_total = Some(total);
                Ok(Some(total))
            }
            None => {
                // A backend that ignores paging answered with everything it has.
                let total = probe.items.len() as u64;
                self.collection_total = Some(total);
                self.full = Some(probe.items);
                Ok(Some(total))
            }
        }
    }

    pub async fn fetch(&self, id: &str) -> Result<E, AppError> {
        self.repo
            .find(id)
            .await
            .map_err(|err| self.report("fetch", err))
    }

    pub async fn add(&mut self, entity: E) -> Result<E, AppError> {
        if let Err(err) = ensure_complete(&entity) {
            return Err(self.report("create", err));
        }
        let created = match self.repo.create(&entity).await {
            Ok(created) => created,
            Err(err) => return Err(self.report("create", err)),
        };

        if let Some(all) = self.full.as_mut() {
            all.push(created.clone());
        }
        self.collection_total = self.collection_total.map(|total| total + 1);
        self.state.apply(CollectionAction::Add(created.clone()));
        info!(collection = E::COLLECTION, id = created.id(), "created");
        self.notifier
            .notify(Toast::success(format!("{} created", E::LABEL)));
        Ok(created)
    }

    pub async fn update(&mut self, entity: E) -> Result<E, AppError> {
        let checked = if entity.id().trim().is_empty() {
            Err(DomainError::validation(format!(
                "{} cannot be updated without an id",
                E::LABEL
            )))
        } else {
            ensure_complete(&entity)
        };
        if let Err(err) = checked {
            return Err(self.report("update", err));
        }
        let updated = match self.repo.update(&entity).await {
            Ok(updated) => updated,
            Err(err) => return Err(self.report("update", err)),
        };

        if let Some(slot) = self
            .full
            .as_mut()
            .and_then(|all| all.iter_mut().find(|item| item.id() == updated.id()))
        {
            *slot = updated.clone();
        }
        self.state.apply(CollectionAction::Update(updated.clone()));
        info!(collection = E::COLLECTION, id = updated.id(), "updated");
        self.notifier
            .notify(Toast::success(format!("{} updated", E::LABEL)));
        Ok(updated)
    }

    pub async fn remove(&mut self, id: &str) -> Result<(), AppError> {
        if let Err(err) = self.repo.delete(id).await {
            return Err(self.report("delete", err));
        }

        if let Some(all) = self.full.as_mut() {
            all.retain(|item| item.id() != id);
        }
        self.collection_total = self
            .collection_total
            .map(|total| total.saturating_sub(1));
        self.state.apply(CollectionAction::Remove(id.to_string()));
        info!(collection = E::COLLECTION, id, "deleted");
        self.notifier
            .notify(Toast::success(format!("{} deleted", E::LABEL)));
        Ok(())
    }

    pub fn set_edit_target(&mut self, id: Option<String>) {
        self.state.apply(CollectionAction::SetEditTarget(id));
    }

    pub fn edit_target(&self) -> Option<&E> {
        self.state.edit_target()
    }

    fn report(&self, action: &'static str, err: impl Into<AppError>) -> AppError {
        let err = err.into();
        error!(
            collection = E::COLLECTION,
            action,
            error = %err,
            "entity operation failed"
        );
        self.notifier.notify(Toast::error(format!(
            "Could not {action} {}: {}",
            E::LABEL,
            err.presentation_message()
        )));
        err
    }
}
