//! In-memory repositories for unit tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use storydesk_api_types::{
    Context, ContextPost, Entity, ForgotPasswordRequest, ListResponse, LoginRequest,
    LoginResponse, MessageResponse, RegisterRequest, ResetPasswordRequest, User,
};

use crate::application::pagination::{ListQuery, pages_for};
use crate::application::repos::{AuthGateway, ContextRepo, EntityRepo, RepoError};

pub(crate) struct MemoryRepo<E> {
    rows: Mutex<Vec<E>>,
    paged: bool,
    list_calls: AtomicUsize,
    next_id: AtomicUsize,
    failing: Mutex<HashSet<String>>,
    writes: Mutex<Vec<String>>,
}

impl<E: Entity> MemoryRepo<E> {
    /// Honors `page`/`limit` and reports totals.
    pub(crate) fn paged(rows: Vec<E>) -> Self {
        Self::build(rows, true)
    }

    /// Ignores paging and always answers with a bare array.
    pub(crate) fn unpaged(rows: Vec<E>) -> Self {
        Self::build(rows, false)
    }

    fn build(rows: Vec<E>, paged: bool) -> Self {
        Self {
            rows: Mutex::new(rows),
            paged,
            list_calls: AtomicUsize::new(0),
            next_id: AtomicUsize::new(1),
            failing: Mutex::new(HashSet::new()),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Every read or write touching `id` fails from now on.
    pub(crate) fn fail_on(&self, id: &str) {
        self.failing.lock().expect("lock").insert(id.to_string());
    }

    pub(crate) fn get(&self, id: &str) -> Option<E> {
        self.rows
            .lock()
            .expect("lock")
            .iter()
            .find(|row| row.id() == id)
            .cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.lock().expect("lock").len()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn writes(&self) -> Vec<String> {
        self.writes.lock().expect("lock").clone()
    }

    fn check(&self, id: &str) -> Result<(), RepoError> {
        if self.failing.lock().expect("lock").contains(id) {
            return Err(RepoError::Transport(format!("injected failure for {id}")));
        }
        Ok(())
    }

    fn record(&self, op: &str, id: &str) {
        self.writes.lock().expect("lock").push(format!("{op}:{id}"));
    }
}

#[async_trait]
impl<E: Entity> EntityRepo<E> for MemoryRepo<E> {
    async fn list(&self, query: &ListQuery) -> Result<ListResponse<E>, RepoError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self.rows.lock().expect("lock");
        let matching: Vec<E> = rows
            .iter()
            .filter(|row| query.search_term().is_none_or(|needle| row.matches(needle)))
            .cloned()
            .collect();

        if !self.paged {
            return Ok(ListResponse::from_items(matching));
        }

        let total = matching.len() as u64;
        let start = (query.page as usize - 1) * query.limit as usize;
        let items = matching
            .into_iter()
            .skip(start)
            .take(query.limit as usize)
            .collect();
        Ok(ListResponse {
            items,
            total: Some(total),
            total_pages: Some(pages_for(total, query.limit)),
            page: Some(query.page),
        })
    }

    async fn find(&self, id: &str) -> Result<E, RepoError> {
        self.check(id)?;
        self.get(id).ok_or(RepoError::NotFound)
    }

    async fn create(&self, entity: &E) -> Result<E, RepoError> {
        let mut created = entity.clone();
        if created.id().is_empty() {
            let n = self.next_id.fetch_add(1, Ordering::SeqCst);
            created.set_id(format!("mem-{n}"));
        }
        self.check(created.id())?;
        self.record("create", created.id());
        self.rows.lock().expect("lock").push(created.clone());
        Ok(created)
    }

    async fn update(&self, entity: &E) -> Result<E, RepoError> {
        self.check(entity.id())?;
        let mut rows = self.rows.lock().expect("lock");
        let slot = rows
            .iter_mut()
            .find(|row| row.id() == entity.id())
            .ok_or(RepoError::NotFound)?;
        *slot = entity.clone();
        drop(rows);
        self.record("update", entity.id());
        Ok(entity.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), RepoError> {
        self.check(id)?;
        let mut rows = self.rows.lock().expect("lock");
        let before = rows.len();
        rows.retain(|row| row.id() != id);
        if rows.len() == before {
            return Err(RepoError::NotFound);
        }
        drop(rows);
        self.record("delete", id);
        Ok(())
    }
}

#[async_trait]
impl ContextRepo for MemoryRepo<Context> {
    async fn replace_posts(
        &self,
        context_id: &str,
        posts: &[ContextPost],
    ) -> Result<(), RepoError> {
        if self.failing.lock().expect("lock").contains(context_id) {
            return Err(RepoError::Rejected {
                status: 500,
                message: "injected".into(),
            });
        }
        let mut rows = self.rows.lock().expect("lock");
        let context = rows
            .iter_mut()
            .find(|row| row.id == context_id)
            .ok_or(RepoError::NotFound)?;
        context.posts = posts.to_vec();
        drop(rows);
        self.record("replace", context_id);
        Ok(())
    }
}

/// Accepts one email/password pair.
pub(crate) struct FakeAuthGateway {
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) token: String,
}

#[async_trait]
impl AuthGateway for FakeAuthGateway {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, RepoError> {
        if request.email == self.email && request.password == self.password {
            Ok(LoginResponse {
                token: self.token.clone(),
                user: Some(User {
                    id: "u1".into(),
                    email: self.email.clone(),
                    ..User::default()
                }),
            })
        } else {
            Err(RepoError::Unauthorized)
        }
    }

    async fn register(&self, _request: &RegisterRequest) -> Result<MessageResponse, RepoError> {
        Ok(MessageResponse::default())
    }

    async fn forgot_password(
        &self,
        _request: &ForgotPasswordRequest,
    ) -> Result<MessageResponse, RepoError> {
        Ok(MessageResponse::default())
    }

    async fn reset_password(
        &self,
        _request: &ResetPasswordRequest,
    ) -> Result<MessageResponse, RepoError> {
        Ok(MessageResponse::default())
    }

    async fn account(&self) -> Result<User, RepoError> {
        Ok(User {
            id: "u1".into(),
            email: self.email.clone(),
            ..User::default()
        })
    }
}

pub(crate) fn context(id: &str, posts: &[(&str, bool)]) -> Context {
    Context {
        id: id.into(),
        context_title: format!("Context {id}"),
        posts: posts
            .iter()
            .map(|(post_id, include)| ContextPost::new(*post_id, *include))
            .collect(),
        ..Context::default()
    }
}
