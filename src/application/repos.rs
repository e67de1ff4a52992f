//! Repository traits describing the remote collections.

use async_trait::async_trait;
use storydesk_api_types::{
    Context, ContextPost, Entity, ForgotPasswordRequest, ListResponse, LoginRequest,
    LoginResponse, MessageResponse, RegisterRequest, ResetPasswordRequest, User,
};
use thiserror::Error;

use crate::application::pagination::ListQuery;
use crate::application::session::SessionError;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("resource not found")]
    NotFound,
    #[error("not signed in")]
    NotAuthenticated,
    #[error("credentials rejected by the server")]
    Unauthorized,
    #[error("server rejected request (status {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl RepoError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }
}

/// CRUD over one REST collection.
#[async_trait]
pub trait EntityRepo<E: Entity>: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<ListResponse<E>, RepoError>;

    async fn find(&self, id: &str) -> Result<E, RepoError>;

    async fn create(&self, entity: &E) -> Result<E, RepoError>;

    async fn update(&self, entity: &E) -> Result<E, RepoError>;

    async fn delete(&self, id: &str) -> Result<(), RepoError>;
}

/// Contexts additionally accept a write of just their post list.
#[async_trait]
pub trait ContextRepo: EntityRepo<Context> {
    async fn replace_posts(&self, context_id: &str, posts: &[ContextPost])
    -> Result<(), RepoError>;
}

/// The `/api/users/*` endpoints.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, RepoError>;

    async fn register(&self, request: &RegisterRequest) -> Result<MessageResponse, RepoError>;

    async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> Result<MessageResponse, RepoError>;

    async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<MessageResponse, RepoError>;

    async fn account(&self) -> Result<User, RepoError>;
}
