use thiserror::Error;

use crate::{
    application::{repos::RepoError, session::SessionError},
    domain::error::DomainError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("operation finished partially: {0}")]
    Incomplete(String),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn incomplete(message: impl Into<String>) -> Self {
        Self::Incomplete(message.into())
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Text shown to the operator; transport details stay in the logs.
    pub fn presentation_message(&self) -> String {
        match self {
            AppError::Domain(DomainError::Validation { message }) => message.clone(),
            AppError::Repo(RepoError::NotFound) => "Resource not found".to_string(),
            AppError::Repo(RepoError::NotAuthenticated) => {
                "Not signed in; run `auth login` first".to_string()
            }
            AppError::Repo(RepoError::Unauthorized) => {
                "Session expired or credentials rejected".to_string()
            }
            AppError::Repo(RepoError::Rejected { message, .. }) => message.clone(),
            AppError::Repo(RepoError::Transport(_)) => "Server unreachable".to_string(),
            AppError::Incomplete(message) => message.clone(),
            _ => "Unexpected error occurred".to_string(),
        }
    }
}
