//! Saving and deleting posts together with their context references.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use storydesk_api_types::{Entity, Post};
use tracing::{error, info, warn};

use crate::{
    application::{
        error::AppError,
        notify::{Notifier, Toast},
        repos::EntityRepo,
        sync::{ContextSync, SyncReport},
    },
    domain::{error::DomainError, validation::ensure_complete},
};

/// What happens to context references when a post is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Remove the post from every context that lists it, then delete it.
    #[default]
    Detach,
    /// Delete the post and leave references in place.
    Orphan,
}

impl FromStr for DeletePolicy {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "detach" => Ok(Self::Detach),
            "orphan" => Ok(Self::Orphan),
            other => Err(DomainError::validation(format!(
                "unknown delete policy `{other}` (expected `detach` or `orphan`)"
            ))),
        }
    }
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Detach => "detach",
            Self::Orphan => "orphan",
        })
    }
}

/// A submitted post plus the contexts it should appear in.
#[derive(Debug, Clone)]
pub struct PostForm {
    pub post: Post,
    pub contexts: Vec<String>,
    pub include_in_container: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SavedPost {
    pub post: Post,
    pub sync: SyncReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedPost {
    pub post_id: String,
    pub policy: DeletePolicy,
    /// Present when references were detached first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detached: Option<SyncReport>,
}

pub struct PostEditor {
    posts: Arc<dyn EntityRepo<Post>>,
    sync: ContextSync,
    policy: DeletePolicy,
    notifier: Arc<dyn Notifier>,
}

impl PostEditor {
    pub fn new(
        posts: Arc<dyn EntityRepo<Post>>,
        sync: ContextSync,
        policy: DeletePolicy,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            posts,
            sync,
            policy,
            notifier,
        }
    }

    pub fn policy(&self) -> DeletePolicy {
        self.policy
    }

    /// Persist the post, then link it into every selected context.
    ///
    /// The post write is final before any context is touched. A context
    /// failure shows up in the returned report, not as an error.
    pub async fn save(&self, form: PostForm) -> Result<SavedPost, AppError> {
        let saved = self
            .persist(form)
            .await
            .map_err(|err| self.report("save", err))?;
        if saved.sync.is_complete() {
            self.notifier.notify(Toast::success("post saved"));
        } else {
            self.notifier.notify(Toast::error(format!(
                "Post saved, but these contexts were not updated: {}",
                saved.sync.failed_ids().join(", ")
            )));
        }
        Ok(saved)
    }

    async fn persist(&self, form: PostForm) -> Result<SavedPost, AppError> {
        ensure_complete(&form.post)?;

        let post = if form.post.id().is_empty() {
            self.posts.create(&form.post).await?
        } else {
            self.posts.update(&form.post).await?
        };
        if post.id().is_empty() {
            return Err(AppError::unexpected("server returned the post without an id"));
        }
        info!(post_id = post.id(), contexts = form.contexts.len(), "post saved");

        let sync = self
            .sync
            .link(post.id(), &form.contexts, form.include_in_container)
            .await?;
        Ok(SavedPost { post, sync })
    }

    pub async fn delete(&self, post_id: &str) -> Result<DeletedPost, AppError> {
        self.delete_with(post_id, self.policy).await
    }

    pub async fn delete_with(
        &self,
        post_id: &str,
        policy: DeletePolicy,
    ) -> Result<DeletedPost, AppError> {
        let deleted = self
            .remove(post_id, policy)
            .await
            .map_err(|err| self.report("delete", err))?;
        self.notifier.notify(Toast::success("post deleted"));
        Ok(deleted)
    }

    async fn remove(&self, post_id: &str, policy: DeletePolicy) -> Result<DeletedPost, AppError> {
        let detached = match policy {
            DeletePolicy::Orphan => None,
            DeletePolicy::Detach => {
                let linked: Vec<String> = self
                    .sync
                    .contexts_for_post(post_id)
                    .await?
                    .into_iter()
                    .map(|context| context.id)
                    .collect();
                let report = self.sync.unlink(post_id, &linked).await?;
                if !report.is_complete() {
                    warn!(
                        post_id,
                        failed = ?report.failed_ids(),
                        "post kept because some contexts still reference it"
                    );
                    return Err(AppError::incomplete(format!(
                        "post `{post_id}` not deleted; could not detach it from: {}",
                        report.failed_ids().join(", ")
                    )));
                }
                Some(report)
            }
        };

        self.posts.delete(post_id).await?;
        info!(post_id, %policy, "post deleted");
        Ok(DeletedPost {
            post_id: post_id.to_string(),
            policy,
            detached,
        })
    }

    /// Ids of the contexts that currently list the post.
    pub async fn contexts_for(&self, post_id: &str) -> Result<Vec<String>, AppError> {
        let contexts = self
            .sync
            .contexts_for_post(post_id)
            .await
            .map_err(|err| self.report("look up contexts for", err))?;
        Ok(contexts.into_iter().map(|context| context.id).collect())
    }

    fn report(&self, action: &'static str, err: impl Into<AppError>) -> AppError {
        let err = err.into();
        error!(action, error = %err, "post operation failed");
        self.notifier.notify(Toast::error(format!(
            "Could not {action} post: {}",
            err.presentation_message()
        )));
        err
    }
}
