//! Keeps the post references stored on contexts in step with post edits.
//!
//! Each context is handled independently: fetch it, compute its new post
//! list, and write the list back when it changed. Contexts are processed
//! concurrently and a failure on one never undoes the others; the caller
//! receives a [`SyncReport`] describing what happened to each.

use std::num::NonZeroU32;
use std::sync::Arc;

use futures::future::join_all;
use metrics::counter;
use serde::Serialize;
use storydesk_api_types::{Context, ContextPost};
use tracing::{info, warn};

use crate::{
    application::{
        pagination::fetch_all,
        repos::{ContextRepo, RepoError},
    },
    domain::{
        error::DomainError,
        links::{merge_post_ref, remove_post_ref},
        validation::{ensure_non_empty, normalize_ids},
    },
};

pub const METRIC_SYNC_CONTEXT_TOTAL: &str = "storydesk_sync_context_total";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncFailure {
    pub context_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub post_id: String,
    /// Contexts whose post list was written.
    pub updated: Vec<String>,
    /// Contexts that already held the requested state.
    pub unchanged: Vec<String>,
    pub failed: Vec<SyncFailure>,
}

impl SyncReport {
    fn new(post_id: &str) -> Self {
        Self {
            post_id: post_id.to_string(),
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<&str> {
        self.failed
            .iter()
            .map(|failure| failure.context_id.as_str())
            .collect()
    }
}

/// What a successful per-context sync did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Updated,
    Unchanged,
}

#[derive(Clone)]
pub struct ContextSync {
    contexts: Arc<dyn ContextRepo>,
    full_fetch_limit: NonZeroU32,
}

impl ContextSync {
    pub fn new(contexts: Arc<dyn ContextRepo>, full_fetch_limit: NonZeroU32) -> Self {
        Self {
            contexts,
            full_fetch_limit,
        }
    }

    /// Ensure every named context lists `post_id` exactly once with the given flag.
    pub async fn link(
        &self,
        post_id: &str,
        context_ids: &[String],
        include_in_container: bool,
    ) -> Result<SyncReport, DomainError> {
        let post_id = post_id.trim();
        ensure_non_empty(post_id, "post_id")?;
        let entry = ContextPost::new(post_id, include_in_container);
        let report = self
            .fan_out(post_id, context_ids, "link", |posts| {
                merge_post_ref(posts, entry.clone())
            })
            .await;
        Ok(report)
    }

    /// Drop `post_id` from every named context.
    pub async fn unlink(
        &self,
        post_id: &str,
        context_ids: &[String],
    ) -> Result<SyncReport, DomainError> {
        let post_id = post_id.trim();
        ensure_non_empty(post_id, "post_id")?;
        let report = self
            .fan_out(post_id, context_ids, "unlink", |posts| {
                remove_post_ref(posts, post_id)
            })
            .await;
        Ok(report)
    }

    /// Contexts currently referencing `post_id`, in server order.
    pub async fn contexts_for_post(&self, post_id: &str) -> Result<Vec<Context>, RepoError> {
        let post_id = post_id.trim();
        let all = fetch_all(self.contexts.as_ref(), self.full_fetch_limit).await?;
        Ok(all
            .into_iter()
            .filter(|context| context.references(post_id))
            .collect())
    }

    async fn fan_out<F>(
        &self,
        post_id: &str,
        context_ids: &[String],
        action: &'static str,
        edit: F,
    ) -> SyncReport
    where
        F: Fn(&[ContextPost]) -> Vec<ContextPost> + Sync,
    {
        let ids = normalize_ids(context_ids);
        let results = join_all(ids.iter().map(|id| self.sync_one(id, &edit))).await;

        let mut report = SyncReport::new(post_id);
        for (context_id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(Outcome::Updated) => {
                    counter!(METRIC_SYNC_CONTEXT_TOTAL, "action" => action, "outcome" => "updated")
                        .increment(1);
                    report.updated.push(context_id);
                }
                Ok(Outcome::Unchanged) => {
                    counter!(METRIC_SYNC_CONTEXT_TOTAL, "action" => action, "outcome" => "unchanged")
                        .increment(1);
                    report.unchanged.push(context_id);
                }
                Err(err) => {
                    counter!(METRIC_SYNC_CONTEXT_TOTAL, "action" => action, "outcome" => "failed")
                        .increment(1);
                    warn!(
                        post_id,
                        context_id = %context_id,
                        action,
                        error = %err,
                        "context sync failed"
                    );
                    report.failed.push(SyncFailure {
                        context_id,
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            post_id,
            action,
            updated = report.updated.len(),
            unchanged = report.unchanged.len(),
            failed = report.failed.len(),
            "context sync finished"
        );
        report
    }

    async fn sync_one<F>(&self, context_id: &str, edit: &F) -> Result<Outcome, RepoError>
    where
        F: Fn(&[ContextPost]) -> Vec<ContextPost> + Sync,
    {
        let context = self.contexts.find(context_id).await?;
        let next = edit(&context.posts);
        if next == context.posts {
            return Ok(Outcome::Unchanged);
        }
        self.contexts.replace_posts(context_id, &next).await?;
        Ok(Outcome::Updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{MemoryRepo, context};

    fn sync(repo: &Arc<MemoryRepo<Context>>) -> ContextSync {
        ContextSync::new(repo.clone(), NonZeroU32::new(50).expect("non-zero"))
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn posts_of(repo: &MemoryRepo<Context>, id: &str) -> Vec<ContextPost> {
        repo.get(id).map(|c| c.posts).unwrap_or_default()
    }

    #[tokio::test]
    async fn link_adds_one_entry_to_each_selected_context() -> Result<(), DomainError> {
        let repo = Arc::new(MemoryRepo::paged(vec![
            context("A", &[("x", false)]),
            context("B", &[]),
            context("C", &[("y", true)]),
        ]));

        let report = sync(&repo).link("p", &ids(&["A", "B"]), true).await?;

        assert!(report.is_complete());
        assert_eq!(report.updated, ids(&["A", "B"]));
        assert_eq!(
            posts_of(&repo, "A"),
            vec![ContextPost::new("x", false), ContextPost::new("p", true)]
        );
        assert_eq!(posts_of(&repo, "B"), vec![ContextPost::new("p", true)]);
        assert_eq!(posts_of(&repo, "C"), vec![ContextPost::new("y", true)]);
        Ok(())
    }

    #[tokio::test]
    async fn relinking_is_idempotent() -> Result<(), DomainError> {
        let repo = Arc::new(MemoryRepo::paged(vec![context("A", &[("x", false)])]));
        let sync = sync(&repo);

        sync.link("p", &ids(&["A"]), false).await?;
        let after_first = posts_of(&repo, "A");
        let second = sync.link("p", &ids(&["A"]), false).await?;

        assert_eq!(second.unchanged, ids(&["A"]));
        assert!(second.updated.is_empty());
        assert_eq!(posts_of(&repo, "A"), after_first);
        assert_eq!(repo.writes(), vec!["replace:A".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn latest_flag_wins_without_moving_entry() -> Result<(), DomainError> {
        let repo = Arc::new(MemoryRepo::paged(vec![context(
            "A",
            &[("p", false), ("x", false)],
        )]));

        sync(&repo).link("p", &ids(&["A"]), true).await?;

        assert_eq!(
            posts_of(&repo, "A"),
            vec![ContextPost::new("p", true), ContextPost::new("x", false)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn failed_context_does_not_roll_back_others() -> Result<(), DomainError> {
        let repo = Arc::new(MemoryRepo::paged(vec![
            context("A", &[]),
            context("B", &[]),
        ]));
        repo.fail_on("B");

        let report = sync(&repo).link("p", &ids(&["A", "B"]), false).await?;

        assert!(!report.is_complete());
        assert_eq!(report.updated, ids(&["A"]));
        assert_eq!(report.failed_ids(), vec!["B"]);
        assert_eq!(posts_of(&repo, "A"), vec![ContextPost::new("p", false)]);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_context_is_reported_as_failure() -> Result<(), DomainError> {
        let repo = Arc::new(MemoryRepo::paged(vec![context("A", &[])]));
        let report = sync(&repo).link("p", &ids(&["A", "ghost"]), false).await?;
        assert_eq!(report.failed_ids(), vec!["ghost"]);
        Ok(())
    }

    #[tokio::test]
    async fn selection_is_normalized_before_fan_out() -> Result<(), DomainError> {
        let repo = Arc::new(MemoryRepo::paged(vec![context("A", &[])]));
        let report = sync(&repo)
            .link("p", &ids(&[" A ", "", "A"]), true)
            .await?;
        assert_eq!(report.updated, ids(&["A"]));
        assert_eq!(repo.writes().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn padded_post_id_matches_the_stored_entry() -> Result<(), DomainError> {
        let repo = Arc::new(MemoryRepo::paged(vec![
            context("A", &[("p1", false)]),
            context("B", &[("p1", true), ("x", false)]),
        ]));
        let sync = sync(&repo);

        let linked = sync.link(" p1 ", &ids(&["A"]), false).await?;
        assert_eq!(linked.post_id, "p1");
        assert_eq!(linked.unchanged, ids(&["A"]));
        assert_eq!(posts_of(&repo, "A"), vec![ContextPost::new("p1", false)]);

        let unlinked = sync.unlink("p1\n", &ids(&["B"])).await?;
        assert_eq!(unlinked.updated, ids(&["B"]));
        assert_eq!(posts_of(&repo, "B"), vec![ContextPost::new("x", false)]);
        assert_eq!(repo.writes(), vec!["replace:B".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn blank_post_id_is_rejected() {
        let repo = Arc::new(MemoryRepo::paged(vec![context("A", &[])]));
        let result = sync(&repo).link("  ", &ids(&["A"]), true).await;
        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert!(repo.writes().is_empty());
    }

    #[tokio::test]
    async fn unlink_and_lookup() -> Result<(), RepoError> {
        let repo = Arc::new(MemoryRepo::paged(vec![
            context("A", &[("p", true), ("x", false)]),
            context("B", &[("x", false)]),
            context("C", &[("p", false)]),
        ]));
        let sync = sync(&repo);

        let linked: Vec<String> = sync
            .contexts_for_post("p")
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(linked, ids(&["A", "C"]));

        let report = sync
            .unlink("p", &linked)
            .await
            .map_err(|err| RepoError::Decode(err.to_string()))?;
        assert_eq!(report.updated, linked);
        assert_eq!(posts_of(&repo, "A"), vec![ContextPost::new("x", false)]);
        assert!(posts_of(&repo, "C").is_empty());
        assert!(sync.contexts_for_post("p").await?.is_empty());
        Ok(())
    }
}
