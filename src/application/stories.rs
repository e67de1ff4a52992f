//! A context's ordered post list seen as a story.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use storydesk_api_types::{Context, ContextPost, Post};
use tracing::{error, info, warn};

use crate::{
    application::{
        error::AppError,
        notify::{Notifier, Toast},
        pagination::{ListQuery, pages_for},
        repos::{ContextRepo, EntityRepo, RepoError},
    },
    domain::links::{dedupe_post_refs, reorder_post_refs, set_included},
};

#[derive(Debug, Clone, Serialize)]
pub struct StoryEntry {
    /// 1-based position within the whole story.
    pub position: usize,
    pub post_id: String,
    pub include_in_container: bool,
    /// `None` when the referenced post no longer exists.
    pub post: Option<Post>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoryPage {
    pub context_id: String,
    pub context_title: String,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub entries: Vec<StoryEntry>,
    /// Entries on this page whose post could not be found.
    pub dangling: usize,
}

pub struct StoryService {
    contexts: Arc<dyn ContextRepo>,
    posts: Arc<dyn EntityRepo<Post>>,
    notifier: Arc<dyn Notifier>,
}

impl StoryService {
    pub fn new(
        contexts: Arc<dyn ContextRepo>,
        posts: Arc<dyn EntityRepo<Post>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            contexts,
            posts,
            notifier,
        }
    }

    pub async fn view(&self, context_id: &str, page: u32, limit: u32) -> Result<StoryPage, AppError> {
        self.load_page(context_id, page, limit)
            .await
            .map_err(|err| self.report("load", err))
    }

    /// Rewrite the story order; `ordered_post_ids` must list every post once.
    pub async fn reorder(
        &self,
        context_id: &str,
        ordered_post_ids: &[String],
    ) -> Result<Context, AppError> {
        let context = self
            .write_order(context_id, ordered_post_ids)
            .await
            .map_err(|err| self.report("reorder", err))?;
        self.notifier.notify(Toast::success("story reordered"));
        Ok(context)
    }

    pub async fn set_included(
        &self,
        context_id: &str,
        post_id: &str,
        include_in_container: bool,
    ) -> Result<Context, AppError> {
        let context = self
            .write_inclusion(context_id, post_id, include_in_container)
            .await
            .map_err(|err| self.report("update", err))?;
        self.notifier.notify(Toast::success("story updated"));
        Ok(context)
    }

    async fn load_page(
        &self,
        context_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<StoryPage, AppError> {
        let context = self.contexts.find(context_id).await?;
        let query = ListQuery::page(page, limit);
        let refs = dedupe_post_refs(context.posts);
        let total = refs.len() as u64;
        let offset = query.offset();

        let window: Vec<(usize, ContextPost)> = refs
            .into_iter()
            .enumerate()
            .skip(offset)
            .take(query.limit as usize)
            .collect();
        let lookups = join_all(
            window
                .iter()
                .map(|(_, entry)| self.posts.find(&entry.post_id)),
        )
        .await;

        let mut entries = Vec::with_capacity(window.len());
        let mut dangling = 0usize;
        for ((index, entry), lookup) in window.into_iter().zip(lookups) {
            let post = match lookup {
                Ok(post) => Some(post),
                Err(RepoError::NotFound) => {
                    warn!(context_id, post_id = %entry.post_id, "story references a missing post");
                    dangling += 1;
                    None
                }
                Err(err) => return Err(err.into()),
            };
            entries.push(StoryEntry {
                position: index + 1,
                post_id: entry.post_id,
                include_in_container: entry.include_in_container,
                post,
            });
        }

        Ok(StoryPage {
            context_id: context.id,
            context_title: context.context_title,
            page: query.page,
            limit: query.limit,
            total,
            total_pages: pages_for(total, query.limit),
            entries,
            dangling,
        })
    }

    async fn write_order(
        &self,
        context_id: &str,
        ordered_post_ids: &[String],
    ) -> Result<Context, AppError> {
        let mut context = self.contexts.find(context_id).await?;
        let posts = reorder_post_refs(&context.posts, ordered_post_ids)?;
        self.contexts.replace_posts(context_id, &posts).await?;
        info!(context_id, posts = posts.len(), "story reordered");
        context.posts = posts;
        Ok(context)
    }

    async fn write_inclusion(
        &self,
        context_id: &str,
        post_id: &str,
        include_in_container: bool,
    ) -> Result<Context, AppError> {
        let mut context = self.contexts.find(context_id).await?;
        let posts = set_included(&context.posts, post_id, include_in_container)?;
        if posts != context.posts {
            self.contexts.replace_posts(context_id, &posts).await?;
            info!(context_id, post_id, include_in_container, "story entry updated");
        }
        context.posts = posts;
        Ok(context)
    }

    fn report(&self, action: &'static str, err: AppError) -> AppError {
        error!(action, error = %err, "story operation failed");
        self.notifier.notify(Toast::error(format!(
            "Could not {action} story: {}",
            err.presentation_message()
        )));
        err
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::application::notify::{RecordingNotifier, ToastKind};
    use crate::application::testing::{MemoryRepo, context};
    use crate::domain::error::DomainError;

    fn post(id: &str) -> Post {
        Post {
            id: id.into(),
            post_title: format!("Post {id}"),
            date: Some(datetime!(2024-01-01 00:00 UTC)),
            ..Post::default()
        }
    }

    fn service(
        contexts: Vec<Context>,
        posts: Vec<Post>,
    ) -> (StoryService, Arc<MemoryRepo<Context>>) {
        let (service, contexts, _) = observed(contexts, posts);
        (service, contexts)
    }

    fn observed(
        contexts: Vec<Context>,
        posts: Vec<Post>,
    ) -> (StoryService, Arc<MemoryRepo<Context>>, Arc<RecordingNotifier>) {
        let contexts = Arc::new(MemoryRepo::paged(contexts));
        let posts = Arc::new(MemoryRepo::paged(posts));
        let notifier = Arc::new(RecordingNotifier::new());
        (
            StoryService::new(contexts.clone(), posts, notifier.clone()),
            contexts,
            notifier,
        )
    }

    fn order(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn view_pages_through_story_and_flags_missing_posts() -> Result<(), AppError> {
        let (service, _) = service(
            vec![context(
                "A",
                &[("p1", true), ("p2", false), ("gone", true), ("p3", false)],
            )],
            vec![post("p1"), post("p2"), post("p3")],
        );

        let first = service.view("A", 1, 3).await?;
        assert_eq!(first.total, 4);
        assert_eq!(first.total_pages, 2);
        assert_eq!(first.entries.len(), 3);
        assert_eq!(first.dangling, 1);
        assert!(first.entries[2].post.is_none());
        assert_eq!(first.entries[2].position, 3);

        let second = service.view("A", 2, 3).await?;
        assert_eq!(second.entries.len(), 1);
        assert_eq!(second.entries[0].post_id, "p3");
        assert_eq!(second.entries[0].position, 4);
        assert_eq!(second.dangling, 0);
        Ok(())
    }

    #[tokio::test]
    async fn reorder_keeps_flags() -> Result<(), AppError> {
        let (service, contexts) = service(
            vec![context("A", &[("p1", true), ("p2", false)])],
            vec![],
        );

        let updated = service.reorder("A", &order(&["p2", "p1"])).await?;

        let expected = vec![ContextPost::new("p2", false), ContextPost::new("p1", true)];
        assert_eq!(updated.posts, expected);
        assert_eq!(contexts.get("A").map(|c| c.posts), Some(expected));
        Ok(())
    }

    #[tokio::test]
    async fn reorder_rejects_partial_order() {
        let (service, contexts, notifier) = observed(
            vec![context("A", &[("p1", true), ("p2", false)])],
            vec![],
        );

        let result = service.reorder("A", &order(&["p2"])).await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::Validation { .. }))
        ));
        assert!(contexts.writes().is_empty());
        let toasts = notifier.take();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].kind, ToastKind::Error);
        assert!(toasts[0].text.starts_with("Could not reorder story"));
    }

    #[tokio::test]
    async fn unknown_context_surfaces_an_error_toast() {
        let (service, _, notifier) = observed(vec![], vec![]);

        let result = service.view("ghost", 1, 10).await;

        assert!(matches!(result, Err(AppError::Repo(RepoError::NotFound))));
        let kinds: Vec<_> = notifier.take().into_iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![ToastKind::Error]);
    }

    #[tokio::test]
    async fn toggling_inclusion_writes_only_on_change() -> Result<(), AppError> {
        let (service, contexts) = service(vec![context("A", &[("p1", false)])], vec![]);

        service.set_included("A", "p1", true).await?;
        service.set_included("A", "p1", true).await?;

        assert_eq!(contexts.writes(), vec!["replace:A".to_string()]);
        assert_eq!(
            contexts.get("A").map(|c| c.posts),
            Some(vec![ContextPost::new("p1", true)])
        );
        Ok(())
    }
}
