//! Rules for the post references stored on a context.
//!
//! A context's `posts` list is the only place the post/context relation is
//! recorded. Every function here returns a new list and leaves its input
//! untouched; each output holds at most one entry per `post_id`.

use std::collections::HashMap;
use std::iter;

use storydesk_api_types::ContextPost;

use super::error::DomainError;

/// Collapse entries sharing a `post_id`.
///
/// An entry keeps the position of the first occurrence of its id and the
/// flags of the last one. Extra entry fields are merged, later values winning.
pub fn dedupe_post_refs<I>(entries: I) -> Vec<ContextPost>
where
    I: IntoIterator<Item = ContextPost>,
{
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<ContextPost> = Vec::new();
    for entry in entries {
        match positions.get(&entry.post_id) {
            Some(&index) => {
                let kept = &mut out[index];
                kept.include_in_container = entry.include_in_container;
                kept.extra.extend(entry.extra);
            }
            None => {
                positions.insert(entry.post_id.clone(), out.len());
                out.push(entry);
            }
        }
    }
    out
}

/// Add `entry` to `existing`, replacing any entry with the same post id.
pub fn merge_post_ref(existing: &[ContextPost], entry: ContextPost) -> Vec<ContextPost> {
    dedupe_post_refs(existing.iter().cloned().chain(iter::once(entry)))
}

pub fn remove_post_ref(existing: &[ContextPost], post_id: &str) -> Vec<ContextPost> {
    dedupe_post_refs(
        existing
            .iter()
            .filter(|entry| entry.post_id != post_id)
            .cloned(),
    )
}

/// Reorder entries to follow `ordered_ids`, keeping each entry's flags.
///
/// `ordered_ids` must name every current post exactly once.
pub fn reorder_post_refs(
    existing: &[ContextPost],
    ordered_ids: &[String],
) -> Result<Vec<ContextPost>, DomainError> {
    let current = dedupe_post_refs(existing.iter().cloned());
    if ordered_ids.len() != current.len() {
        return Err(DomainError::validation(format!(
            "new order lists {} posts but the context holds {}",
            ordered_ids.len(),
            current.len()
        )));
    }

    let mut by_id: HashMap<&str, &ContextPost> = current
        .iter()
        .map(|entry| (entry.post_id.as_str(), entry))
        .collect();

    let mut out = Vec::with_capacity(current.len());
    for id in ordered_ids {
        let entry = by_id.remove(id.as_str()).ok_or_else(|| {
            DomainError::validation(format!(
                "post `{id}` is not in the context or is listed twice"
            ))
        })?;
        out.push(entry.clone());
    }
    Ok(out)
}

pub fn set_included(
    existing: &[ContextPost],
    post_id: &str,
    include_in_container: bool,
) -> Result<Vec<ContextPost>, DomainError> {
    let mut out = dedupe_post_refs(existing.iter().cloned());
    let entry = out
        .iter_mut()
        .find(|entry| entry.post_id == post_id)
        .ok_or_else(|| {
            DomainError::validation(format!("post `{post_id}` is not in the context"))
        })?;
    entry.include_in_container = include_in_container;
    Ok(out)
}
