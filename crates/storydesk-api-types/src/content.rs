//! Editorial records: posts and the contexts that group them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::entity::Entity;

/// A content item, the primary editorial unit.
///
/// A post does not list its contexts; that side of the relation lives in
/// [`Context::posts`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub post_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_type: Option<String>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub source_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_content: Option<String>,
    #[serde(default)]
    pub is_trending: bool,
    #[serde(default)]
    pub primary_companies: Vec<String>,
    #[serde(default)]
    pub secondary_companies: Vec<String>,
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(default)]
    pub sub_sectors: Vec<String>,
    #[serde(default)]
    pub signal_categories: Vec<String>,
    #[serde(default)]
    pub signal_sub_categories: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Post {
    const COLLECTION: &'static str = "posts";
    const LABEL: &'static str = "post";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn display_name(&self) -> &str {
        &self.post_title
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.post_title.trim().is_empty() {
            missing.push("post_title");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        missing
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.post_title.as_str()];
        if let Some(summary) = self.summary.as_deref() {
            fields.push(summary);
        }
        if let Some(source) = self.source.as_deref() {
            fields.push(source);
        }
        fields
    }
}

/// One post reference inside a context, in display order.
///
/// Fields the backend keeps on the entry itself, such as a subdocument
/// `_id`, ride along in `extra` so rewriting the list does not strip them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextPost {
    pub post_id: String,
    #[serde(default)]
    pub include_in_container: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContextPost {
    pub fn new(post_id: impl Into<String>, include_in_container: bool) -> Self {
        Self {
            post_id: post_id.into(),
            include_in_container,
            extra: Map::new(),
        }
    }
}

/// A story bucket aggregating posts and taxonomy tags for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub context_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_title: Option<String>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_added: Option<OffsetDateTime>,
    #[serde(default)]
    pub posts: Vec<ContextPost>,
    #[serde(default)]
    pub sectors: Vec<String>,
    #[serde(default)]
    pub sub_sectors: Vec<String>,
    #[serde(default)]
    pub signal_categories: Vec<String>,
    #[serde(default)]
    pub signal_sub_categories: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Context {
    pub fn references(&self, post_id: &str) -> bool {
        self.posts.iter().any(|entry| entry.post_id == post_id)
    }
}

impl Entity for Context {
    const COLLECTION: &'static str = "contexts";
    const LABEL: &'static str = "context";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn display_name(&self) -> &str {
        &self.context_title
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        if self.context_title.trim().is_empty() {
            vec!["context_title"]
        } else {
            Vec::new()
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.context_title.as_str()];
        if let Some(container) = self.container_title.as_deref() {
            fields.push(container);
        }
        fields
    }
}

/// Body of `PUT /api/admin/contexts/{id}` when only the post list changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextPostsRequest {
    pub posts: Vec<ContextPost>,
}
