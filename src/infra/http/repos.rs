//! REST-backed repositories for the `/api/admin/*` collections.

use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Map, Value};
use storydesk_api_types::{
    Context, ContextPost, ContextPostsRequest, Entity, ItemResponse, ListResponse,
};

use super::client::{ApiClient, Auth};
use crate::application::pagination::ListQuery;
use crate::application::repos::{ContextRepo, EntityRepo, RepoError};

const ADMIN: [&str; 2] = ["api", "admin"];

/// Status keys some write replies put next to the record itself.
const REPLY_NOISE: [&str; 3] = ["message", "success", "status"];

pub struct HttpEntityRepo<E> {
    client: ApiClient,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> HttpEntityRepo<E> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    fn collection() -> [&'static str; 3] {
        [ADMIN[0], ADMIN[1], E::COLLECTION]
    }

    fn item(id: &str) -> Result<[&str; 4], RepoError> {
        if id.trim().is_empty() {
            return Err(RepoError::NotFound);
        }
        Ok([ADMIN[0], ADMIN[1], E::COLLECTION, id])
    }

    fn body(entity: &E) -> Result<serde_json::Value, RepoError> {
        serde_json::to_value(entity).map_err(|e| RepoError::Decode(e.to_string()))
    }
}

#[async_trait]
impl<E: Entity> EntityRepo<E> for HttpEntityRepo<E> {
    async fn list(&self, query: &ListQuery) -> Result<ListResponse<E>, RepoError> {
        let pairs = query.to_query_pairs();
        let list = self
            .client
            .request(
                Auth::Session,
                Method::GET,
                &Self::collection(),
                Some(pairs.as_slice()),
                None,
            )
            .await?;
        Ok(list)
    }

    async fn find(&self, id: &str) -> Result<E, RepoError> {
        let found: ItemResponse<E> = self
            .client
            .request(Auth::Session, Method::GET, &Self::item(id)?, None, None)
            .await?;
        Ok(found.into_inner())
    }

    async fn create(&self, entity: &E) -> Result<E, RepoError> {
        let reply: Option<Value> = self
            .client
            .request(
                Auth::Session,
                Method::POST,
                &Self::collection(),
                None,
                Some(Self::body(entity)?),
            )
            .await?;
        written_record(entity, reply)
    }

    async fn update(&self, entity: &E) -> Result<E, RepoError> {
        let reply: Option<Value> = self
            .client
            .request(
                Auth::Session,
                Method::PUT,
                &Self::item(entity.id())?,
                None,
                Some(Self::body(entity)?),
            )
            .await?;
        let mut updated = written_record(entity, reply)?;
        if updated.id().is_empty() {
            updated.set_id(entity.id().to_string());
        }
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), RepoError> {
        self.client
            .request_unit(Auth::Session, Method::DELETE, &Self::item(id)?, None)
            .await
            .map_err(RepoError::from)
    }
}

#[async_trait]
impl ContextRepo for HttpEntityRepo<Context> {
    async fn replace_posts(
        &self,
        context_id: &str,
        posts: &[ContextPost],
    ) -> Result<(), RepoError> {
        let body = serde_json::to_value(ContextPostsRequest {
            posts: posts.to_vec(),
        })
        .map_err(|e| RepoError::Decode(e.to_string()))?;
        self.client
            .request_unit(
                Auth::Session,
                Method::PUT,
                &Self::item(context_id)?,
                Some(body),
            )
            .await
            .map_err(RepoError::from)
    }
}

/// Rebuild the stored record from a write reply.
///
/// The reply may be the record, `{ "data": record }`, or a status message with
/// the record nested under some key. Server fields overlay the submitted
/// ones. A reply carrying no record with an id leaves the submitted record
/// unchanged.
fn written_record<E: Entity>(submitted: &E, reply: Option<Value>) -> Result<E, RepoError> {
    let Value::Object(mut merged) =
        serde_json::to_value(submitted).map_err(|e| RepoError::Decode(e.to_string()))?
    else {
        return Err(RepoError::Decode(format!(
            "{} is not a JSON object",
            E::LABEL
        )));
    };
    if let Some(mut record) = reply.and_then(|reply| record_in_reply(reply, E::LABEL)) {
        if let Some(id) = record.remove("id") {
            record.entry("_id").or_insert(id);
        }
        merged.extend(record);
    }
    serde_json::from_value(Value::Object(merged)).map_err(|e| RepoError::Decode(e.to_string()))
}

fn record_in_reply(reply: Value, label: &str) -> Option<Map<String, Value>> {
    let Value::Object(mut reply) = reply else {
        return None;
    };
    for key in ["data", label] {
        if let Some(Value::Object(nested)) = reply.get(key).filter(|value| is_record(value)) {
            return Some(nested.clone());
        }
    }
    if has_id(&reply) {
        for key in REPLY_NOISE {
            reply.remove(key);
        }
        return Some(reply);
    }
    reply.into_iter().find_map(|(_, value)| match value {
        Value::Object(nested) if has_id(&nested) => Some(nested),
        _ => None,
    })
}

fn is_record(value: &Value) -> bool {
    value.as_object().is_some_and(has_id)
}

fn has_id(record: &Map<String, Value>) -> bool {
    ["_id", "id"].into_iter().any(|key| {
        record
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(|id| !id.trim().is_empty())
    })
}
