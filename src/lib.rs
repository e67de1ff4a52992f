//! storydesk: admin client for a content-taxonomy REST backend.
//!
//! The library keeps the editorial rules (post/context linking, story
//! ordering, delete policy) in `domain` and `application`, and talks to the
//! backend through the adapters in `infra`.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;

pub use storydesk_api_types as api_types;
