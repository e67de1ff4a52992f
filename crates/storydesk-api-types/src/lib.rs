//! Wire types shared by the storydesk library and its command-line client.
//!
//! Every REST collection exposed under `/api/admin/<collection>` is described
//! by a type implementing [`Entity`]. Field names travel as camelCase and
//! record ids as `_id`; unknown fields are kept in each record's `extra` map
//! so that a fetch-modify-write cycle never drops data the client does not
//! model.

mod content;
mod entity;
mod envelope;
mod taxonomy;
mod users;

pub use content::{Context, ContextPost, ContextPostsRequest, Post};
pub use entity::Entity;
pub use envelope::{ItemResponse, ListResponse};
pub use taxonomy::{
    ClarificationGuidance, Company, Country, MarketData, QueryRefiner, Region, Sector, Signal,
    Source, SubSector, SubSignal, Theme,
};
pub use users::{
    ForgotPasswordRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
    ResetPasswordRequest, User,
};
