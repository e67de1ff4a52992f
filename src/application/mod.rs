//! Application services layer.

pub mod auth;
pub mod error;
pub mod master_data;
pub mod notify;
pub mod pagination;
pub mod posts;
pub mod repos;
pub mod session;
pub mod store;
pub mod stories;
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;
