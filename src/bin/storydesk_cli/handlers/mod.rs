pub mod auth;
pub mod entities;
pub mod master_data;
pub mod posts;
pub mod stories;
