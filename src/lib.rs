//! Client-side cache and pagination coordinator for a tag-searchable post
//! gallery.
//!
//! [`application::SearchCoordinator`] serves pages from an in-memory cache or
//! the remote API and tracks pagination bounds; [`application::TagLoader`]
//! resolves tag metadata in concurrent, bounded batches.

pub mod application;
pub mod cache;
pub mod config;
pub mod infra;

pub use galleria_api_types as api_types;
