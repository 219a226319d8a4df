//! Coordinator logic: what to fetch, what to serve from memory, and how
//! failures reach the user.

pub mod error;
pub mod gateway;
pub mod query;
pub mod search;
pub mod state;
pub mod tags;

pub use error::TagLoadError;
pub use gateway::{ApiError, GENERIC_SEARCH_ERROR, GalleryApi};
pub use query::{Query, QuerySource, QuerySync, SharedQuery};
pub use search::SearchCoordinator;
pub use state::{Navigation, SearchState};
pub use tags::{DEFAULT_TAG_BATCH_SIZE, TagLoader};
