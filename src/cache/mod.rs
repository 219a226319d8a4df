//! In-memory session caches.
//!
//! - [`PageStore`]: posts per `(query, page)`, filled by the search coordinator.
//! - [`TagStore`]: tag metadata per name, filled by the tag loader and shared
//!   across queries.
//!
//! Both stores are append-only and unbounded; concurrent writers can only
//! duplicate work, never replace an entry.

mod keys;
pub(crate) mod lock;
mod pages;
mod tags;

pub use keys::PageKey;
pub use pages::PageStore;
pub use tags::TagStore;
