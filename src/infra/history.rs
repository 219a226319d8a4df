//! Address-bar synchronisation.
//!
//! The page and query are encoded into the URL fragment as
//! `page=<n>&q=<comma-joined tokens>`. A new history entry is pushed only when
//! the encoded URL differs from the current one.

use std::sync::RwLock;

use tracing::debug;
use url::{Url, form_urlencoded};

use crate::application::query::{Query, QuerySync};
use crate::cache::lock::{rw_read, rw_write};

const SOURCE: &str = "infra::history";

/// In-memory browser history.
#[derive(Debug)]
pub struct HistorySync {
    entries: RwLock<Entries>,
}

#[derive(Debug)]
struct Entries {
    current: Url,
    previous: Vec<Url>,
}

impl HistorySync {
    pub fn new(start: Url) -> Self {
        Self {
            entries: RwLock::new(Entries {
                current: start,
                previous: Vec::new(),
            }),
        }
    }

    pub fn current(&self) -> Url {
        rw_read(&self.entries, SOURCE, "current").current.clone()
    }

    /// Every entry, oldest first, ending with the current one.
    pub fn entries(&self) -> Vec<Url> {
        let entries = rw_read(&self.entries, SOURCE, "entries");
        let mut all = entries.previous.clone();
        all.push(entries.current.clone());
        all
    }
}

impl QuerySync for HistorySync {
    fn sync(&self, page: u32, query: &Query) {
        let mut entries = rw_write(&self.entries, SOURCE, "sync");
        let next = encode(&entries.current, page, query);
        if next != entries.current {
            debug!(url = %next, "Pushing history entry");
            let previous = std::mem::replace(&mut entries.current, next);
            entries.previous.push(previous);
        }
    }
}

/// `base` with its fragment replaced by the encoded page and query.
pub fn encode(base: &Url, page: u32, query: &Query) -> Url {
    let fragment = form_urlencoded::Serializer::new(String::new())
        .append_pair("page", &page.to_string())
        .append_pair("q", &query.joined())
        .finish();
    let mut url = base.clone();
    url.set_fragment(Some(&fragment));
    url
}

/// Inverse of [`encode`]; `None` when the fragment carries no usable page.
pub fn decode(url: &Url) -> Option<(u32, Query)> {
    let fragment = url.fragment()?;
    let mut page = None;
    let mut query = Query::default();
    for (key, value) in form_urlencoded::parse(fragment.as_bytes()) {
        match key.as_ref() {
            "page" => page = value.parse::<u32>().ok().filter(|page| *page >= 1),
            "q" => query = Query::parse(&value),
            _ => {}
        }
    }
    page.map(|page| (page, query))
}
