//! In-memory record of listings that have already been alerted.
//!
//! Grows for the life of the process and is never persisted: a restart
//! forgets everything and may re-alert old listings.

use std::collections::HashSet;

#[derive(Debug, Default)]
pub struct DedupLedger {
    links: HashSet<String>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self, link: &str) -> bool {
        self.links.contains(link)
    }

    /// Record an alerted link. Returns `false` if it was already present.
    pub fn record(&mut self, link: &str) -> bool {
        if self.links.contains(link) {
            return false;
        }
        self.links.insert(link.to_string())
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
