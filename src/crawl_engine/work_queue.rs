//! Shared queue of product links awaiting extraction
//!
//! Workers drain it concurrently from several OS threads. The lock is taken
//! for a single `pop_front` and never held across an await point.

use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::page_extractor::ProductLink;

#[derive(Debug, Default)]
pub struct WorkQueue {
    links: Mutex<VecDeque<ProductLink>>,
}

impl WorkQueue {
    #[must_use]
    pub fn new(links: impl IntoIterator<Item = ProductLink>) -> Self {
        Self {
            links: Mutex::new(links.into_iter().collect()),
        }
    }

    /// Remove and return the oldest link. Each link is handed out once.
    pub fn take(&self) -> Option<ProductLink> {
        self.links.lock().pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.lock().is_empty()
    }
}
