//! Per-requester, append-only borrow history.

use std::collections::HashMap;
use std::sync::Arc;

use crate::request::BorrowRequest;
use crate::types::{Requester, RequesterKey};

/// Append-only, time-ordered list of one requester's submitted requests
#[derive(Clone, Debug, Default)]
pub struct HistoryLog {
    entries: Vec<Arc<BorrowRequest>>,
}

impl HistoryLog {
    /// Creates an empty log
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends at the end
    pub fn append(&mut self, request: Arc<BorrowRequest>) {
        self.entries.push(request);
    }

    /// Oldest-to-newest traversal; can be restarted any number of times
    pub fn iter(&self) -> impl Iterator<Item = &Arc<BorrowRequest>> {
        self.entries.iter()
    }

    /// Oldest-to-newest snapshot
    #[must_use]
    pub fn list(&self) -> Vec<Arc<BorrowRequest>> {
        self.entries.clone()
    }

    /// Discards every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// History logs for every requester seen in this session
#[derive(Clone, Debug, Default)]
pub struct HistoryBook {
    logs: HashMap<RequesterKey, HistoryLog>,
}

impl HistoryBook {
    /// Creates an empty book
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `request` to its requester's log
    pub fn append(&mut self, request: Arc<BorrowRequest>) {
        self.logs
            .entry(request.requester().key())
            .or_default()
            .append(request);
    }

    /// The requester's log, if anything was ever appended for them
    #[must_use]
    pub fn log(&self, requester: &Requester) -> Option<&HistoryLog> {
        self.logs.get(&requester.key())
    }

    /// Oldest-to-newest snapshot of the requester's history
    #[must_use]
    pub fn list(&self, requester: &Requester) -> Vec<Arc<BorrowRequest>> {
        self.log(requester).map(HistoryLog::list).unwrap_or_default()
    }

    /// Clears the requester's history
    pub fn clear(&mut self, requester: &Requester) {
        if let Some(log) = self.logs.get_mut(&requester.key()) {
            log.clear();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use crate::environment::SystemClock;
    use crate::types::ItemId;

    fn request(requester: &Requester, item: &str) -> Arc<BorrowRequest> {
        Arc::new(
            BorrowRequest::builder(requester.clone(), [ItemId::from(item)])
                .build(&SystemClock)
                .unwrap(),
        )
    }

    #[test]
    fn lists_oldest_first_and_clears() {
        let juan = Requester::new("Juan", "2026-12345", "");
        let mut log = HistoryLog::new();
        for item in ["Breadboard", "Switches", "Potentiometer"] {
            log.append(request(&juan, item));
        }

        let names: Vec<_> = log.iter().map(|r| r.items()[0].to_string()).collect();
        assert_eq!(names, ["Breadboard", "Switches", "Potentiometer"]);
        // traversal does not consume anything
        assert_eq!(log.list().len(), 3);

        log.clear();
        assert!(log.list().is_empty());
    }

    #[test]
    fn book_keeps_requesters_apart() {
        let juan = Requester::new("Juan", "2026-12345", "");
        let theresa = Requester::new("Theresa", "2026-00001", "theresa@school.edu");
        let mut book = HistoryBook::new();

        book.append(request(&juan, "Breadboard"));
        book.append(request(&theresa, "Switches"));
        book.append(request(&juan, "AC Voltmeter"));

        assert_eq!(book.list(&juan).len(), 2);
        assert_eq!(book.list(&theresa).len(), 1);

        book.clear(&juan);
        assert!(book.list(&juan).is_empty());
        assert_eq!(book.list(&theresa).len(), 1);
    }
}
