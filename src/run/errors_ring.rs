//! Recent Errors Ring (spec §3): the 50 most recent failures, for
//! operator-visible diagnostics via `GET /stats`.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

const CAPACITY: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecentError {
    pub url: String,
    pub domain: String,
    pub status_code: Option<u16>,
    pub message: String,
    pub timestamp: i64,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentErrorsRing {
    entries: VecDeque<RecentError>,
}

impl RecentErrorsRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: VecDeque<RecentError>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, error: RecentError) {
        self.entries.push_back(error);
        while self.entries.len() > CAPACITY {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> &VecDeque<RecentError> {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(n: i64) -> RecentError {
        RecentError {
            url: format!("https://a.test/{n}"),
            domain: "a.test".to_string(),
            status_code: Some(500),
            message: "server error".to_string(),
            timestamp: n,
        }
    }

    #[test]
    fn truncates_to_capacity() {
        let mut ring = RecentErrorsRing::new();
        for i in 0..60 {
            ring.push(error(i));
        }
        assert_eq!(ring.entries().len(), CAPACITY);
        assert_eq!(ring.entries().front().unwrap().timestamp, 10);
        assert_eq!(ring.entries().back().unwrap().timestamp, 59);
    }
}
