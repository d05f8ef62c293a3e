//! Frontier (C1): the pending-URL queue plus the admission pipeline that
//! feeds it, per spec §4.1.

mod normalize;
mod visited;

pub use normalize::{normalize_url, visited_hash};
pub use visited::VisitedIndex;

use crate::config::types::DomainScopeConfig;
use crate::domain::scope::{check_scope, ScopeRejection};
use serde::{Deserialize, Serialize};
use url::Url;

/// A URL admitted to the Frontier, awaiting dispatch (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedUrl {
    pub url: Url,
    pub domain: String,
    pub depth: u32,
    pub added_at: i64,
    pub priority: i64,
    pub retry_count: u32,
}

/// Why `admit` refused a URL, mirroring spec §4.1's lettered reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    InvalidUrl,
    UnsupportedScheme,
    DomainBlocked,
    DomainNotAllowed,
    ExcludePatternMatched,
    IncludePatternNotMatched,
    DepthExceeded,
    AlreadyVisited,
    AlreadyQueued,
    QueueFull,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUrl => "invalid_url",
            Self::UnsupportedScheme => "unsupported_scheme",
            Self::DomainBlocked => "domain_blocked",
            Self::DomainNotAllowed => "domain_not_allowed",
            Self::ExcludePatternMatched => "exclude_pattern_matched",
            Self::IncludePatternNotMatched => "include_pattern_not_matched",
            Self::DepthExceeded => "depth_exceeded",
            Self::AlreadyVisited => "already_visited",
            Self::AlreadyQueued => "already_queued",
            Self::QueueFull => "queue_full",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdmitOutcome {
    Admitted(Url),
    Rejected(RejectReason),
}

/// The pending-URL queue. Ordering is a property of [`take`](Frontier::take),
/// not of insertion, so the backing store can stay a flat `Vec`.
#[derive(Debug, Default, Clone)]
pub struct Frontier {
    items: Vec<QueuedUrl>,
    queued_hashes: std::collections::HashSet<u32>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<QueuedUrl>) -> Self {
        let queued_hashes = items.iter().map(|item| visited_hash(&item.url)).collect();
        Self {
            items,
            queued_hashes,
        }
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[QueuedUrl] {
        &self.items
    }

    fn contains_hash(&self, hash: u32) -> bool {
        self.queued_hashes.contains(&hash)
    }

    fn push(&mut self, item: QueuedUrl) {
        self.queued_hashes.insert(visited_hash(&item.url));
        self.items.push(item);
    }

    /// Returns up to `n` items satisfying `pred`, ordered by
    /// `(-priority, addedAt)`, removing them from the Frontier.
    pub fn take<F>(&mut self, n: usize, mut pred: F) -> Vec<QueuedUrl>
    where
        F: FnMut(&QueuedUrl) -> bool,
    {
        if n == 0 || self.items.is_empty() {
            return Vec::new();
        }

        let mut order: Vec<usize> = (0..self.items.len()).collect();
        order.sort_by(|&a, &b| {
            let ia = &self.items[a];
            let ib = &self.items[b];
            ib.priority
                .cmp(&ia.priority)
                .then_with(|| ia.added_at.cmp(&ib.added_at))
        });

        let mut taken_indices = Vec::new();
        for &idx in &order {
            if taken_indices.len() >= n {
                break;
            }
            if pred(&self.items[idx]) {
                taken_indices.push(idx);
            }
        }

        taken_indices.sort_unstable_by(|a, b| b.cmp(a));
        let mut taken = Vec::with_capacity(taken_indices.len());
        for idx in taken_indices {
            let item = self.items.remove(idx);
            self.queued_hashes.remove(&visited_hash(&item.url));
            taken.push(item);
        }
        taken.reverse();
        taken
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.queued_hashes.clear();
    }
}

/// The full admission pipeline: normalize, scope-check, and insert, per
/// spec §4.1. `now_ms` is the caller-supplied current time (epoch
/// milliseconds) so callers can drive this deterministically in tests.
#[allow(clippy::too_many_arguments)]
pub fn admit(
    frontier: &mut Frontier,
    visited: &VisitedIndex,
    url_str: &str,
    depth: u32,
    priority: i64,
    now_ms: i64,
    scope: &DomainScopeConfig,
    max_depth: u32,
    max_queue_size: usize,
) -> AdmitOutcome {
    let normalized = match normalize_url(url_str) {
        Ok(url) => url,
        Err(crate::UrlError::InvalidScheme(_)) => {
            return AdmitOutcome::Rejected(RejectReason::UnsupportedScheme)
        }
        Err(_) => return AdmitOutcome::Rejected(RejectReason::InvalidUrl),
    };

    let domain = match normalized.host_str() {
        Some(host) => host.to_string(),
        None => return AdmitOutcome::Rejected(RejectReason::InvalidUrl),
    };

    if let Err(rejection) = check_scope(scope, &domain, normalized.as_str()) {
        return AdmitOutcome::Rejected(match rejection {
            ScopeRejection::DomainBlocked => RejectReason::DomainBlocked,
            ScopeRejection::DomainNotAllowed => RejectReason::DomainNotAllowed,
            ScopeRejection::ExcludePatternMatched => RejectReason::ExcludePatternMatched,
            ScopeRejection::IncludePatternNotMatched => RejectReason::IncludePatternNotMatched,
        });
    }

    if depth > max_depth {
        return AdmitOutcome::Rejected(RejectReason::DepthExceeded);
    }

    let hash = visited_hash(&normalized);
    if visited.contains(hash) {
        return AdmitOutcome::Rejected(RejectReason::AlreadyVisited);
    }
    if frontier.contains_hash(hash) {
        return AdmitOutcome::Rejected(RejectReason::AlreadyQueued);
    }

    if max_queue_size > 0 && frontier.size() >= max_queue_size {
        return AdmitOutcome::Rejected(RejectReason::QueueFull);
    }

    frontier.push(QueuedUrl {
        url: normalized.clone(),
        domain,
        depth,
        added_at: now_ms,
        priority,
        retry_count: 0,
    });

    AdmitOutcome::Admitted(normalized)
}
