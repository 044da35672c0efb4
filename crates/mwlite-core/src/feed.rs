//! Named groups of symbols and the per-cycle snapshot of their results.

use crate::error::{CoreError, Result};
use crate::point::FeedResult;
use crate::types::{Period, SymbolRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A validated, named list of symbol requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feed {
    name: String,
    requests: Vec<SymbolRequest>,
}

impl Feed {
    /// Validate and build a feed.
    ///
    /// Rejects an empty name, an empty request list, empty identifiers and
    /// duplicate (identifier, category) pairs.
    pub fn new(name: impl Into<String>, requests: Vec<SymbolRequest>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoreError::InvalidFeed("feed name is empty".to_string()));
        }
        if requests.is_empty() {
            return Err(CoreError::InvalidFeed(format!("feed '{name}' has no symbols")));
        }

        let mut seen = HashSet::new();
        for request in &requests {
            if request.identifier().trim().is_empty() {
                return Err(CoreError::InvalidFeed(format!(
                    "feed '{name}' has an empty symbol identifier"
                )));
            }
            let key = (
                request.identifier().to_ascii_uppercase(),
                request.category(),
            );
            if !seen.insert(key) {
                return Err(CoreError::InvalidFeed(format!(
                    "feed '{name}' lists {request} more than once"
                )));
            }
        }

        Ok(Self { name, requests })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn requests(&self) -> &[SymbolRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

/// Complete result list of one refresh cycle.
///
/// Replaces the previous snapshot wholesale; never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    pub feed: String,
    pub period: Period,
    /// 1-based refresh cycle counter.
    pub cycle: u64,
    pub fetched_at: DateTime<Utc>,
    pub results: Vec<FeedResult>,
}

impl FeedSnapshot {
    /// True if any entry's live attempt errored this cycle.
    pub fn has_errors(&self) -> bool {
        self.results.iter().any(FeedResult::had_error)
    }

    /// Number of entries whose live attempt errored.
    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.had_error()).count()
    }
}
