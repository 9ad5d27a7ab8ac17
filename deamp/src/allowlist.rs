//! User-curated allowlist and per-hostname activation statistics,
//! the two record families kept in the preference store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::Hostname;

/// Hostnames exempted from interception.
/// Kept as an insertion-ordered list with no duplicate entries;
/// membership compares the encoded form of the hostname.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Allowlist {
    items: Vec<Hostname>,
}

impl Allowlist {
    pub fn contains(&self, hostname: &Hostname) -> bool {
        self.items.iter().any(|item| item == hostname)
    }

    /// Appends the hostname if it is not already listed.
    /// Returns whether the list changed.
    pub fn insert(&mut self, hostname: Hostname) -> bool {
        if self.contains(&hostname) {
            return false;
        }
        self.items.push(hostname);
        true
    }

    /// Removes the hostname if it is listed.
    /// Returns whether the list changed.
    pub fn remove(&mut self, hostname: &Hostname) -> bool {
        let previous_length = self.items.len();
        self.items.retain(|item| item != hostname);
        self.items.len() != previous_length
    }
}

/// Count of successful redirects per hostname.
/// Entries are never removed by the pipeline itself.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ActivationStats {
    counts: HashMap<String, u64>,
}

impl ActivationStats {
    /// Bumps the hostname by one, starting from zero for new entries.
    pub fn increment(&mut self, hostname: &str) {
        *self.counts.entry(String::from(hostname)).or_insert(0) += 1;
    }

    pub fn count(&self, hostname: &str) -> u64 {
        self.counts.get(hostname).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Per-hostname stats in descending order of activations.
    pub fn sorted(&self) -> Vec<HostStat> {
        let mut stats = self
            .counts
            .iter()
            .map(|(hostname, total)| HostStat {
                hostname: hostname.clone(),
                total_activations: *total,
            })
            .collect::<Vec<HostStat>>();
        stats.sort_by(|first, second| {
            second.total_activations.cmp(&first.total_activations)
        });
        stats
    }
}

/// One row of the activation stat listing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HostStat {
    pub hostname: String,
    pub total_activations: u64,
}

/// Reply payload for the website info query,
/// consumed by the pop-up surface only.
#[derive(Serialize)]
#[cfg_attr(test, derive(Debug, Eq, PartialEq))]
#[serde(rename_all = "camelCase")]
pub struct WebsiteInfo {
    pub hostname: String,
    pub total_activations: u64,
    pub is_on_allowlist: bool,
}
