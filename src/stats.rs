//! Progress statistics carried alongside result batches.
//!
//! Every [`Event`](crate::Event) carries a statistics summary. The limiting
//! sink and the collector never look inside it beyond two capabilities,
//! captured by [`StatsSummary`]: merging two summaries and marking one as the
//! terminal "limit hit" signal.
//!
//! [`Stats`] is the summary shipped with the crate. It records which
//! repositories were searched, per-repository status flags and how many
//! repositories were excluded up front.
//!
//! # Example
//!
//! ```
//! use limitstream::{Semigroup, Stats, RepoStatus};
//!
//! let first = Stats::default().with_repo("github.com/a/a", RepoStatus::SEARCHED);
//! let second = Stats::default()
//!     .with_repo("github.com/b/b", RepoStatus::CLONING)
//!     .with_excluded_forks(2);
//!
//! let merged = first.combine(second);
//! assert_eq!(merged.repos.len(), 2);
//! assert_eq!(merged.excluded_forks, 2);
//! assert!(!merged.is_limit_hit);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::BitOr;

use crate::semigroup::{Monoid, Semigroup};

/// Capability required of a statistics summary flowing through a stream.
///
/// Merging is [`Semigroup::combine`]; the identity is [`Monoid::empty`].
pub trait StatsSummary: Monoid + Send {
    /// A summary that records nothing except that the result limit was hit.
    fn limit_hit() -> Self;

    /// Whether this summary carries the limit-hit flag.
    fn is_limit_hit(&self) -> bool;
}

/// Status flags observed for a single repository.
///
/// Flags only accumulate: merging two statuses ORs them.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RepoStatus(u8);

impl RepoStatus {
    /// No flags set.
    pub const NONE: RepoStatus = RepoStatus(0);
    /// The repository was searched.
    pub const SEARCHED: RepoStatus = RepoStatus(1 << 0);
    /// The repository was served from an index.
    pub const INDEXED: RepoStatus = RepoStatus(1 << 1);
    /// The repository is still being cloned and was not searched.
    pub const CLONING: RepoStatus = RepoStatus(1 << 2);
    /// The repository does not exist on the backend.
    pub const MISSING: RepoStatus = RepoStatus(1 << 3);
    /// Searching the repository timed out.
    pub const TIMED_OUT: RepoStatus = RepoStatus(1 << 4);
    /// The per-repository result limit was reached.
    pub const LIMIT_HIT: RepoStatus = RepoStatus(1 << 5);

    const NAMES: [(RepoStatus, &'static str); 6] = [
        (RepoStatus::SEARCHED, "searched"),
        (RepoStatus::INDEXED, "indexed"),
        (RepoStatus::CLONING, "cloning"),
        (RepoStatus::MISSING, "missing"),
        (RepoStatus::TIMED_OUT, "timed_out"),
        (RepoStatus::LIMIT_HIT, "limit_hit"),
    ];

    /// Whether every flag in `other` is set in `self`.
    pub fn contains(self, other: RepoStatus) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no flag is set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for RepoStatus {
    type Output = RepoStatus;

    fn bitor(self, rhs: Self) -> Self::Output {
        RepoStatus(self.0 | rhs.0)
    }
}

impl Semigroup for RepoStatus {
    fn combine(self, other: Self) -> Self {
        self | other
    }
}

impl fmt::Debug for RepoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "RepoStatus({})", names.join("|"))
    }
}

/// Aggregated progress statistics of a streaming search.
///
/// `Stats::default()` is the merge identity. Merging is associative and
/// commutative:
/// - `is_limit_hit` is ORed
/// - `repos` is a set union
/// - `status` flags are ORed per repository
/// - exclusion counters are summed (saturating)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Stats {
    /// Set only on the synthetic terminal event emitted when a limit trips.
    pub is_limit_hit: bool,
    /// Repositories that took part in the search.
    pub repos: BTreeSet<String>,
    /// Status flags per repository.
    pub status: BTreeMap<String, RepoStatus>,
    /// Repositories skipped because they are forks.
    pub excluded_forks: u64,
    /// Repositories skipped because they are archived.
    pub excluded_archived: u64,
}

impl Stats {
    /// Record `repo` with the given status flags.
    pub fn with_repo(mut self, repo: impl Into<String>, status: RepoStatus) -> Self {
        let repo = repo.into();
        if !status.is_empty() {
            let entry = self.status.entry(repo.clone()).or_default();
            *entry = *entry | status;
        }
        self.repos.insert(repo);
        self
    }

    /// Add `count` excluded fork repositories.
    pub fn with_excluded_forks(mut self, count: u64) -> Self {
        self.excluded_forks = self.excluded_forks.saturating_add(count);
        self
    }

    /// Add `count` excluded archived repositories.
    pub fn with_excluded_archived(mut self, count: u64) -> Self {
        self.excluded_archived = self.excluded_archived.saturating_add(count);
        self
    }

    /// Repositories whose status contains every flag in `flags`.
    pub fn repos_with(&self, flags: RepoStatus) -> impl Iterator<Item = &str> + '_ {
        self.status
            .iter()
            .filter(move |(_, status)| status.contains(flags))
            .map(|(repo, _)| repo.as_str())
    }

    /// Summary with nothing recorded; the identity for merging.
    pub fn zero() -> Self {
        Stats::default()
    }

    /// Whether nothing has been recorded.
    pub fn is_zero(&self) -> bool {
        *self == Stats::default()
    }
}

impl Semigroup for Stats {
    fn combine(mut self, other: Self) -> Self {
        self.update(other);
        self
    }

    fn update(&mut self, other: Self) {
        self.is_limit_hit |= other.is_limit_hit;
        self.repos.update(other.repos);
        self.status.update(other.status);
        self.excluded_forks = self.excluded_forks.saturating_add(other.excluded_forks);
        self.excluded_archived = self
            .excluded_archived
            .saturating_add(other.excluded_archived);
    }
}

impl Monoid for Stats {
    fn empty() -> Self {
        Stats::default()
    }
}

impl StatsSummary for Stats {
    fn limit_hit() -> Self {
        Stats {
            is_limit_hit: true,
            ..Stats::default()
        }
    }

    fn is_limit_hit(&self) -> bool {
        self.is_limit_hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_hit_summary_only_sets_flag() {
        let stats = Stats::limit_hit();
        assert!(stats.is_limit_hit());
        assert!(stats.repos.is_empty());
        assert!(!stats.is_zero());
    }

    #[test]
    fn test_zero_is_merge_identity() {
        let stats = Stats::default()
            .with_repo("github.com/a/b", RepoStatus::SEARCHED)
            .with_excluded_forks(2);

        assert!(Stats::zero().is_zero());
        assert_eq!(Stats::zero(), Stats::empty());
        assert_eq!(Stats::zero().combine(stats.clone()), stats);
        assert_eq!(stats.clone().combine(Stats::zero()), stats);
    }

    #[test]
    fn test_limit_flag_is_sticky() {
        let merged = Stats::limit_hit().combine(Stats::default());
        assert!(merged.is_limit_hit);

        let merged = Stats::default().combine(Stats::limit_hit());
        assert!(merged.is_limit_hit);
    }

    #[test]
    fn test_duplicate_limit_hit_merges_to_one_flag() {
        let merged = Stats::limit_hit().combine(Stats::limit_hit());
        assert_eq!(merged, Stats::limit_hit());
    }

    #[test]
    fn test_status_flags_accumulate_per_repo() {
        let a = Stats::default().with_repo("r", RepoStatus::SEARCHED);
        let b = Stats::default().with_repo("r", RepoStatus::TIMED_OUT);

        let merged = a.combine(b);

        assert_eq!(merged.repos.len(), 1);
        assert!(merged.status["r"].contains(RepoStatus::SEARCHED | RepoStatus::TIMED_OUT));
        assert_eq!(merged.repos_with(RepoStatus::TIMED_OUT).collect::<Vec<_>>(), vec!["r"]);
    }

    #[test]
    fn test_repo_without_flags_has_no_status_entry() {
        let stats = Stats::default().with_repo("r", RepoStatus::NONE);
        assert!(stats.repos.contains("r"));
        assert!(stats.status.is_empty());
    }

    #[test]
    fn test_exclusion_counters_saturate() {
        let a = Stats::default().with_excluded_forks(u64::MAX);
        let b = Stats::default().with_excluded_forks(1).with_excluded_archived(3);

        let merged = a.combine(b);

        assert_eq!(merged.excluded_forks, u64::MAX);
        assert_eq!(merged.excluded_archived, 3);
    }

    #[test]
    fn test_repo_status_debug_lists_flags() {
        let status = RepoStatus::SEARCHED | RepoStatus::INDEXED;
        assert_eq!(format!("{:?}", status), "RepoStatus(searched|indexed)");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_stats_serde_round_trip() {
        let stats = Stats::default()
            .with_repo("r", RepoStatus::CLONING)
            .with_excluded_archived(1);

        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"excludedArchived\":1"));

        let back: Stats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
