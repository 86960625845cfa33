use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The snapshot persisted at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRecord {
    pub username: String,
    pub total_contributions_all_time: u64,
    pub total_contributions_last_year: u64,
    pub total_repositories: u64,
    pub public_repositories: u64,
    pub private_repositories: u64,
    pub followers: u64,
    pub following: u64,
    pub total_stars_received: u64,
    pub data_fetched_at: DateTime<Utc>,
    pub error_fetching: Option<String>,
}

impl StatsRecord {
    /// A zeroed record for `username`, stamped at `fetched_at`.
    pub fn new(username: impl Into<String>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            username: username.into(),
            total_contributions_all_time: 0,
            total_contributions_last_year: 0,
            total_repositories: 0,
            public_repositories: 0,
            private_repositories: 0,
            followers: 0,
            following: 0,
            total_stars_received: 0,
            data_fetched_at: fetched_at,
            error_fetching: None,
        }
    }

    pub fn apply_profile(&mut self, counts: &ProfileCounts) {
        self.total_repositories = counts.total_repos;
        self.public_repositories = counts.public_repos;
        self.private_repositories = counts.private_repos();
        self.total_stars_received = counts.stars;
        self.followers = counts.followers;
        self.following = counts.following;
    }
}

/// Repository, star and social counts from a single profile query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileCounts {
    pub total_repos: u64,
    pub public_repos: u64,
    pub stars: u64,
    pub followers: u64,
    pub following: u64,
}

impl ProfileCounts {
    /// Never negative, even if the fetched nodes disagree with `totalCount`.
    pub fn private_repos(&self) -> u64 {
        self.total_repos.saturating_sub(self.public_repos)
    }
}

/// First-error-wins diagnostic slot for one run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    first: Option<String>,
    count: usize,
}

impl Diagnostics {
    /// Record a non-fatal failure. Only the first message is kept; all are logged.
    pub fn record(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{message}");
        self.count += 1;
        if self.first.is_none() {
            self.first = Some(message);
        }
    }

    pub fn first(&self) -> Option<&str> {
        self.first.as_deref()
    }

    pub fn count(&self) -> usize {
        self.count
    }
}
