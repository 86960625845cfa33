//! Collects the profile statistics for one account.
//!
//! Every fetch here is best-effort: a failed call yields a zero (or the
//! fallback creation date) and a diagnostic, never an error. The only thing
//! that can stop a run is the caller failing to build a transport or to write
//! the snapshot.

use crate::calendar::{self, YearWindow};
use crate::config::AppConfig;
use crate::error::{Result, StatsError};
use crate::github::{GraphqlRequest, GraphqlTransport, decode_data, decode_partial};
use crate::stats::{Diagnostics, ProfileCounts, StatsRecord};
use chrono::{DateTime, SecondsFormat, TimeDelta, TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

const CREATED_AT_QUERY: &str = r#"
query($userName: String!) {
  user(login: $userName) {
    createdAt
  }
}
"#;

const CONTRIBUTIONS_QUERY: &str = r#"
query($userName: String!, $from: DateTime!, $to: DateTime!) {
  user(login: $userName) {
    contributionsCollection(from: $from, to: $to) {
      contributionCalendar {
        totalContributions
      }
    }
  }
}
"#;

const PROFILE_QUERY: &str = r#"
query($userName: String!) {
  user(login: $userName) {
    repositories(first: 100, ownerAffiliations: OWNER, orderBy: {field: STARGAZERS, direction: DESC}) {
      totalCount
      nodes {
        stargazerCount
        isPrivate
      }
    }
    followers {
      totalCount
    }
    following {
      totalCount
    }
  }
}
"#;

/// Used as the all-time start when the account creation date can't be fetched.
pub fn fallback_created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2008, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

#[derive(Deserialize)]
struct CountObj {
    #[serde(rename = "totalCount")]
    total_count: u64,
}

pub struct StatsAggregator<T> {
    transport: T,
    username: String,
    now: DateTime<Utc>,
    diagnostics: Diagnostics,
}

impl<T: GraphqlTransport> StatsAggregator<T> {
    /// Aggregator for the configured account, stamped with the current time.
    pub fn new(transport: T, config: &AppConfig) -> Self {
        Self::at(transport, config.username.clone(), Utc::now())
    }

    /// Aggregator with an explicit notion of "now".
    pub fn at(transport: T, username: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            transport,
            username: username.into(),
            now,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Account creation time, or [`fallback_created_at`] on any failure.
    pub async fn fetch_account_creation_date(&mut self, username: &str) -> DateTime<Utc> {
        match self.try_creation_date(username).await {
            Ok(created_at) => {
                info!("User {username} created at {created_at}");
                created_at
            }
            Err(e) => {
                let fallback = fallback_created_at();
                self.diagnostics.record(format!(
                    "Could not fetch creation date for {username} (using {fallback}): {e}"
                ));
                fallback
            }
        }
    }

    async fn try_creation_date(&self, username: &str) -> Result<DateTime<Utc>> {
        #[derive(Deserialize)]
        struct CreatedData {
            user: Option<CreatedUser>,
        }
        #[derive(Deserialize)]
        struct CreatedUser {
            #[serde(rename = "createdAt")]
            created_at: Option<DateTime<Utc>>,
        }

        let request = GraphqlRequest::new(CREATED_AT_QUERY, json!({ "userName": username }));
        let json = self.transport.execute(&request).await?;
        let data: CreatedData = decode_data(json, "createdAt")?;

        data.user
            .ok_or(StatsError::MissingField("user"))?
            .created_at
            .ok_or(StatsError::MissingField("createdAt"))
    }

    /// Contributions inside `[from, to]`, or 0 on any failure.
    pub async fn fetch_contributions_for_period(
        &mut self,
        username: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> u64 {
        let window = YearWindow::new(from, to);
        match self.try_contributions(username, window).await {
            Ok(total) => {
                debug!("{total} contributions in {window}");
                total
            }
            Err(e) => {
                self.diagnostics
                    .record(format!("Could not fetch contributions for {window}: {e}"));
                0
            }
        }
    }

    async fn try_contributions(&self, username: &str, window: YearWindow) -> Result<u64> {
        #[derive(Deserialize)]
        struct ContribData {
            user: Option<ContribUser>,
        }
        #[derive(Deserialize)]
        struct ContribUser {
            #[serde(rename = "contributionsCollection")]
            contributions_collection: Option<ContribCollection>,
        }
        #[derive(Deserialize)]
        struct ContribCollection {
            #[serde(rename = "contributionCalendar")]
            contribution_calendar: Option<Calendar>,
        }
        #[derive(Deserialize)]
        struct Calendar {
            #[serde(rename = "totalContributions")]
            total_contributions: u64,
        }

        if !window.is_queryable() {
            return Err(StatsError::InvalidWindow {
                from: iso(window.from),
                to: iso(window.to),
                reason: if window.from > window.to {
                    "start is after end"
                } else {
                    "longer than one year"
                },
            });
        }

        let request = GraphqlRequest::new(
            CONTRIBUTIONS_QUERY,
            json!({
                "userName": username,
                "from": iso(window.from),
                "to": iso(window.to),
            }),
        );
        let json = self.transport.execute(&request).await?;
        let data: ContribData = decode_data(json, "contributionsCollection")?;

        data.user
            .ok_or(StatsError::MissingField("user"))?
            .contributions_collection
            .and_then(|c| c.contribution_calendar)
            .map(|c| c.total_contributions)
            .ok_or(StatsError::MissingField("contributionCalendar"))
    }

    /// Sum of per-calendar-year contribution totals from `created_at` to now.
    pub async fn fetch_all_time_contributions(
        &mut self,
        username: &str,
        created_at: DateTime<Utc>,
    ) -> u64 {
        let windows = calendar::year_windows(created_at, self.now);
        if windows.is_empty() {
            self.diagnostics.record(format!(
                "Account creation time {} is after the fetch time {}; all-time contributions left at 0",
                iso(created_at),
                iso(self.now)
            ));
            return 0;
        }
        info!(
            "Fetching all-time contributions over {} yearly windows",
            windows.len()
        );

        let mut total = 0u64;
        for window in windows {
            let count = self
                .fetch_contributions_for_period(username, window.from, window.to)
                .await;
            total = total.saturating_add(count);
        }
        total
    }

    /// Contributions over the trailing 365 days.
    pub async fn fetch_last_year_contributions(&mut self, username: &str) -> u64 {
        let to = self.now;
        let from = to - TimeDelta::days(365);
        self.fetch_contributions_for_period(username, from, to).await
    }

    /// Repository, star and follower counts; zeros on failure.
    ///
    /// Partial data that arrives with GraphQL `errors` is still used, and the
    /// errors are recorded as a diagnostic.
    pub async fn fetch_profile_counts(&mut self, username: &str) -> ProfileCounts {
        match self.try_profile_counts(username).await {
            Ok((counts, None)) => counts,
            Ok((counts, Some(errors))) => {
                self.diagnostics.record(format!(
                    "Partial profile data for {username}: GraphQL reported errors: {errors}"
                ));
                counts
            }
            Err(e) => {
                self.diagnostics
                    .record(format!("Could not fetch profile counts for {username}: {e}"));
                ProfileCounts::default()
            }
        }
    }

    async fn try_profile_counts(
        &self,
        username: &str,
    ) -> Result<(ProfileCounts, Option<String>)> {
        #[derive(Deserialize)]
        struct ProfileData {
            user: Option<ProfileUser>,
        }
        #[derive(Deserialize)]
        struct ProfileUser {
            repositories: Option<RepoConnection>,
            followers: Option<CountObj>,
            following: Option<CountObj>,
        }
        #[derive(Deserialize)]
        struct RepoConnection {
            #[serde(rename = "totalCount")]
            total_count: u64,
            nodes: Option<Vec<Option<RepoNode>>>,
        }
        #[derive(Deserialize)]
        struct RepoNode {
            #[serde(rename = "stargazerCount", default)]
            stargazer_count: u64,
            #[serde(rename = "isPrivate", default)]
            is_private: bool,
        }

        let request = GraphqlRequest::new(PROFILE_QUERY, json!({ "userName": username }));
        let json = self.transport.execute(&request).await?;
        let (data, errors): (ProfileData, _) = decode_partial(json, "profile")?;
        let user = data.user.ok_or(StatsError::MissingField("user"))?;

        let mut counts = ProfileCounts::default();
        if let Some(repos) = user.repositories {
            counts.total_repos = repos.total_count;
            for node in repos.nodes.unwrap_or_default().into_iter().flatten() {
                counts.stars = counts.stars.saturating_add(node.stargazer_count);
                if !node.is_private {
                    counts.public_repos += 1;
                }
            }
        }
        counts.followers = user.followers.map(|c| c.total_count).unwrap_or(0);
        counts.following = user.following.map(|c| c.total_count).unwrap_or(0);

        Ok((counts, errors))
    }

    /// Run every fetch in order and build the snapshot.
    pub async fn assemble_record(&mut self) -> StatsRecord {
        let username = self.username.clone();
        let mut record = StatsRecord::new(&username, self.now);

        let created_at = self.fetch_account_creation_date(&username).await;
        record.total_contributions_all_time =
            self.fetch_all_time_contributions(&username, created_at).await;
        record.total_contributions_last_year = self.fetch_last_year_contributions(&username).await;

        let counts = self.fetch_profile_counts(&username).await;
        record.apply_profile(&counts);

        record.error_fetching = self.diagnostics.first().map(str::to_owned);
        record
    }
}

fn iso(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}
