//! Collects GitHub account statistics over the GraphQL API and writes them
//! to a JSON snapshot for profile badges.

pub mod aggregator;
pub mod calendar;
pub mod config;
pub mod error;
pub mod github;
pub mod snapshot;
pub mod stats;

pub use aggregator::StatsAggregator;
pub use config::AppConfig;
pub use error::StatsError;
pub use github::{GithubClient, GraphqlRequest, GraphqlTransport};
pub use stats::{ProfileCounts, StatsRecord};
