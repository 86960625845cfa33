use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while collecting or persisting profile statistics.
///
/// Only `MissingToken`, `Config` and `Write` are fatal for a run; every other
/// variant is turned into a zero value plus a diagnostic by the aggregator.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("GH_PAT is not set; an authenticated personal access token is required")]
    MissingToken,

    #[error("Invalid configuration: {0}")]
    Config(#[from] envy::Error),

    #[error("Network error sending GraphQL request: {0}")]
    Network(#[from] reqwest::Error),

    #[error("GitHub API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("GraphQL reported errors: {0}")]
    GraphQl(String),

    #[error("Failed to decode {what} response: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing field in response: {0}")]
    MissingField(&'static str),

    #[error("Invalid query window {from}..{to}: {reason}")]
    InvalidWindow {
        from: String,
        to: String,
        reason: &'static str,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize stats: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_token_mentions_variable() {
        let msg = StatsError::MissingToken.to_string();
        assert!(msg.contains("GH_PAT"));
    }

    #[test]
    fn test_http_error_display() {
        let err = StatsError::Http {
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert_eq!(err.to_string(), "GitHub API returned HTTP 502: Bad Gateway");
    }

    #[test]
    fn test_write_error_includes_path() {
        let err = StatsError::Write {
            path: PathBuf::from("/tmp/out/stats.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/out/stats.json"));
        assert!(msg.contains("denied"));
    }
}
