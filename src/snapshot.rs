use crate::config::AppConfig;
use crate::error::{Result, StatsError};
use crate::stats::StatsRecord;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Where the snapshot goes: the workspace directory if set, else the current directory.
pub fn output_path(config: &AppConfig) -> PathBuf {
    let dir = config
        .output_dir
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join(&config.output_file)
}

/// Pretty-print `record` with 4-space indentation.
pub fn render(record: &StatsRecord) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    record.serialize(&mut ser)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write the snapshot, replacing any previous file at `path`.
pub fn write_snapshot(record: &StatsRecord, path: &Path) -> Result<()> {
    let body = render(record)?;
    fs::write(path, body).map_err(|source| StatsError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Successfully updated stats at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn config(output_dir: Option<PathBuf>) -> AppConfig {
        AppConfig {
            token: "ghp_test".to_string(),
            username: "octocat".to_string(),
            output_dir,
            output_file: "stats.json".to_string(),
            api_url: "http://localhost/graphql".to_string(),
            request_timeout: Duration::from_secs(1),
        }
    }

    fn record() -> StatsRecord {
        let mut record =
            StatsRecord::new("octocat", Utc.with_ymd_and_hms(2021, 6, 20, 12, 0, 0).unwrap());
        record.followers = 8;
        record
    }

    #[test]
    fn test_output_path_prefers_workspace() {
        let path = output_path(&config(Some(PathBuf::from("/work/repo"))));
        assert_eq!(path, PathBuf::from("/work/repo/stats.json"));
    }

    #[test]
    fn test_output_path_defaults_to_cwd() {
        let path = output_path(&config(None));
        assert_eq!(path, std::env::current_dir().unwrap().join("stats.json"));
    }

    #[test]
    fn test_render_uses_four_space_indent() {
        let text = render(&record()).unwrap();
        assert!(text.starts_with("{\n    \"username\": \"octocat\""));
        assert!(text.contains("\n    \"errorFetching\": null"));
    }

    #[test]
    fn test_write_snapshot_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");

        write_snapshot(&record(), &path).unwrap();

        let written: StatsRecord =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, record());
    }

    #[test]
    fn test_write_snapshot_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("stats.json");

        let err = write_snapshot(&record(), &path).unwrap_err();
        assert!(matches!(err, StatsError::Write { .. }));
    }
}
