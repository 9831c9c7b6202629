//! Logging is installed before settings are resolved.
//!
//! Kept in its own test binary: the global subscriber can be set only once.

use clap::Parser;

use ufan_cli::{Cli, run_with_env};

#[tokio::test]
async fn test_env_overrides_reach_the_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ufan.log");
    let path_arg = path.to_str().unwrap();

    let cli = Cli::parse_from(["ufan", "-v", "--log-file", path_arg, "settings"]);
    let lookup = |key: &str| (key == "UFAN_HEARTBEAT_INTERVAL_MS").then(|| "2000".to_string());
    tokio_test::assert_ok!(run_with_env(cli, lookup).await);

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(
        contents.contains("Settings override from environment"),
        "log file was: {contents}"
    );
    assert!(contents.contains("UFAN_HEARTBEAT_INTERVAL_MS"));
}
