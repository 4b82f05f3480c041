//! Per-run log files, named after the pipeline command being executed

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::constants::{DEFAULT_PIPELINE_NAME, EXECUTABLE_PATH, LOGS_DIR};

type LogResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// `<run>_<pid>_<timestamp>.log`; anything outside `[A-Za-z0-9._-]` in the run name becomes `_`
pub fn log_file_name(run_name: &str, pid: u32, timestamp: u64) -> String {
    let run: String = run_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let run = if run.is_empty() {
        DEFAULT_PIPELINE_NAME
    } else {
        run.as_str()
    };

    format!("{run}_{pid}_{timestamp}.log")
}

/// `logs/` next to the executable, created on demand
pub fn logs_dir() -> LogResult<PathBuf> {
    let dir = EXECUTABLE_PATH
        .get()
        .ok_or("EXECUTABLE_PATH not initialized")?
        .parent()
        .ok_or("Cannot get executable parent directory")?
        .join(LOGS_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Open a fresh log file for one run and return it with its path
pub fn create_log_file(run_name: &str) -> LogResult<(File, PathBuf)> {
    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let path = logs_dir()?.join(log_file_name(run_name, std::process::id(), timestamp));

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)?;

    Ok((file, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_name_uses_run_name() {
        assert_eq!(log_file_name("demo", 42, 100), "demo_42_100.log");
        assert_eq!(
            log_file_name("run-users.v2", 7, 1),
            "run-users.v2_7_1.log"
        );
    }

    #[test]
    fn test_log_file_name_sanitizes() {
        assert_eq!(
            log_file_name("run-my pipeline/x", 1, 2),
            "run-my_pipeline_x_1_2.log"
        );
        assert_eq!(log_file_name("  ", 1, 2), "envpipe_1_2.log");
    }
}
