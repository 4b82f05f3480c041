use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Write `contents` to a uniquely named file in the system temp dir
pub fn temp_file(name: &str, contents: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!(
        "envpipe_{}_{}_{}",
        std::process::id(),
        nanos,
        name
    ));
    std::fs::write(&path, contents).unwrap();
    path
}
