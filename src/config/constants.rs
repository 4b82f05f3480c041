//! Constants for envpipe

use std::path::PathBuf;
use std::sync::OnceLock;

/// Full path of the executable file
pub static EXECUTABLE_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Default pipeline config file
pub const CONFIG_FILE: &str = "pipeline.json";

/// Pipeline name used when the config omits one
pub const DEFAULT_PIPELINE_NAME: &str = "envpipe";

/// Producer channel capacity; 1 is a blocking handoff
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1;

/// Log directory, next to the executable
pub const LOGS_DIR: &str = "logs";

/// Metadata tag applied by the demo pipeline
pub const DEMO_TAG_KEY: &str = "processed_by";
pub const DEMO_TAG_VALUE: &str = "demo";

pub fn init_constants() -> std::io::Result<()> {
    if EXECUTABLE_PATH.get().is_none() {
        let exe_path = std::env::current_exe()?;
        // Lost race means another caller stored the same path.
        let _ = EXECUTABLE_PATH.set(exe_path);
    }
    Ok(())
}
