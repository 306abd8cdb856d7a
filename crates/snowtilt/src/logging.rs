//! File logging.
//!
//! The terminal is owned by the UI, so records go to a file in the platform
//! data directory. `RUST_LOG` sets the filter (default `info`).

use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use directories::ProjectDirs;
use env_logger::{Env, Target};

/// Route `log` records to the snowtilt log file.
///
/// Returns the file path, or `None` if logging could not be set up. Failing
/// to log is never fatal.
pub fn init() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "snowtilt")?;
    let dir = dirs.data_local_dir();
    fs::create_dir_all(dir).ok()?;

    let path = dir.join("snowtilt.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()
        .ok()?;
    Some(path)
}
