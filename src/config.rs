use crate::cli::Cli;
use crate::workout::Coords;
use std::path::PathBuf;

pub const DEFAULT_ZOOM: u8 = 13;

/// Settings resolved from flags, `MAPTY_*` env vars and defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub zoom: u8,
    pub origin: Coords,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            db_path: cli.db.clone().unwrap_or_else(default_db_path),
            zoom: cli.zoom,
            origin: cli.origin,
        }
    }
}

/// `<data dir>/mapty/workouts.db`, or `./mapty.db` when the platform has no
/// data dir.
pub fn default_db_path() -> PathBuf {
    dirs_next::data_dir().map_or_else(
        || PathBuf::from("mapty.db"),
        |d| d.join("mapty").join("workouts.db"),
    )
}
