pub mod aggregate;
pub mod clock;
pub mod config;
pub mod db;
pub mod directory;
pub mod display;
pub mod error;
pub mod logging;
pub mod models;
mod utils;

pub use aggregate::{
    group_venues_by_location, partition_shows_for_entity, recent_shows, search_by_name, Role,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AppConfig, ConfigStore};
pub use db::Store;
pub use directory::Directory;
pub use display::{format_display_time, DisplayStyle};
pub use error::{Error, Result};

/// Opens the configured database and wires it to the system clock.
pub fn open_directory(config: AppConfig) -> Result<Directory<SystemClock>> {
    let path = config.database_path();
    utils::ensure_parent(&path);
    let store = Store::open(&path)?;
    Ok(Directory::new(store, SystemClock, config))
}
