use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use show_directory::models::{ArtistForm, ShowForm, VenueForm};
use show_directory::{logging, open_directory, ConfigStore};

#[derive(Parser)]
#[command(name = "show-directory", about = "Venue, artist and show listings")]
struct Cli {
    /// SQLite database to use instead of the configured one.
    #[arg(long, env = "SHOW_DIRECTORY_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Counts of venues, artists and shows.
    Home,
    /// Venues grouped by city and state.
    Venues,
    Venue { id: i64 },
    SearchVenues { term: String },
    /// Create a venue from a JSON form.
    AddVenue { form: String },
    EditVenue { id: i64, form: String },
    DeleteVenue { id: i64 },
    Artists,
    Artist { id: i64 },
    SearchArtists { term: String },
    AddArtist { form: String },
    EditArtist { id: i64, form: String },
    /// Most recent shows.
    Shows,
    /// Create a show from `{"artist_id":..,"venue_id":..,"start_time":"YYYY-MM-DDTHH:MM:SS"}`.
    AddShow { form: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ConfigStore::load().read();
    logging::init(config.log_filter.as_deref());
    if let Some(db) = cli.db {
        config.database_path = Some(db);
    }

    let mut directory = open_directory(config).context("failed to open directory database")?;

    match cli.command {
        Command::Home => print(&directory.home()?),
        Command::Venues => print(&directory.venues()?),
        Command::Venue { id } => print(&directory.venue_detail(id)?),
        Command::SearchVenues { term } => print(&directory.search_venues(&term)?),
        Command::AddVenue { form } => {
            let form: VenueForm = serde_json::from_str(&form).context("invalid venue form")?;
            print(&directory.create_venue(&form)?)
        }
        Command::EditVenue { id, form } => {
            let form: VenueForm = serde_json::from_str(&form).context("invalid venue form")?;
            directory.edit_venue(id, &form)?;
            print(&directory.venue_detail(id)?)
        }
        Command::DeleteVenue { id } => {
            directory.delete_venue(id)?;
            print(&serde_json::json!({ "success": true }))
        }
        Command::Artists => print(&directory.artists()?),
        Command::Artist { id } => print(&directory.artist_detail(id)?),
        Command::SearchArtists { term } => print(&directory.search_artists(&term)?),
        Command::AddArtist { form } => {
            let form: ArtistForm = serde_json::from_str(&form).context("invalid artist form")?;
            print(&directory.create_artist(&form)?)
        }
        Command::EditArtist { id, form } => {
            let form: ArtistForm = serde_json::from_str(&form).context("invalid artist form")?;
            directory.edit_artist(id, &form)?;
            print(&directory.artist_detail(id)?)
        }
        Command::Shows => print(&directory.shows()?),
        Command::AddShow { form } => {
            let form: ShowForm = serde_json::from_str(&form).context("invalid show form")?;
            print(&directory.create_show(&form)?)
        }
    }
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
