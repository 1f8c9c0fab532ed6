use serde::Serialize;
use tracing::{info, warn};

use crate::aggregate::{
    artist_listings, group_venues_by_location, recent_shows_with_style, ArtistDetailView,
    ArtistListing, LocationGroup, SearchResults, ShowListing, VenueDetailView,
};
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::db::{Store, Totals};
use crate::error::Result;
use crate::models::{Artist, ArtistForm, Show, ShowForm, Venue, VenueForm};

#[derive(Debug, Clone, Serialize)]
pub struct SearchPage<T> {
    pub results: SearchResults<T>,
    pub search_term: String,
}

/// Page-level operations over a store. Every read that classifies shows takes the
/// reference time from `clock` exactly once.
pub struct Directory<C: Clock = SystemClock> {
    store: Store,
    clock: C,
    config: AppConfig,
}

impl<C: Clock> Directory<C> {
    pub fn new(store: Store, clock: C, config: AppConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn home(&self) -> Result<Totals> {
        self.store.totals()
    }

    // Venues

    pub fn venues(&self) -> Result<Vec<LocationGroup>> {
        let venues = self.store.list_venues()?;
        let shows = self.store.list_show_rows()?;
        Ok(group_venues_by_location(&venues, &shows, self.clock.now()))
    }

    pub fn search_venues(&self, term: &str) -> Result<SearchPage<Venue>> {
        Ok(SearchPage {
            results: self.store.search_venues(term)?,
            search_term: term.to_string(),
        })
    }

    pub fn venue_detail(&self, id: i64) -> Result<VenueDetailView> {
        let venue = self.store.get_venue(id)?;
        let shows = self.store.list_show_rows()?;
        Ok(VenueDetailView::build(
            venue,
            &shows,
            self.clock.now(),
            self.config.display_style,
        ))
    }

    pub fn venue_form(&self, id: i64) -> Result<VenueForm> {
        Ok(VenueForm::from(&self.store.get_venue(id)?))
    }

    pub fn create_venue(&self, form: &VenueForm) -> Result<i64> {
        match self.store.insert_venue(form) {
            Ok(id) => {
                info!("Venue {} was successfully listed!", form.name);
                Ok(id)
            }
            Err(err) => {
                warn!("An error occurred. Venue {} could not be listed: {err}", form.name);
                Err(err)
            }
        }
    }

    pub fn edit_venue(&mut self, id: i64, form: &VenueForm) -> Result<()> {
        match self.store.update_venue(id, form) {
            Ok(()) => {
                info!("Venue {} was successfully updated!", form.name);
                Ok(())
            }
            Err(err) => {
                warn!("An error occurred. Update Venue {} failed: {err}", form.name);
                Err(err)
            }
        }
    }

    pub fn delete_venue(&mut self, id: i64) -> Result<Venue> {
        match self.store.delete_venue(id) {
            Ok(venue) => {
                info!("Venue {} deleted successfully.", venue.name);
                Ok(venue)
            }
            Err(err) => {
                warn!("Delete venue {id} failed: {err}");
                Err(err)
            }
        }
    }

    // Artists

    pub fn artists(&self) -> Result<Vec<ArtistListing>> {
        Ok(artist_listings(&self.store.list_artists()?))
    }

    pub fn search_artists(&self, term: &str) -> Result<SearchPage<Artist>> {
        Ok(SearchPage {
            results: self.store.search_artists(term)?,
            search_term: term.to_string(),
        })
    }

    pub fn artist_detail(&self, id: i64) -> Result<ArtistDetailView> {
        let artist = self.store.get_artist(id)?;
        let shows = self.store.list_show_rows()?;
        Ok(ArtistDetailView::build(
            artist,
            &shows,
            self.clock.now(),
            self.config.display_style,
        ))
    }

    pub fn artist_form(&self, id: i64) -> Result<ArtistForm> {
        Ok(ArtistForm::from(&self.store.get_artist(id)?))
    }

    pub fn create_artist(&self, form: &ArtistForm) -> Result<i64> {
        match self.store.insert_artist(form) {
            Ok(id) => {
                info!("Artist {} was successfully listed!", form.name);
                Ok(id)
            }
            Err(err) => {
                warn!("An error occurred. Artist {} could not be listed: {err}", form.name);
                Err(err)
            }
        }
    }

    pub fn edit_artist(&mut self, id: i64, form: &ArtistForm) -> Result<()> {
        match self.store.update_artist(id, form) {
            Ok(()) => {
                info!("Artist {} was successfully updated!", form.name);
                Ok(())
            }
            Err(err) => {
                warn!("An error occurred. Update Artist {} failed: {err}", form.name);
                Err(err)
            }
        }
    }

    // Shows

    pub fn shows(&self) -> Result<Vec<ShowListing>> {
        let rows = self.store.list_show_rows()?;
        Ok(recent_shows_with_style(
            &rows,
            self.config.recent_shows_limit,
            self.config.display_style,
        ))
    }

    pub fn create_show(&self, form: &ShowForm) -> Result<Show> {
        match self.store.insert_show(form) {
            Ok(show) => {
                info!("Show was successfully listed!");
                Ok(show)
            }
            Err(err) => {
                warn!("An error occurred. Show could not be listed: {err}");
                Err(err)
            }
        }
    }
}
