//! Past/upcoming partitions, location groups, search results and recent-show listings,
//! computed from records the store has already loaded. Nothing here performs I/O or
//! reads the clock; the reference time is always a parameter.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::display::{format_naive, DisplayStyle};
use crate::models::{Artist, ShowRow, Venue};

pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Which foreign key of a show identifies the entity being viewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Venue,
    Artist,
}

impl Role {
    fn matches(self, show: &ShowRow, entity_id: i64) -> bool {
        match self {
            Role::Venue => show.venue_id == entity_id,
            Role::Artist => show.artist_id == entity_id,
        }
    }
}

/// A show seen from one side: it names the other side of the booking.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum ShowSummary {
    /// Listed on a venue page.
    Artist {
        artist_id: i64,
        artist_name: String,
        artist_image_link: Option<String>,
        start_time: String,
    },
    /// Listed on an artist page.
    Venue {
        venue_id: i64,
        venue_name: String,
        venue_image_link: Option<String>,
        start_time: String,
    },
}

impl ShowSummary {
    fn from_row(row: &ShowRow, role: Role, style: DisplayStyle) -> Self {
        let start_time = format_naive(&row.start_time, style);
        match role {
            Role::Venue => ShowSummary::Artist {
                artist_id: row.artist_id,
                artist_name: row.artist_name.clone(),
                artist_image_link: row.artist_image_link.clone(),
                start_time,
            },
            Role::Artist => ShowSummary::Venue {
                venue_id: row.venue_id,
                venue_name: row.venue_name.clone(),
                venue_image_link: row.venue_image_link.clone(),
                start_time,
            },
        }
    }

    pub fn counterpart_id(&self) -> i64 {
        match self {
            ShowSummary::Artist { artist_id, .. } => *artist_id,
            ShowSummary::Venue { venue_id, .. } => *venue_id,
        }
    }

    pub fn counterpart_name(&self) -> &str {
        match self {
            ShowSummary::Artist { artist_name, .. } => artist_name,
            ShowSummary::Venue { venue_name, .. } => venue_name,
        }
    }

    pub fn start_time(&self) -> &str {
        match self {
            ShowSummary::Artist { start_time, .. } | ShowSummary::Venue { start_time, .. } => {
                start_time
            }
        }
    }
}

/// Past and upcoming shows for one entity. Counts are always the lengths of the lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShowPartition {
    past: Vec<ShowSummary>,
    upcoming: Vec<ShowSummary>,
}

impl ShowPartition {
    pub fn past_shows(&self) -> &[ShowSummary] {
        &self.past
    }

    pub fn upcoming_shows(&self) -> &[ShowSummary] {
        &self.upcoming
    }

    pub fn past_shows_count(&self) -> usize {
        self.past.len()
    }

    pub fn upcoming_shows_count(&self) -> usize {
        self.upcoming.len()
    }
}

impl Serialize for ShowPartition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ShowPartition", 4)?;
        state.serialize_field("past_shows", &self.past)?;
        state.serialize_field("upcoming_shows", &self.upcoming)?;
        state.serialize_field("past_shows_count", &self.past.len())?;
        state.serialize_field("upcoming_shows_count", &self.upcoming.len())?;
        state.end()
    }
}

/// A show starting exactly at the reference time has already started.
pub fn is_upcoming(start_time: &NaiveDateTime, reference_time: &NaiveDateTime) -> bool {
    start_time > reference_time
}

pub fn partition_shows_for_entity(
    entity_id: i64,
    role: Role,
    all_shows: &[ShowRow],
    reference_time: NaiveDateTime,
) -> ShowPartition {
    partition_shows_with_style(entity_id, role, all_shows, reference_time, DisplayStyle::Medium)
}

pub fn partition_shows_with_style(
    entity_id: i64,
    role: Role,
    all_shows: &[ShowRow],
    reference_time: NaiveDateTime,
    style: DisplayStyle,
) -> ShowPartition {
    let mut partition = ShowPartition::default();
    for show in all_shows.iter().filter(|show| role.matches(show, entity_id)) {
        let summary = ShowSummary::from_row(show, role, style);
        if is_upcoming(&show.start_time, &reference_time) {
            partition.upcoming.push(summary);
        } else {
            partition.past.push(summary);
        }
    }
    partition
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct VenueListing {
    pub id: i64,
    pub name: String,
    pub num_upcoming_shows: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LocationGroup {
    pub city: String,
    pub state: String,
    pub venues: Vec<VenueListing>,
}

/// Groups venues by their exact (city, state) pair. Groups come out ordered by city;
/// equal cities keep the order their first venue had in the input.
pub fn group_venues_by_location(
    all_venues: &[Venue],
    all_shows: &[ShowRow],
    reference_time: NaiveDateTime,
) -> Vec<LocationGroup> {
    let mut upcoming_by_venue: HashMap<i64, usize> = HashMap::new();
    for show in all_shows {
        if is_upcoming(&show.start_time, &reference_time) {
            *upcoming_by_venue.entry(show.venue_id).or_default() += 1;
        }
    }

    let mut ordered: Vec<&Venue> = all_venues.iter().collect();
    ordered.sort_by(|a, b| a.city.cmp(&b.city));

    let mut groups: IndexMap<(&str, &str), LocationGroup> = IndexMap::new();
    for venue in ordered {
        let group = groups
            .entry((venue.city.as_str(), venue.state.as_str()))
            .or_insert_with(|| LocationGroup {
                city: venue.city.clone(),
                state: venue.state.clone(),
                venues: Vec::new(),
            });
        group.venues.push(VenueListing {
            id: venue.id,
            name: venue.name.clone(),
            num_upcoming_shows: upcoming_by_venue.get(&venue.id).copied().unwrap_or(0),
        });
    }

    groups.into_values().collect()
}

/// Anything searchable by name.
pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Venue {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Artist {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults<T> {
    matches: Vec<T>,
}

impl<T> SearchResults<T> {
    pub fn count(&self) -> usize {
        self.matches.len()
    }

    pub fn matches(&self) -> &[T] {
        &self.matches
    }

    pub fn into_matches(self) -> Vec<T> {
        self.matches
    }
}

impl<T: Serialize> Serialize for SearchResults<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SearchResults", 2)?;
        state.serialize_field("count", &self.matches.len())?;
        state.serialize_field("data", &self.matches)?;
        state.end()
    }
}

/// Case-insensitive substring match on `name`. An empty term matches everything.
pub fn search_by_name<T: Named + Clone>(all_entities: &[T], search_term: &str) -> SearchResults<T> {
    let needle = search_term.to_lowercase();
    let matches = all_entities
        .iter()
        .filter(|entity| entity.name().to_lowercase().contains(&needle))
        .cloned()
        .collect();
    SearchResults { matches }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ShowListing {
    pub venue_id: i64,
    pub artist_id: i64,
    pub artist_name: String,
    pub artist_image_link: Option<String>,
    pub venue_name: String,
    pub start_time: String,
}

/// Most recent shows first. Shows with equal start times keep their input order.
pub fn recent_shows(all_shows: &[ShowRow], limit: usize) -> Vec<ShowListing> {
    recent_shows_with_style(all_shows, limit, DisplayStyle::Medium)
}

pub fn recent_shows_with_style(
    all_shows: &[ShowRow],
    limit: usize,
    style: DisplayStyle,
) -> Vec<ShowListing> {
    let mut ordered: Vec<&ShowRow> = all_shows.iter().collect();
    ordered.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    ordered
        .into_iter()
        .take(limit)
        .map(|show| ShowListing {
            venue_id: show.venue_id,
            artist_id: show.artist_id,
            artist_name: show.artist_name.clone(),
            artist_image_link: show.artist_image_link.clone(),
            venue_name: show.venue_name.clone(),
            start_time: format_naive(&show.start_time, style),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ArtistListing {
    pub id: i64,
    pub name: String,
}

pub fn artist_listings(all_artists: &[Artist]) -> Vec<ArtistListing> {
    all_artists
        .iter()
        .map(|artist| ArtistListing {
            id: artist.id,
            name: artist.name.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct VenueDetailView {
    #[serde(flatten)]
    pub venue: Venue,
    #[serde(flatten)]
    pub shows: ShowPartition,
}

impl VenueDetailView {
    pub fn build(
        venue: Venue,
        all_shows: &[ShowRow],
        reference_time: NaiveDateTime,
        style: DisplayStyle,
    ) -> Self {
        let shows =
            partition_shows_with_style(venue.id, Role::Venue, all_shows, reference_time, style);
        Self { venue, shows }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ArtistDetailView {
    #[serde(flatten)]
    pub artist: Artist,
    #[serde(flatten)]
    pub shows: ShowPartition,
}

impl ArtistDetailView {
    pub fn build(
        artist: Artist,
        all_shows: &[ShowRow],
        reference_time: NaiveDateTime,
        style: DisplayStyle,
    ) -> Self {
        let shows =
            partition_shows_with_style(artist.id, Role::Artist, all_shows, reference_time, style);
        Self { artist, shows }
    }
}
