use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::aggregate::{search_by_name, SearchResults};
use crate::error::{Error, Result};
use crate::models::{Artist, ArtistForm, Show, ShowForm, ShowRow, Venue, VenueForm};

const VENUE_COLUMNS: &str = "id, name, city, state, address, phone, image_link, facebook_link,
     website_link, genres, seeking_talent, seeking_description";
const ARTIST_COLUMNS: &str = "id, name, city, state, phone, genres, image_link, facebook_link,
     website_link, seeking_venue, seeking_description";

pub struct Store {
    conn: Connection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Totals {
    pub venues: usize,
    pub artists: usize,
    pub shows: usize,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        debug!("opening database at {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS venues(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                address TEXT NOT NULL,
                phone TEXT,
                image_link TEXT,
                facebook_link TEXT,
                website_link TEXT,
                genres TEXT NOT NULL DEFAULT '[]',
                seeking_talent INTEGER NOT NULL DEFAULT 0,
                seeking_description TEXT
            );
            CREATE TABLE IF NOT EXISTS artists(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                city TEXT NOT NULL,
                state TEXT NOT NULL,
                phone TEXT,
                genres TEXT NOT NULL DEFAULT '[]',
                image_link TEXT,
                facebook_link TEXT,
                website_link TEXT,
                seeking_venue INTEGER NOT NULL DEFAULT 0,
                seeking_description TEXT
            );
            CREATE TABLE IF NOT EXISTS shows(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                artist_id INTEGER NOT NULL REFERENCES artists(id),
                venue_id INTEGER NOT NULL REFERENCES venues(id),
                start_time TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    pub fn totals(&self) -> Result<Totals> {
        let count = |table: &str| -> rusqlite::Result<usize> {
            let n: i64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            Ok(n as usize)
        };
        Ok(Totals {
            venues: count("venues")?,
            artists: count("artists")?,
            shows: count("shows")?,
        })
    }

    // Venues

    /// All venues ordered by city; rows in the same city keep id order.
    pub fn list_venues(&self) -> Result<Vec<Venue>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {VENUE_COLUMNS} FROM venues ORDER BY city, id"
        ))?;
        let rows = stmt.query_map([], venue_from_row)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        debug!(count = out.len(), "loaded venues");
        Ok(out)
    }

    pub fn get_venue(&self, id: i64) -> Result<Venue> {
        fetch_venue(&self.conn, id)
    }

    pub fn search_venues(&self, term: &str) -> Result<SearchResults<Venue>> {
        Ok(search_by_name(&self.list_venues()?, term))
    }

    pub fn insert_venue(&self, form: &VenueForm) -> Result<i64> {
        let genres = serde_json::to_string(&form.genres)?;
        self.conn.execute(
            "INSERT INTO venues (name, city, state, address, phone, image_link, facebook_link,
                                 website_link, genres, seeking_talent, seeking_description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                form.name,
                form.city,
                form.state,
                form.address,
                form.phone,
                form.image_link,
                form.facebook_link,
                form.website_link,
                genres,
                form.seeking_talent,
                form.seeking_description
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Overwrites every editable field of an existing venue.
    pub fn update_venue(&mut self, id: i64, form: &VenueForm) -> Result<()> {
        let genres = serde_json::to_string(&form.genres)?;
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE venues SET name = ?2, city = ?3, state = ?4, address = ?5, phone = ?6,
                    image_link = ?7, facebook_link = ?8, website_link = ?9, genres = ?10,
                    seeking_talent = ?11, seeking_description = ?12
             WHERE id = ?1",
            params![
                id,
                form.name,
                form.city,
                form.state,
                form.address,
                form.phone,
                form.image_link,
                form.facebook_link,
                form.website_link,
                genres,
                form.seeking_talent,
                form.seeking_description
            ],
        )?;
        if changed == 0 {
            return Err(Error::not_found("venue", id));
        }
        tx.commit()?;
        Ok(())
    }

    /// Removes a venue and its shows in one transaction and returns the removed row.
    pub fn delete_venue(&mut self, id: i64) -> Result<Venue> {
        let tx = self.conn.transaction()?;
        let venue = fetch_venue(&tx, id)?;
        let shows = tx.execute("DELETE FROM shows WHERE venue_id = ?1", params![id])?;
        tx.execute("DELETE FROM venues WHERE id = ?1", params![id])?;
        tx.commit()?;
        debug!(venue_id = id, shows, "deleted venue and its shows");
        Ok(venue)
    }

    // Artists

    pub fn list_artists(&self) -> Result<Vec<Artist>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {ARTIST_COLUMNS} FROM artists ORDER BY id"))?;
        let rows = stmt.query_map([], artist_from_row)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        debug!(count = out.len(), "loaded artists");
        Ok(out)
    }

    pub fn get_artist(&self, id: i64) -> Result<Artist> {
        self.conn
            .query_row(
                &format!("SELECT {ARTIST_COLUMNS} FROM artists WHERE id = ?1"),
                params![id],
                artist_from_row,
            )
            .optional()?
            .ok_or_else(|| Error::not_found("artist", id))
    }

    pub fn search_artists(&self, term: &str) -> Result<SearchResults<Artist>> {
        Ok(search_by_name(&self.list_artists()?, term))
    }

    pub fn insert_artist(&self, form: &ArtistForm) -> Result<i64> {
        let genres = serde_json::to_string(&form.genres)?;
        self.conn.execute(
            "INSERT INTO artists (name, city, state, phone, genres, image_link, facebook_link,
                                  website_link, seeking_venue, seeking_description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                form.name,
                form.city,
                form.state,
                form.phone,
                genres,
                form.image_link,
                form.facebook_link,
                form.website_link,
                form.seeking_venue,
                form.seeking_description
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn update_artist(&mut self, id: i64, form: &ArtistForm) -> Result<()> {
        let genres = serde_json::to_string(&form.genres)?;
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE artists SET name = ?2, city = ?3, state = ?4, phone = ?5, genres = ?6,
                    image_link = ?7, facebook_link = ?8, website_link = ?9,
                    seeking_venue = ?10, seeking_description = ?11
             WHERE id = ?1",
            params![
                id,
                form.name,
                form.city,
                form.state,
                form.phone,
                genres,
                form.image_link,
                form.facebook_link,
                form.website_link,
                form.seeking_venue,
                form.seeking_description
            ],
        )?;
        if changed == 0 {
            return Err(Error::not_found("artist", id));
        }
        tx.commit()?;
        Ok(())
    }

    // Shows

    pub fn insert_show(&self, form: &ShowForm) -> Result<Show> {
        self.conn.execute(
            "INSERT INTO shows (artist_id, venue_id, start_time) VALUES (?1, ?2, ?3)",
            params![form.artist_id, form.venue_id, form.start_time],
        )?;
        Ok(Show {
            id: self.conn.last_insert_rowid(),
            artist_id: form.artist_id,
            venue_id: form.venue_id,
            start_time: form.start_time,
        })
    }

    /// Every show with its artist and venue display fields, in id order.
    pub fn list_show_rows(&self) -> Result<Vec<ShowRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.artist_id, s.venue_id, s.start_time,
                    a.name, a.image_link, v.name, v.image_link
             FROM shows s
             JOIN artists a ON s.artist_id = a.id
             JOIN venues v ON s.venue_id = v.id
             ORDER BY s.id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ShowRow {
                id: row.get(0)?,
                artist_id: row.get(1)?,
                venue_id: row.get(2)?,
                start_time: row.get(3)?,
                artist_name: row.get(4)?,
                artist_image_link: row.get(5)?,
                venue_name: row.get(6)?,
                venue_image_link: row.get(7)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        debug!(count = out.len(), "loaded shows");
        Ok(out)
    }
}

fn fetch_venue(conn: &Connection, id: i64) -> Result<Venue> {
    conn.query_row(
        &format!("SELECT {VENUE_COLUMNS} FROM venues WHERE id = ?1"),
        params![id],
        venue_from_row,
    )
    .optional()?
    .ok_or_else(|| Error::not_found("venue", id))
}

fn genres_from_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let payload: String = row.get(idx)?;
    serde_json::from_str(&payload).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
    })
}

fn venue_from_row(row: &Row<'_>) -> rusqlite::Result<Venue> {
    Ok(Venue {
        id: row.get(0)?,
        name: row.get(1)?,
        city: row.get(2)?,
        state: row.get(3)?,
        address: row.get(4)?,
        phone: row.get(5)?,
        image_link: row.get(6)?,
        facebook_link: row.get(7)?,
        website_link: row.get(8)?,
        genres: genres_from_column(row, 9)?,
        seeking_talent: row.get(10)?,
        seeking_description: row.get(11)?,
    })
}

fn artist_from_row(row: &Row<'_>) -> rusqlite::Result<Artist> {
    Ok(Artist {
        id: row.get(0)?,
        name: row.get(1)?,
        city: row.get(2)?,
        state: row.get(3)?,
        phone: row.get(4)?,
        genres: genres_from_column(row, 5)?,
        image_link: row.get(6)?,
        facebook_link: row.get(7)?,
        website_link: row.get(8)?,
        seeking_venue: row.get(9)?,
        seeking_description: row.get(10)?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::aggregate::tests::at;

    pub(crate) fn venue_form(name: &str, city: &str, state: &str) -> VenueForm {
        VenueForm {
            name: name.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            address: "1015 Folsom Street".to_string(),
            phone: Some("123-123-1234".to_string()),
            genres: vec!["Jazz".to_string(), "Reggae".to_string()],
            seeking_talent: true,
            seeking_description: Some("We are on the lookout for a local artist".to_string()),
            ..VenueForm::default()
        }
    }

    pub(crate) fn artist_form(name: &str) -> ArtistForm {
        ArtistForm {
            name: name.to_string(),
            city: "San Francisco".to_string(),
            state: "CA".to_string(),
            genres: vec!["Rock n Roll".to_string()],
            image_link: Some("https://img.example.com/a.jpg".to_string()),
            ..ArtistForm::default()
        }
    }

    #[test]
    fn venues_round_trip_with_genres() {
        let store = Store::open_in_memory().expect("open store");
        let id = store
            .insert_venue(&venue_form("The Musical Hop", "San Francisco", "CA"))
            .expect("insert venue");
        let venue = store.get_venue(id).expect("get venue");
        assert_eq!(venue.name, "The Musical Hop");
        assert_eq!(venue.genres, vec!["Jazz".to_string(), "Reggae".to_string()]);
        assert!(venue.seeking_talent);
    }

    #[test]
    fn venues_are_listed_by_city() {
        let store = Store::open_in_memory().expect("open store");
        store.insert_venue(&venue_form("C", "San Francisco", "CA")).expect("insert");
        store.insert_venue(&venue_form("A", "New York", "NY")).expect("insert");
        store.insert_venue(&venue_form("B", "San Francisco", "CA")).expect("insert");
        let names: Vec<String> = store
            .list_venues()
            .expect("list")
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, vec!["A", "C", "B"]);
    }

    #[test]
    fn missing_rows_are_not_found() {
        let mut store = Store::open_in_memory().expect("open store");
        assert!(matches!(
            store.get_venue(42),
            Err(Error::NotFound { entity: "venue", id: 42 })
        ));
        assert!(matches!(
            store.get_artist(7),
            Err(Error::NotFound { entity: "artist", .. })
        ));
        assert!(matches!(
            store.update_artist(7, &artist_form("Nobody")),
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(store.delete_venue(3), Err(Error::NotFound { .. })));
    }

    #[test]
    fn update_overwrites_editable_fields() {
        let mut store = Store::open_in_memory().expect("open store");
        let id = store.insert_artist(&artist_form("Guns N Petals")).expect("insert");
        let mut form = artist_form("The Wild Sax Band");
        form.seeking_venue = true;
        form.genres = vec!["Jazz".to_string(), "Classical".to_string()];
        store.update_artist(id, &form).expect("update");

        let artist = store.get_artist(id).expect("get");
        assert_eq!(artist.id, id);
        assert_eq!(artist.name, "The Wild Sax Band");
        assert!(artist.seeking_venue);
        assert_eq!(artist.genres.len(), 2);
    }

    #[test]
    fn shows_join_artist_and_venue() {
        let store = Store::open_in_memory().expect("open store");
        let venue_id = store
            .insert_venue(&venue_form("The Musical Hop", "San Francisco", "CA"))
            .expect("venue");
        let artist_id = store.insert_artist(&artist_form("Guns N Petals")).expect("artist");
        let start = at(2019, 5, 21, 21, 30);
        let show = store
            .insert_show(&ShowForm { artist_id, venue_id, start_time: start })
            .expect("show");

        let rows = store.list_show_rows().expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, show.id);
        assert_eq!(rows[0].start_time, start);
        assert_eq!(rows[0].artist_name, "Guns N Petals");
        assert_eq!(rows[0].venue_name, "The Musical Hop");
    }

    #[test]
    fn show_with_unknown_artist_is_rejected() {
        let store = Store::open_in_memory().expect("open store");
        let venue_id = store
            .insert_venue(&venue_form("The Musical Hop", "San Francisco", "CA"))
            .expect("venue");
        let result = store.insert_show(&ShowForm {
            artist_id: 99,
            venue_id,
            start_time: at(2030, 1, 1, 20, 0),
        });
        assert!(matches!(result, Err(Error::Database(_))));
        assert_eq!(store.totals().expect("totals").shows, 0);
    }

    #[test]
    fn delete_venue_removes_its_shows() {
        let mut store = Store::open_in_memory().expect("open store");
        let keep = store.insert_venue(&venue_form("Keep", "Austin", "TX")).expect("venue");
        let doomed = store.insert_venue(&venue_form("Drop", "Austin", "TX")).expect("venue");
        let artist_id = store.insert_artist(&artist_form("Matt Quevedo")).expect("artist");
        for venue_id in [keep, doomed, doomed] {
            store
                .insert_show(&ShowForm { artist_id, venue_id, start_time: at(2030, 1, 1, 20, 0) })
                .expect("show");
        }

        let removed = store.delete_venue(doomed).expect("delete");
        assert_eq!(removed.name, "Drop");
        let totals = store.totals().expect("totals");
        assert_eq!(totals, Totals { venues: 1, artists: 1, shows: 1 });
        assert!(store.list_show_rows().expect("rows").iter().all(|s| s.venue_id == keep));
    }

    #[test]
    fn store_search_delegates_to_name_match() {
        let store = Store::open_in_memory().expect("open store");
        store.insert_artist(&artist_form("Guns N Petals")).expect("artist");
        store.insert_artist(&artist_form("The Wild Sax Band")).expect("artist");
        let results = store.search_artists("a").expect("search");
        assert_eq!(results.count(), 2);
        assert_eq!(store.search_artists("band").expect("search").count(), 1);
        assert_eq!(store.search_venues("").expect("search").count(), 0);
    }
}
