//! In-memory collection index with folder filtering and artist grouping.
//!
//! The store is immutable after load. Every derived view (filtered records,
//! artist groups, search matches) is recomputed from the stored rows on demand.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use log::{debug, info};

use super::csv_table::CsvTable;
use super::record::{Record, RecordId};

/// Folder selector value that passes every record.
pub const ALL_FOLDERS: &str = "all";

/// Records sharing one exact `Artist` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistGroup<'a> {
    pub artist: &'a str,
    /// Source order within the filtered view.
    pub albums: Vec<&'a Record>,
}

/// Owns every parsed record plus the distinct folder names.
#[derive(Debug, Clone, Default)]
pub struct CollectionStore {
    headers: Vec<String>,
    records: Vec<Record>,
    folders: BTreeSet<String>,
}

impl CollectionStore {
    /// Parses raw export text into a store.
    pub fn load(text: &str) -> Self {
        let table = CsvTable::parse(text);
        let records = (0..table.rows.len())
            .map(|index| Record::from_pairs(index, table.row_pairs(index)))
            .collect();
        let mut store = Self::from_records(records);
        store.headers = table.headers;
        store
    }

    /// Reads and parses the export file at `path`.
    pub fn load_file(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            format!("Failed to read collection file {}: {}", path.display(), err)
        })?;
        let store = Self::load(&text);
        info!(
            "Collection: loaded {} records in {} folders from {}",
            store.total_count(),
            store.folders.len(),
            path.display()
        );
        debug!("Collection: columns {:?}", store.headers());
        Ok(store)
    }

    /// Builds a store from typed records, keeping their order.
    pub fn from_records(records: Vec<Record>) -> Self {
        let folders = records
            .iter()
            .filter(|record| !record.collection_folder.is_empty())
            .map(|record| record.collection_folder.clone())
            .collect();
        Self {
            headers: Vec::new(),
            records,
            folders,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[cfg(test)]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    /// Distinct non-empty folder names in display order.
    pub fn folders(&self) -> impl Iterator<Item = &str> {
        self.folders.iter().map(String::as_str)
    }

    /// Records visible under `folder`, in source order.
    pub fn filtered(&self, folder: &str) -> Vec<&Record> {
        self.records
            .iter()
            .filter(|record| folder == ALL_FOLDERS || record.collection_folder == folder)
            .collect()
    }

    /// Groups the filtered view by exact artist string, sorted by artist name.
    pub fn artist_groups(&self, folder: &str) -> Vec<ArtistGroup<'_>> {
        let mut order: Vec<&str> = Vec::new();
        let mut albums_by_artist: HashMap<&str, Vec<&Record>> = HashMap::new();
        for record in self.filtered(folder) {
            let artist = record.artist.as_str();
            albums_by_artist
                .entry(artist)
                .or_insert_with(|| {
                    order.push(artist);
                    Vec::new()
                })
                .push(record);
        }

        let mut groups: Vec<ArtistGroup<'_>> = order
            .into_iter()
            .map(|artist| ArtistGroup {
                artist,
                albums: albums_by_artist.remove(artist).unwrap_or_default(),
            })
            .collect();
        groups.sort_by(|left, right| compare_artist_names(left.artist, right.artist));
        debug!(
            "Collection: folder '{}' grouped into {} artists",
            folder,
            groups.len()
        );
        groups
    }

    /// Albums for one artist inside the filtered view.
    pub fn albums_for_artist(&self, folder: &str, artist: &str) -> Vec<&Record> {
        self.filtered(folder)
            .into_iter()
            .filter(|record| record.artist == artist)
            .collect()
    }

    /// `N records` for the whole collection, `N of M records` for one folder.
    pub fn count_label(&self, folder: &str) -> String {
        let total = self.total_count();
        if folder == ALL_FOLDERS {
            format!("{total} records")
        } else {
            format!("{} of {} records", self.filtered(folder).len(), total)
        }
    }
}

/// Case-insensitive artist ordering; lowercase sorts first on a tie.
pub fn compare_artist_names(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| {
            let left_case = left.chars().map(char::is_uppercase);
            let right_case = right.chars().map(char::is_uppercase);
            left_case.cmp(right_case)
        })
        .then_with(|| left.cmp(right))
}

/// Presentation-layer artist search: case-insensitive substring on the name.
pub fn artist_matches_search(artist: &str, term: &str) -> bool {
    artist.to_lowercase().contains(&term.to_lowercase())
}
