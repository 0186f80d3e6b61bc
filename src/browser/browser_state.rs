//! Folder → artist → album selection state machine.
//!
//! `BrowserState` is the only mutable browser state. Commands arrive through
//! the `on_*` dispatch methods; renderers call [`BrowserState::view_model`],
//! which is a pure projection of this state plus the collection store.

use log::debug;

use super::view_model::{
    ActivePane, AlbumCard, AlbumDetail, AlbumPane, ArtistRow, BrowserViewModel, ConditionBadge,
    DetailPane, FolderOption, CONDITION_NOT_SPECIFIED,
};
use crate::collection::collection_store::{artist_matches_search, CollectionStore, ALL_FOLDERS};
use crate::collection::record::{classify_condition, Record, RecordId};
use crate::protocol::{EnrichmentResult, EnrichmentTicket};

/// Coarse position in the folder → artist → album narrowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    NoSelection,
    FolderOnly,
    ArtistSelected,
    AlbumSelected,
}

#[derive(Debug, Clone)]
pub struct BrowserState {
    folder: String,
    folder_chosen: bool,
    search_term: String,
    artist: Option<String>,
    album: Option<RecordId>,
    /// Request id whose result may still update the detail pane.
    pending_request_id: Option<u64>,
    enrichment: Option<EnrichmentResult>,
    next_request_id: u64,
}

impl Default for BrowserState {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserState {
    pub fn new() -> Self {
        Self {
            folder: ALL_FOLDERS.to_string(),
            folder_chosen: false,
            search_term: String::new(),
            artist: None,
            album: None,
            pending_request_id: None,
            enrichment: None,
            next_request_id: 1,
        }
    }

    pub fn phase(&self) -> SelectionPhase {
        match (&self.artist, self.album) {
            (_, Some(_)) => SelectionPhase::AlbumSelected,
            (Some(_), None) => SelectionPhase::ArtistSelected,
            (None, None) if self.folder_chosen => SelectionPhase::FolderOnly,
            (None, None) => SelectionPhase::NoSelection,
        }
    }

    #[cfg(test)]
    pub fn folder(&self) -> &str {
        &self.folder
    }

    #[cfg(test)]
    pub fn selected_artist(&self) -> Option<&str> {
        self.artist.as_deref()
    }

    #[cfg(test)]
    pub fn selected_album(&self) -> Option<RecordId> {
        self.album
    }

    pub fn pending_request_id(&self) -> Option<u64> {
        self.pending_request_id
    }

    fn clear_album(&mut self) {
        self.album = None;
        self.pending_request_id = None;
        self.enrichment = None;
    }

    /// Switches the folder filter. Always drops artist and album selection.
    pub fn on_folder_change(&mut self, folder: &str) {
        debug!("Browser: folder changed to '{}'", folder);
        self.folder = folder.to_string();
        self.folder_chosen = true;
        self.artist = None;
        self.clear_album();
    }

    /// Updates the artist-name search. Only the displayed artist list changes.
    pub fn on_search_change(&mut self, term: &str) {
        self.search_term = term.to_string();
    }

    /// Selects an artist from the current grouping; ignored when the artist is
    /// not present under the active folder.
    pub fn on_artist_select(&mut self, store: &CollectionStore, artist: &str) -> bool {
        let known = store
            .artist_groups(&self.folder)
            .iter()
            .any(|group| group.artist == artist);
        if !known {
            debug!(
                "Browser: ignoring artist '{}' not present in folder '{}'",
                artist, self.folder
            );
            return false;
        }
        self.folder_chosen = true;
        self.artist = Some(artist.to_string());
        self.clear_album();
        true
    }

    /// Selects one of the current artist's albums and returns the ticket the
    /// host must hand to the enrichment service. Each call supersedes any
    /// earlier pending request.
    pub fn on_album_select(
        &mut self,
        store: &CollectionStore,
        record_id: RecordId,
    ) -> Option<EnrichmentTicket> {
        let Some(artist) = self.artist.as_deref() else {
            debug!("Browser: ignoring album {} with no artist selected", record_id);
            return None;
        };
        let record = store
            .albums_for_artist(&self.folder, artist)
            .into_iter()
            .find(|record| record.id == record_id)
            .cloned();
        let Some(record) = record else {
            debug!(
                "Browser: ignoring album {} not owned by artist '{}'",
                record_id, artist
            );
            return None;
        };

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.album = Some(record_id);
        self.pending_request_id = Some(request_id);
        self.enrichment = None;
        Some(EnrichmentTicket { request_id, record })
    }

    /// Applies an enrichment result if it still belongs to the current album
    /// selection. Late results for superseded selections are dropped.
    pub fn on_enrichment_result(
        &mut self,
        request_id: u64,
        record_id: RecordId,
        result: EnrichmentResult,
    ) -> bool {
        if self.pending_request_id != Some(request_id) || self.album != Some(record_id) {
            debug!(
                "Browser: dropping stale enrichment result request_id={} record={}",
                request_id, record_id
            );
            return false;
        }
        self.pending_request_id = None;
        self.enrichment = Some(result);
        true
    }

    /// Projects the current state into render-ready data.
    pub fn view_model(&self, store: &CollectionStore) -> BrowserViewModel {
        let folders = store
            .folders()
            .map(|name| FolderOption {
                name: name.to_string(),
                selected: name == self.folder,
            })
            .collect();

        let artists = store
            .artist_groups(&self.folder)
            .into_iter()
            .filter(|group| artist_matches_search(group.artist, &self.search_term))
            .map(|group| ArtistRow {
                selected: self.artist.as_deref() == Some(group.artist),
                artist: group.artist.to_string(),
                album_count: group.albums.len(),
            })
            .collect();

        let albums = match self.artist.as_deref() {
            None => AlbumPane::NoArtistSelected,
            Some(artist) => AlbumPane::Albums(
                store
                    .albums_for_artist(&self.folder, artist)
                    .into_iter()
                    .map(|record| AlbumCard {
                        record_id: record.id,
                        title: record.title.clone(),
                        year: record.display_released().to_string(),
                        label: record.label.clone(),
                        selected: self.album == Some(record.id),
                    })
                    .collect(),
            ),
        };

        let detail = match self.album.and_then(|id| store.record(id)) {
            None => DetailPane::NoAlbumSelected,
            Some(record) => match &self.enrichment {
                None => DetailPane::Loading {
                    record_id: record.id,
                    title: record.title.clone(),
                },
                Some(result) => DetailPane::Ready(Box::new(album_detail(record, result))),
            },
        };

        let active_pane = match self.phase() {
            SelectionPhase::AlbumSelected => ActivePane::Details,
            SelectionPhase::ArtistSelected => ActivePane::Albums,
            _ => ActivePane::Artists,
        };

        BrowserViewModel {
            folder: self.folder.clone(),
            folders,
            record_count: store.count_label(&self.folder),
            search_term: self.search_term.clone(),
            artists,
            albums,
            detail,
            active_pane,
        }
    }
}

fn condition_badge(label: &str) -> ConditionBadge {
    ConditionBadge {
        label: if label.is_empty() {
            CONDITION_NOT_SPECIFIED.to_string()
        } else {
            label.to_string()
        },
        category: classify_condition(label),
    }
}

fn album_detail(record: &Record, result: &EnrichmentResult) -> AlbumDetail {
    AlbumDetail {
        record_id: record.id,
        title: record.title.clone(),
        artist: record.artist.clone(),
        label: record.label.clone(),
        released: record.display_released().to_string(),
        format: record.format.clone(),
        catalog_number: record.catalog_number.clone(),
        folder: record.collection_folder.clone(),
        media_condition: condition_badge(&record.media_condition),
        sleeve_condition: condition_badge(&record.sleeve_condition),
        date_added: record.display_date_added(),
        notes: Some(record.notes.clone()).filter(|notes| !notes.is_empty()),
        additional_columns: record
            .additional_columns()
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect(),
        image_url: result.image_url.clone(),
        reference_page_url: result.reference_page_url.clone(),
        catalog_page_url: record.catalog_page_url(),
    }
}

#[cfg(test)]
mod tests {
    use super::{BrowserState, SelectionPhase};
    use crate::browser::view_model::{ActivePane, AlbumPane, DetailPane};
    use crate::collection::collection_store::{CollectionStore, ALL_FOLDERS};
    use crate::collection::record::ConditionCategory;
    use crate::protocol::EnrichmentResult;

    const SAMPLE: &str = "\
Artist,Title,Label,Released,release_id,CollectionFolder,Collection Media Condition,Collection Notes
Can,Tago Mago,United Artists,1971,11,Shelf A,Very Good Plus (VG+),
Can,Ege Bamyasi,United Artists,,12,Shelf B,,Signed
Neu!,Neu! 75,Brain,1975,,Shelf A,Near Mint (NM or M-),
Faust,Faust IV,Virgin,1973,14,Shelf B,,
";

    fn store() -> CollectionStore {
        CollectionStore::load(SAMPLE)
    }

    fn result(image: &str) -> EnrichmentResult {
        EnrichmentResult {
            image_url: Some(image.to_string()),
            reference_page_url: Some(format!("{image}/page")),
        }
    }

    #[test]
    fn test_initial_state_shows_everything_with_placeholders() {
        let store = store();
        let state = BrowserState::new();
        assert_eq!(state.phase(), SelectionPhase::NoSelection);
        let view = state.view_model(&store);
        assert_eq!(view.record_count, "4 records");
        assert_eq!(view.artists.len(), 3);
        assert_eq!(view.albums, AlbumPane::NoArtistSelected);
        assert_eq!(view.detail, DetailPane::NoAlbumSelected);
        assert_eq!(view.active_pane, ActivePane::Artists);
    }

    #[test]
    fn test_folder_change_collapses_album_selection() {
        let store = store();
        let mut state = BrowserState::new();
        assert!(state.on_artist_select(&store, "Can"));
        assert!(state.on_album_select(&store, 0).is_some());
        assert_eq!(state.phase(), SelectionPhase::AlbumSelected);

        state.on_folder_change("Shelf A");
        assert_eq!(state.phase(), SelectionPhase::FolderOnly);
        assert_eq!(state.selected_artist(), None);
        assert_eq!(state.selected_album(), None);
        assert_eq!(state.pending_request_id(), None);
        let view = state.view_model(&store);
        assert_eq!(view.record_count, "2 of 4 records");
        assert!(view.folders.iter().any(|f| f.name == "Shelf A" && f.selected));
    }

    #[test]
    fn test_folder_round_trip_restores_filtered_view() {
        let store = store();
        let mut state = BrowserState::new();
        state.on_folder_change(ALL_FOLDERS);
        let before = state.view_model(&store);
        state.on_folder_change("Shelf B");
        state.on_folder_change(ALL_FOLDERS);
        assert_eq!(state.view_model(&store), before);
    }

    #[test]
    fn test_artist_select_requires_membership_in_current_folder() {
        let store = store();
        let mut state = BrowserState::new();
        state.on_folder_change("Shelf A");
        assert!(!state.on_artist_select(&store, "Faust"));
        assert!(!state.on_artist_select(&store, "can"));
        assert_eq!(state.phase(), SelectionPhase::FolderOnly);
        assert!(state.on_artist_select(&store, "Neu!"));
        assert_eq!(state.phase(), SelectionPhase::ArtistSelected);
    }

    #[test]
    fn test_switching_artist_clears_album_detail() {
        let store = store();
        let mut state = BrowserState::new();
        state.on_artist_select(&store, "Can");
        let ticket = state.on_album_select(&store, 1).unwrap();
        state.on_enrichment_result(ticket.request_id, 1, result("https://img/p"));

        assert!(state.on_artist_select(&store, "Faust"));
        let view = state.view_model(&store);
        assert_eq!(view.detail, DetailPane::NoAlbumSelected);
        assert_eq!(view.active_pane, ActivePane::Albums);
        match view.albums {
            AlbumPane::Albums(cards) => {
                assert_eq!(cards.len(), 1);
                assert!(!cards[0].selected);
            }
            AlbumPane::NoArtistSelected => panic!("expected album list"),
        }
    }

    #[test]
    fn test_album_select_requires_album_of_selected_artist() {
        let store = store();
        let mut state = BrowserState::new();
        assert!(state.on_album_select(&store, 0).is_none());
        state.on_artist_select(&store, "Can");
        assert!(state.on_album_select(&store, 2).is_none());
        state.on_folder_change("Shelf A");
        state.on_artist_select(&store, "Can");
        assert!(state.on_album_select(&store, 1).is_none());
        assert!(state.on_album_select(&store, 0).is_some());
    }

    #[test]
    fn test_album_select_shows_loading_then_detail() {
        let store = store();
        let mut state = BrowserState::new();
        state.on_artist_select(&store, "Can");
        let ticket = state.on_album_select(&store, 1).unwrap();
        assert_eq!(ticket.record.title, "Ege Bamyasi");
        assert!(matches!(
            state.view_model(&store).detail,
            DetailPane::Loading { record_id: 1, .. }
        ));

        assert!(state.on_enrichment_result(ticket.request_id, 1, result("https://img/q")));
        let DetailPane::Ready(detail) = state.view_model(&store).detail else {
            panic!("expected ready detail");
        };
        assert_eq!(detail.released, "Unknown");
        assert_eq!(detail.notes.as_deref(), Some("Signed"));
        assert_eq!(detail.media_condition.label, "Not specified");
        assert_eq!(detail.media_condition.category, ConditionCategory::Unclassified);
        assert_eq!(detail.image_url.as_deref(), Some("https://img/q"));
        assert_eq!(
            detail.catalog_page_url.as_deref(),
            Some("https://www.discogs.com/release/12")
        );
    }

    #[test]
    fn test_late_result_for_superseded_album_is_ignored() {
        let store = store();
        let mut state = BrowserState::new();
        state.on_artist_select(&store, "Can");
        let ticket_p = state.on_album_select(&store, 0).unwrap();
        let ticket_q = state.on_album_select(&store, 1).unwrap();
        assert!(ticket_q.request_id > ticket_p.request_id);

        assert!(state.on_enrichment_result(ticket_q.request_id, 1, result("https://img/q")));
        assert!(!state.on_enrichment_result(ticket_p.request_id, 0, result("https://img/p")));

        let DetailPane::Ready(detail) = state.view_model(&store).detail else {
            panic!("expected ready detail");
        };
        assert_eq!(detail.record_id, 1);
        assert_eq!(detail.image_url.as_deref(), Some("https://img/q"));
    }

    #[test]
    fn test_result_delivered_after_folder_change_is_dropped() {
        let store = store();
        let mut state = BrowserState::new();
        state.on_artist_select(&store, "Can");
        let first = state.on_album_select(&store, 0).unwrap();

        state.on_folder_change("Shelf A");
        state.on_artist_select(&store, "Can");
        let second = state.on_album_select(&store, 0).unwrap();

        assert!(!state.on_enrichment_result(first.request_id, 0, result("https://img/old")));
        assert!(matches!(
            state.view_model(&store).detail,
            DetailPane::Loading { record_id: 0, .. }
        ));
        assert!(state.on_enrichment_result(second.request_id, 0, result("https://img/new")));
    }

    #[test]
    fn test_result_delivered_after_artist_change_is_dropped() {
        let store = store();
        let mut state = BrowserState::new();
        state.on_artist_select(&store, "Can");
        let first = state.on_album_select(&store, 0).unwrap();

        state.on_artist_select(&store, "Neu!");
        assert!(!state.on_enrichment_result(first.request_id, 0, result("https://img/old")));
        assert_eq!(state.view_model(&store).detail, DetailPane::NoAlbumSelected);

        state.on_artist_select(&store, "Can");
        state.on_album_select(&store, 0).unwrap();
        assert!(!state.on_enrichment_result(first.request_id, 0, result("https://img/old")));
        assert!(matches!(
            state.view_model(&store).detail,
            DetailPane::Loading { record_id: 0, .. }
        ));
    }

    #[test]
    fn test_reselecting_same_album_ignores_previous_request() {
        let store = store();
        let mut state = BrowserState::new();
        state.on_artist_select(&store, "Can");
        let first = state.on_album_select(&store, 0).unwrap();
        let second = state.on_album_select(&store, 0).unwrap();
        assert!(!state.on_enrichment_result(first.request_id, 0, result("https://img/old")));
        assert!(state.on_enrichment_result(second.request_id, 0, result("https://img/new")));
    }

    #[test]
    fn test_search_filters_artists_only() {
        let store = store();
        let mut state = BrowserState::new();
        state.on_artist_select(&store, "Can");
        state.on_album_select(&store, 0);
        state.on_search_change("NEU");

        let view = state.view_model(&store);
        let names: Vec<&str> = view.artists.iter().map(|row| row.artist.as_str()).collect();
        assert_eq!(names, vec!["Neu!"]);
        assert_eq!(view.record_count, "4 records");
        assert!(matches!(view.albums, AlbumPane::Albums(ref cards) if cards.len() == 2));
        assert!(matches!(view.detail, DetailPane::Loading { record_id: 0, .. }));
        assert_eq!(state.phase(), SelectionPhase::AlbumSelected);
    }

    #[test]
    fn test_artist_rows_carry_counts_and_selection() {
        let store = store();
        let mut state = BrowserState::new();
        state.on_artist_select(&store, "Can");
        let view = state.view_model(&store);
        let can = view.artists.iter().find(|row| row.artist == "Can").unwrap();
        assert_eq!(can.album_count, 2);
        assert!(can.selected);
    }

    #[test]
    fn test_unknown_folder_yields_empty_view() {
        let store = store();
        let mut state = BrowserState::new();
        state.on_folder_change("Crate Z");

        let view = state.view_model(&store);
        assert_eq!(view.record_count, "0 of 4 records");
        assert!(view.artists.is_empty());
        assert!(view.folders.iter().all(|folder| !folder.selected));
        assert!(!state.on_artist_select(&store, "Can"));
    }
}
