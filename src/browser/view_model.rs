//! Render-ready projections of the browser state.
//!
//! Nothing here holds state of its own: every value is rebuilt from
//! `BrowserState` and the collection store on each projection.

use crate::collection::record::{ConditionCategory, RecordId};

pub const NO_ARTISTS_MESSAGE: &str = "No artists found";
pub const NO_ARTIST_SELECTED_MESSAGE: &str = "Select an artist to view their albums";
pub const NO_ALBUM_SELECTED_MESSAGE: &str = "Select an album to view details";
pub const LOADING_DETAILS_MESSAGE: &str = "Loading album details...";
pub const COVER_UNAVAILABLE_MESSAGE: &str = "Album cover not available";
pub const CONDITION_NOT_SPECIFIED: &str = "Not specified";

/// Which pane a narrow layout should bring forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Artists,
    Albums,
    Details,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderOption {
    pub name: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistRow {
    pub artist: String,
    pub album_count: usize,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumCard {
    pub record_id: RecordId,
    pub title: String,
    pub year: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionBadge {
    pub label: String,
    pub category: ConditionCategory,
}

/// Fully resolved album detail content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumDetail {
    pub record_id: RecordId,
    pub title: String,
    pub artist: String,
    pub label: String,
    pub released: String,
    pub format: String,
    pub catalog_number: String,
    pub folder: String,
    pub media_condition: ConditionBadge,
    pub sleeve_condition: ConditionBadge,
    pub date_added: String,
    pub notes: Option<String>,
    /// Export columns without a dedicated field, as `(header, value)`.
    pub additional_columns: Vec<(String, String)>,
    pub image_url: Option<String>,
    pub reference_page_url: Option<String>,
    pub catalog_page_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailPane {
    NoAlbumSelected,
    Loading { record_id: RecordId, title: String },
    Ready(Box<AlbumDetail>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumPane {
    NoArtistSelected,
    Albums(Vec<AlbumCard>),
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserViewModel {
    /// Active folder filter, `all` or a folder name (possibly unknown).
    pub folder: String,
    pub folders: Vec<FolderOption>,
    pub record_count: String,
    pub search_term: String,
    /// Artists passing the search filter; empty means the empty-state message.
    pub artists: Vec<ArtistRow>,
    pub albums: AlbumPane,
    pub detail: DetailPane,
    pub active_pane: ActivePane,
}
