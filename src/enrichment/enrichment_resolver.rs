//! Cover art and reference link resolution for one album.
//!
//! Two independent sources are consulted. The release-metadata service is
//! asked first (only when the record carries a release id) and supplies the
//! cover image. The encyclopedia text search always runs: its top hit gives
//! the reference page, and that page's thumbnail is used as the cover only
//! when the release lookup found none. Every lookup failure degrades to an
//! absent field.

use std::sync::Arc;

use log::{debug, warn};
use serde_json::Value;

use crate::backends::LookupTransport;
use crate::collection::record::Record;
use crate::config::EnrichmentConfig;
use crate::protocol::EnrichmentResult;

/// Resolves `EnrichmentResult`s through a lookup transport.
pub struct EnrichmentResolver {
    transport: Arc<dyn LookupTransport>,
    discogs_api_base: String,
    wikipedia_api_base: String,
    wikipedia_page_base: String,
    thumbnail_size: u32,
}

impl EnrichmentResolver {
    pub fn new(transport: Arc<dyn LookupTransport>, config: &EnrichmentConfig) -> Self {
        Self {
            transport,
            discogs_api_base: config.discogs_api_base.clone(),
            wikipedia_api_base: config.wikipedia_api_base.clone(),
            wikipedia_page_base: config.wikipedia_page_base.clone(),
            thumbnail_size: config.thumbnail_size,
        }
    }

    fn album_label(record: &Record) -> String {
        format!("{} / {}", record.artist, record.title)
    }

    /// Free-text query for the encyclopedia search.
    pub fn search_query(record: &Record) -> String {
        format!("{} {} album", record.artist, record.title)
    }

    /// Page URL for an encyclopedia title: spaces become underscores, then the
    /// whole title is percent-encoded.
    pub fn reference_page_url(page_base: &str, title: &str) -> String {
        format!(
            "{}/{}",
            page_base,
            urlencoding::encode(&title.replace(' ', "_"))
        )
    }

    /// Primary image if one is tagged, otherwise the first image.
    fn primary_image_uri(release: &Value) -> Option<String> {
        let images = release["images"].as_array()?;
        images
            .iter()
            .find(|image| image["type"].as_str() == Some("primary"))
            .or_else(|| images.first())
            .and_then(|image| image["uri"].as_str())
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .map(str::to_string)
    }

    fn top_search_title(response: &Value) -> Result<Option<String>, String> {
        let results = response["query"]["search"]
            .as_array()
            .ok_or_else(|| "Search response missing query.search".to_string())?;
        Ok(results
            .first()
            .and_then(|item| item["title"].as_str())
            .map(str::to_string))
    }

    fn page_thumbnail(response: &Value) -> Result<Option<String>, String> {
        let pages = response["query"]["pages"]
            .as_object()
            .ok_or_else(|| "Page image response missing query.pages".to_string())?;
        Ok(pages
            .values()
            .next()
            .and_then(|page| page["thumbnail"]["source"].as_str())
            .map(str::to_string))
    }

    fn fetch_release_image(&self, release_id: &str) -> Result<Option<String>, String> {
        let url = format!(
            "{}/releases/{}",
            self.discogs_api_base,
            urlencoding::encode(release_id)
        );
        let release = self.transport.get_json(&url)?;
        Ok(Self::primary_image_uri(&release))
    }

    fn search_page_title(&self, query: &str) -> Result<Option<String>, String> {
        let url = format!(
            "{}?action=query&list=search&srsearch={}&format=json&origin=*",
            self.wikipedia_api_base,
            urlencoding::encode(query)
        );
        let response = self.transport.get_json(&url)?;
        Self::top_search_title(&response)
    }

    fn fetch_page_image(&self, title: &str) -> Result<Option<String>, String> {
        let url = format!(
            "{}?action=query&titles={}&prop=pageimages&pithumbsize={}&format=json&origin=*",
            self.wikipedia_api_base,
            urlencoding::encode(title),
            self.thumbnail_size
        );
        let response = self.transport.get_json(&url)?;
        Self::page_thumbnail(&response)
    }

    /// Runs the full lookup sequence. Never fails; missing data stays `None`.
    pub fn resolve(&self, record: &Record) -> EnrichmentResult {
        let label = Self::album_label(record);
        let mut result = EnrichmentResult::default();

        if let Some(release_id) = record.release_id.as_deref() {
            match self.fetch_release_image(release_id) {
                Ok(image_url) => result.image_url = image_url,
                Err(err) => warn!("Enrichment[{}]: release lookup failed: {}", label, err),
            }
        }

        match self.search_page_title(&Self::search_query(record)) {
            Ok(Some(title)) => {
                result.reference_page_url =
                    Some(Self::reference_page_url(&self.wikipedia_page_base, &title));
                if result.image_url.is_none() {
                    match self.fetch_page_image(&title) {
                        Ok(image_url) => result.image_url = image_url,
                        Err(err) => {
                            warn!("Enrichment[{}]: page image lookup failed: {}", label, err)
                        }
                    }
                }
            }
            Ok(None) => debug!("Enrichment[{}]: text search returned no results", label),
            Err(err) => warn!("Enrichment[{}]: text search failed: {}", label, err),
        }

        debug!(
            "Enrichment[{}]: image={} page={}",
            label,
            result.image_url.is_some(),
            result.reference_page_url.is_some()
        );
        result
    }
}
