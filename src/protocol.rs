//! Event-bus protocol shared by the browser host and background services.

use crate::collection::record::{Record, RecordId};

/// Top-level envelope for all bus traffic.
#[derive(Debug, Clone)]
pub enum Message {
    Enrichment(EnrichmentMessage),
    /// Asks every service loop to exit.
    Shutdown,
}

/// Enrichment-domain commands and notifications.
#[derive(Debug, Clone)]
pub enum EnrichmentMessage {
    /// Resolve cover art and links for the album in the ticket.
    Resolve(EnrichmentTicket),
    /// Result for an earlier `Resolve`, tagged with its request id.
    Resolved {
        request_id: u64,
        record_id: RecordId,
        result: EnrichmentResult,
    },
}

/// One album selection handed to the enrichment service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentTicket {
    /// Monotonic per selection; only the newest id may update the detail pane.
    pub request_id: u64,
    pub record: Record,
}

/// Best-effort external metadata for one album. Absent fields mean the lookup
/// failed or found nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentResult {
    pub image_url: Option<String>,
    pub reference_page_url: Option<String>,
}
