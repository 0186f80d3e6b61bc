pub mod enrichment_manager;
pub mod enrichment_resolver;
