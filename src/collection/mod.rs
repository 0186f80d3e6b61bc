pub mod csv_table;
pub mod collection_store;
pub mod record;
