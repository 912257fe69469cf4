pub mod classifier;
pub mod column_detector;
pub mod ingestion;
pub mod name_suggester;
pub mod user_type;
