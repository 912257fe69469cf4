pub mod use_cases;

pub use use_cases::classifier::FeedbackClassifier;
pub use use_cases::column_detector::{ColumnDetector, ColumnRoles};
pub use use_cases::ingestion::{IngestionOutcome, IngestionPipeline};
pub use use_cases::name_suggester::CategoryNameSuggester;
pub use use_cases::user_type::UserTypeNormalizer;
