// ============================================================
// INGESTION PIPELINE
// ============================================================
// Turn a parsed CSV (header row + data rows) into normalized
// feedback records ready for storage.

use crate::application::use_cases::classifier::FeedbackClassifier;
use crate::application::use_cases::column_detector::{ColumnDetector, ColumnRoles};
use crate::application::use_cases::user_type::UserTypeNormalizer;
use crate::domain::feedback::NewFeedback;
use crate::domain::taxonomy::UNKNOWN_USER_TYPE;

/// What one ingestion run produced, plus the detection outcome for
/// debug reporting.
#[derive(Debug, Clone)]
pub struct IngestionOutcome {
    pub records: Vec<NewFeedback>,
    pub roles: ColumnRoles,
    /// The content index actually used: the detected one, or column 0
    /// when detection came up empty.
    pub content_column: usize,
}

/// Stateless orchestration of detector, normalizer and classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestionPipeline {
    detector: ColumnDetector,
    normalizer: UserTypeNormalizer,
    classifier: FeedbackClassifier,
}

impl IngestionPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classifier(&self) -> &FeedbackClassifier {
        &self.classifier
    }

    /// Detect columns once, then normalize and classify row by row.
    /// Rows too short to reach the content column, and rows whose trimmed
    /// content is empty, are skipped rather than rejected.
    pub fn ingest(&self, headers: &[String], rows: &[Vec<String>]) -> IngestionOutcome {
        let roles = self.detector.detect(headers);
        let content_column = roles.content.unwrap_or(0);

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            if row.len() <= content_column {
                continue;
            }
            let content = row[content_column].trim();
            if content.is_empty() {
                continue;
            }

            let user_type = match roles.user_type {
                Some(i) if row.len() > i => self.normalizer.normalize(&row[i]),
                _ => UNKNOWN_USER_TYPE.to_string(),
            };

            let attachment = match roles.attachment {
                Some(i) if row.len() > i => extract_attachment(&row[i]),
                _ => String::new(),
            };

            records.push(NewFeedback {
                user_type,
                category: self.classifier.classify(content),
                content: content.to_string(),
                attachment,
                original_row: serde_json::to_string(row).unwrap_or_default(),
            });
        }

        IngestionOutcome {
            records,
            roles,
            content_column,
        }
    }
}

/// Reduce a raw attachment cell to something displayable: keep URL lines
/// newline-joined; drop cells that are just an attachment count; keep any
/// other non-empty text verbatim.
fn extract_attachment(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }

    let urls: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("http://") || line.starts_with("https://"))
        .collect();
    if !urls.is_empty() {
        return urls.join("\n");
    }

    if raw.chars().all(|c| c.is_ascii_digit()) {
        return String::new();
    }

    raw.to_string()
}
