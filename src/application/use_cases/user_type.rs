// ============================================================
// USER TYPE NORMALIZER
// ============================================================

use crate::domain::taxonomy::{
    MEMBER_KEYWORDS, MEMBER_USER_TYPE, NORMAL_USER_KEYWORDS, NORMAL_USER_TYPE, UNKNOWN_USER_TYPE,
};

/// Collapses free-text user-type cells into a closed set of labels.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserTypeNormalizer;

impl UserTypeNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Empty input maps to "Unknown"; member keywords win over normal-user
    /// keywords (a cell like "付费免费切换" is still a member); anything else,
    /// whitespace-only cells included, passes through verbatim as its own
    /// ad-hoc category.
    pub fn normalize(&self, raw: &str) -> String {
        if raw.is_empty() {
            return UNKNOWN_USER_TYPE.to_string();
        }

        let lowered = raw.to_lowercase();
        if MEMBER_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            return MEMBER_USER_TYPE.to_string();
        }
        if NORMAL_USER_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
            return NORMAL_USER_TYPE.to_string();
        }

        raw.to_string()
    }
}
