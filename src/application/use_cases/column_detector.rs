// ============================================================
// COLUMN DETECTOR
// ============================================================
// Map raw CSV header names to semantic column roles.

use crate::domain::taxonomy::{
    ATTACHMENT_EXCLUDE_KEYWORDS, ATTACHMENT_KEYWORDS, CONTENT_EXCLUDE_KEYWORDS, CONTENT_KEYWORDS,
    USER_TYPE_COLUMN_KEYWORDS,
};
use serde::Serialize;

/// Resolved header indices for the roles the pipeline cares about.
/// An unset index is a valid outcome, not an error; callers decide
/// how to fall back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ColumnRoles {
    pub content: Option<usize>,
    pub user_type: Option<usize>,
    pub attachment: Option<usize>,
}

/// Keyword-driven header scanner. Stateless; one shared instance serves
/// any number of concurrent requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnDetector;

impl ColumnDetector {
    pub fn new() -> Self {
        Self
    }

    /// Scan the header row left to right, resolving each role to the first
    /// matching index. Roles are resolved independently; a header may serve
    /// several roles at once.
    pub fn detect<S: AsRef<str>>(&self, headers: &[S]) -> ColumnRoles {
        let mut roles = ColumnRoles::default();

        for (i, header) in headers.iter().enumerate() {
            let lowered = header.as_ref().trim().to_lowercase();

            if roles.content.is_none()
                && !CONTENT_EXCLUDE_KEYWORDS.iter().any(|kw| lowered.contains(kw))
                && CONTENT_KEYWORDS.iter().any(|kw| lowered.contains(kw))
            {
                roles.content = Some(i);
            }

            if roles.user_type.is_none()
                && USER_TYPE_COLUMN_KEYWORDS.iter().any(|kw| lowered.contains(kw))
            {
                roles.user_type = Some(i);
            }

            if roles.attachment.is_none() {
                // Headers like "附 件 列 表" or "附件\t列表" still count, so the
                // keywords are tested against a whitespace-stripped copy as
                // well as the original.
                let cleaned: String = lowered.chars().filter(|c| !c.is_whitespace()).collect();
                let excluded = ATTACHMENT_EXCLUDE_KEYWORDS.iter().any(|kw| cleaned.contains(kw));
                if !excluded
                    && ATTACHMENT_KEYWORDS
                        .iter()
                        .any(|kw| cleaned.contains(kw) || lowered.contains(kw))
                {
                    roles.attachment = Some(i);
                }
            }
        }

        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(headers: &[&str]) -> ColumnRoles {
        ColumnDetector::new().detect(headers)
    }

    #[test]
    fn test_detects_all_three_roles() {
        let roles = detect(&["序号", "反馈内容", "用户类型", "附件列表"]);
        assert_eq!(roles.content, Some(1));
        assert_eq!(roles.user_type, Some(2));
        assert_eq!(roles.attachment, Some(3));
    }

    #[test]
    fn test_content_exclusion_beats_content_keyword() {
        // "内容编号" contains a content keyword but is excluded by "编号".
        let roles = detect(&["内容编号", "反馈内容"]);
        assert_eq!(roles.content, Some(1));
    }

    #[test]
    fn test_first_match_wins_per_role() {
        let roles = detect(&["意见", "评论", "用户类型", "会员等级"]);
        assert_eq!(roles.content, Some(0));
        assert_eq!(roles.user_type, Some(2));
    }

    #[test]
    fn test_english_headers() {
        let roles = detect(&["date", "user_type", "feedback", "attachment"]);
        assert_eq!(roles.content, Some(2));
        assert_eq!(roles.user_type, Some(1));
        assert_eq!(roles.attachment, Some(3));
    }

    #[test]
    fn test_attachment_count_column_is_not_an_attachment() {
        let roles = detect(&["反馈内容", "附件数量", "附件链接"]);
        assert_eq!(roles.attachment, Some(2));
    }

    #[test]
    fn test_attachment_matches_after_whitespace_stripping() {
        let roles = detect(&["反馈内容", "附件\u{3000}列表"]);
        assert_eq!(roles.attachment, Some(1));
    }

    #[test]
    fn test_unresolved_roles_stay_unset() {
        let roles = detect(&["a", "b", "c"]);
        assert_eq!(roles, ColumnRoles::default());
    }

    #[test]
    fn test_time_columns_excluded_from_content() {
        let roles = detect(&["反馈时间", "评论"]);
        assert_eq!(roles.content, Some(1));
    }

    #[test]
    fn test_detect_is_idempotent_and_in_range() {
        let headers = ["序号", "反馈内容", "用户类型", "附件列表", "上传日期"];
        let detector = ColumnDetector::new();
        let first = detector.detect(&headers);
        let second = detector.detect(&headers);
        assert_eq!(first, second);
        for idx in [first.content, first.user_type, first.attachment].into_iter().flatten() {
            assert!(idx < headers.len());
        }
    }
}
