// ============================================================
// FEEDBACK CLASSIFIER
// ============================================================
// Keyword-scored assignment of feedback text to a fixed category
// taxonomy. Pure string scanning; no NLP.

use crate::domain::taxonomy::{CATEGORY_KEYWORDS, FALLBACK_CATEGORY};

/// Scores content against [`CATEGORY_KEYWORDS`] and picks the best match.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedbackClassifier;

impl FeedbackClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Per category: count of its keywords appearing anywhere in the content
    /// (case-insensitive substring, each keyword counted once). Strictly
    /// highest score wins; ties fall to the earliest-defined category so the
    /// result is reproducible for identical input. No keyword hit at all, or
    /// empty content, yields the fallback category.
    pub fn classify(&self, content: &str) -> String {
        if content.is_empty() {
            return FALLBACK_CATEGORY.to_string();
        }

        let lowered = content.to_lowercase();
        let mut best: Option<(&str, usize)> = None;

        for (category, keywords) in CATEGORY_KEYWORDS {
            if keywords.is_empty() {
                continue;
            }
            let score = keywords
                .iter()
                .filter(|kw| lowered.contains(&kw.to_lowercase()))
                .count();
            if score > 0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((category, score));
            }
        }

        best.map(|(category, _)| category.to_string())
            .unwrap_or_else(|| FALLBACK_CATEGORY.to_string())
    }

    /// All category labels, fallback included, in taxonomy order.
    pub fn get_categories(&self) -> Vec<&'static str> {
        CATEGORY_KEYWORDS.iter().map(|(category, _)| *category).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content_is_fallback() {
        assert_eq!(FeedbackClassifier::new().classify(""), "Other");
    }

    #[test]
    fn test_no_keyword_is_fallback() {
        assert_eq!(FeedbackClassifier::new().classify("今天天气不错"), "Other");
    }

    #[test]
    fn test_exclusive_keywords_pick_their_category() {
        let classifier = FeedbackClassifier::new();
        assert_eq!(classifier.classify("错别字漏检，准确率太低"), "校对功能缺陷");
        assert_eq!(classifier.classify("续费之后额度没有增加多少"), "会员权限问题");
    }

    #[test]
    fn test_highest_raw_score_wins() {
        // 网络连接异常 scores 3 (网络/连接/超时), 功能建议与反馈 scores 2
        // (希望/优化); the higher raw count must win.
        let classifier = FeedbackClassifier::new();
        assert_eq!(
            classifier.classify("网络连接总是超时，希望能优化一下"),
            "网络连接异常"
        );
    }

    #[test]
    fn test_tie_breaks_by_taxonomy_order() {
        // One hit each for 网络连接异常 (网络) and 功能建议与反馈 (希望);
        // 网络连接异常 is defined earlier.
        let classifier = FeedbackClassifier::new();
        assert_eq!(classifier.classify("网络希望"), "网络连接异常");
    }

    #[test]
    fn test_case_insensitive_matching() {
        assert_eq!(FeedbackClassifier::new().classify("vip到期了还能用吗"), "会员权限问题");
    }

    #[test]
    fn test_repeated_keyword_counts_once() {
        // "网络" twice is still one hit, so 功能建议与反馈 (建议/希望) wins 2:1.
        let classifier = FeedbackClassifier::new();
        assert_eq!(classifier.classify("网络网络，建议希望搞好点"), "功能建议与反馈");
    }

    #[test]
    fn test_deterministic_output() {
        let classifier = FeedbackClassifier::new();
        let content = "打不开页面，服务器没响应";
        assert_eq!(classifier.classify(content), classifier.classify(content));
    }

    #[test]
    fn test_category_listing_order() {
        let categories = FeedbackClassifier::new().get_categories();
        assert_eq!(
            categories,
            vec![
                "功能使用问题",
                "网络连接异常",
                "校对功能缺陷",
                "会员权限问题",
                "功能建议与反馈",
                "Other",
            ]
        );
    }
}
