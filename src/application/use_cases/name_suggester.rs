// ============================================================
// CATEGORY NAME SUGGESTER
// ============================================================
// Suggest a human-readable name for an ad-hoc kanban grouping by
// scoring its contents against the board naming rules.

use crate::domain::taxonomy::{BOARD_NAME_RULES, DEFAULT_BOARD_LABEL, NO_SIGNAL_BOARD_LABEL};

/// Names a batch of feedback texts after the dominant naming rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryNameSuggester;

impl CategoryNameSuggester {
    pub fn new() -> Self {
        Self
    }

    /// Score every (keyword set, label) rule against the space-joined,
    /// lower-cased contents; rules sharing a label pool their scores.
    /// Strictly highest total wins, ties fall to the earliest-defined label.
    /// No input at all yields [`DEFAULT_BOARD_LABEL`]; no keyword hit yields
    /// [`NO_SIGNAL_BOARD_LABEL`].
    pub fn suggest<S: AsRef<str>>(&self, contents: &[S]) -> String {
        if contents.is_empty() {
            return DEFAULT_BOARD_LABEL.to_string();
        }

        // Space-joined so a keyword cannot straddle two adjacent contents.
        let blob = contents
            .iter()
            .map(|c| c.as_ref())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        let mut totals: Vec<(&str, usize)> = Vec::new();
        for (keywords, label) in BOARD_NAME_RULES {
            let score = keywords
                .iter()
                .filter(|kw| blob.contains(&kw.to_lowercase()))
                .count();
            match totals.iter_mut().find(|(known, _)| known == label) {
                Some(entry) => entry.1 += score,
                None => totals.push((label, score)),
            }
        }

        let mut best: Option<(&str, usize)> = None;
        for (label, score) in totals {
            if score > 0 && best.map_or(true, |(_, top)| score > top) {
                best = Some((label, score));
            }
        }

        best.map(|(label, _)| label.to_string())
            .unwrap_or_else(|| NO_SIGNAL_BOARD_LABEL.to_string())
    }

    pub fn suggest_for_single(&self, content: &str) -> String {
        self.suggest(&[content])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_gets_default_label() {
        let suggester = CategoryNameSuggester::new();
        assert_eq!(suggester.suggest::<&str>(&[]), "New Category");
    }

    #[test]
    fn test_no_signal_gets_fixed_fallback() {
        let suggester = CategoryNameSuggester::new();
        assert_eq!(suggester.suggest(&["今天天气不错"]), "Key Feedback");
        assert_eq!(suggester.suggest_for_single("abc"), "Key Feedback");
    }

    #[test]
    fn test_dominant_rule_names_the_group() {
        let suggester = CategoryNameSuggester::new();
        let contents = ["登录不上去", "密码重置收不到验证码", "注册流程太长"];
        assert_eq!(suggester.suggest(&contents), "账号与登录");
    }

    #[test]
    fn test_scores_accumulate_across_rules_sharing_a_label() {
        // 会员与付费 owns two rules; 会员+付费 (set one) and 续费+到期
        // (set two) pool to 4, beating 网络问题's 连接+超时 = 2.
        let suggester = CategoryNameSuggester::new();
        let contents = ["会员续费到期后付费失败", "连接超时"];
        assert_eq!(suggester.suggest(&contents), "会员与付费");
    }

    #[test]
    fn test_tie_falls_to_earlier_rule() {
        // 崩溃 (稳定性问题) and 卡顿 (性能体验) score one each; the
        // stability rule is defined first.
        let suggester = CategoryNameSuggester::new();
        assert_eq!(suggester.suggest(&["崩溃", "卡顿"]), "稳定性问题");
    }

    #[test]
    fn test_join_prevents_cross_content_matches() {
        // "卡" + "顿" split across two contents must not form "卡顿".
        let suggester = CategoryNameSuggester::new();
        assert_eq!(suggester.suggest(&["卡", "顿"]), "Key Feedback");
    }

    #[test]
    fn test_single_matches_batch_of_one() {
        let suggester = CategoryNameSuggester::new();
        assert_eq!(
            suggester.suggest_for_single("界面字体太小，布局也乱"),
            suggester.suggest(&["界面字体太小，布局也乱"])
        );
    }
}
