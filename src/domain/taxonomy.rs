// ============================================================
// KEYWORD TAXONOMIES
// ============================================================
// Process-wide immutable keyword tables for column detection,
// user-type parsing, feedback classification and kanban column
// naming. Ordered slices, not maps: tie-breaking is defined as
// first-entry-wins, so definition order is part of the contract.

/// Category assigned when no classification keyword matches.
pub const FALLBACK_CATEGORY: &str = "Other";

/// User type returned for empty or missing user-type cells.
pub const UNKNOWN_USER_TYPE: &str = "Unknown";
pub const MEMBER_USER_TYPE: &str = "Member";
pub const NORMAL_USER_TYPE: &str = "Normal User";

/// Suggested name for an empty kanban grouping.
pub const DEFAULT_BOARD_LABEL: &str = "New Category";
/// Suggested name when no naming rule matches the grouped contents.
pub const NO_SIGNAL_BOARD_LABEL: &str = "Key Feedback";

/// Feedback classification taxonomy, in tie-break priority order.
/// The fallback category carries no keywords and is never scored.
pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "功能使用问题",
        &[
            "怎么用", "如何", "使用", "操作", "不会", "找不到", "在哪", "怎么", "无法使用",
            "不能用", "用不了", "打不开", "进不去",
        ],
    ),
    (
        "网络连接异常",
        &[
            "网络", "连接", "断开", "超时", "加载", "刷新", "联网", "网速", "掉线", "连不上",
            "服务器", "请求失败",
        ],
    ),
    (
        "校对功能缺陷",
        &[
            "校对", "纠错", "错别字", "语法", "标点", "修改", "改错", "检测", "识别", "漏检",
            "误报", "不准", "准确率",
        ],
    ),
    (
        "会员权限问题",
        &[
            "会员", "VIP", "权限", "付费", "订阅", "开通", "续费", "到期", "免费", "次数",
            "限制", "额度", "充值",
        ],
    ),
    (
        "功能建议与反馈",
        &[
            "建议", "希望", "能否", "可以增加", "想要", "需要", "功能", "新增", "添加", "支持",
            "优化", "改进", "体验",
        ],
    ),
    (FALLBACK_CATEGORY, &[]),
];

/// User-type cells matching any of these resolve to [`MEMBER_USER_TYPE`].
/// Checked strictly before the normal-user set.
pub const MEMBER_KEYWORDS: &[&str] = &["会员", "vip", "premium", "付费", "pro"];

/// User-type cells matching any of these resolve to [`NORMAL_USER_TYPE`].
pub const NORMAL_USER_KEYWORDS: &[&str] = &["普通", "免费", "free", "normal", "basic"];

/// Headers containing one of these qualify as the content column.
pub const CONTENT_KEYWORDS: &[&str] = &[
    "内容", "content", "feedback", "message", "描述", "意见", "评论", "反馈内容",
];

/// Headers containing one of these never qualify as the content column
/// (serial numbers, timestamps and the like).
pub const CONTENT_EXCLUDE_KEYWORDS: &[&str] = &["id", "编号", "序号", "时间", "日期", "date"];

/// Headers containing one of these qualify as the user-type column.
pub const USER_TYPE_COLUMN_KEYWORDS: &[&str] = &[
    "用户类型", "会员", "user_type", "身份", "等级", "会员类型", "用户身份",
];

/// Headers containing one of these (whitespace stripped) qualify as the
/// attachment column.
pub const ATTACHMENT_KEYWORDS: &[&str] =
    &["附件列表", "用户附件", "attachment", "附件链接", "文件链接"];

/// Attachment-count siblings ("附件数量", "attachment count") must not be
/// mistaken for the attachment column itself.
pub const ATTACHMENT_EXCLUDE_KEYWORDS: &[&str] = &["数量", "count", "num", "个数", "数目"];

/// Kanban column naming rules: (keyword set, suggested label).
/// Several sets may share a label; their scores accumulate.
pub const BOARD_NAME_RULES: &[(&[&str], &str)] = &[
    (&["登录", "注册", "账号", "密码", "验证码"], "账号与登录"),
    (&["崩溃", "闪退", "卡死", "报错", "bug", "异常"], "稳定性问题"),
    (&["慢", "卡顿", "延迟", "加载", "速度"], "性能体验"),
    (&["网络", "连接", "超时", "断开", "服务器"], "网络问题"),
    (&["会员", "vip", "付费", "价格", "收费", "退款"], "会员与付费"),
    (&["订阅", "续费", "到期", "充值"], "会员与付费"),
    (&["建议", "希望", "增加", "支持", "优化", "改进"], "产品建议"),
    (&["界面", "按钮", "颜色", "布局", "字体", "排版"], "界面交互"),
    (&["导出", "导入", "保存", "同步", "备份"], "数据管理"),
];
