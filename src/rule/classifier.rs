//! # 规则行分类器
//!
//! 对单行文本判定它属于哪一种规则语法，并提取字段。纯函数，不做任何 I/O。
//!
//! ## 判定顺序（先匹配者优先）
//! 1. 空行 → Blank
//! 2. `#` 开头 → Comment（原样保留）
//! 3. `/pattern/` → 校验正则，成功则原样透传，失败记为 Unrecognized
//! 4. `host, <token>, reject` → Host
//! 5. `host-suffix, <token>, reject` → HostSuffix
//! 6. `host-keyword, <token>, reject` → HostKeyword
//! 7. `url, [scheme://]host[/path], reject` → Url
//! 8. 其他包含 `reject` 的行 → Unrecognized
//! 9. 元数据行（`@...`、`tag:...`） → Unrecognized
//! 10. 其余文本：严格模式下 → Unrecognized；字面模式下转义为 `/escaped/`
//!
//! 关键字与动作不区分大小写，逗号两侧的空白无意义；域名保持原样大小写。

use std::fmt;

use serde::Serialize;

use super::pattern::ValidatedPattern;

/// url 规则允许的协议
const URL_SCHEMES: [&str; 4] = ["http", "https", "ws", "wss"];

/// QuantumultX 的 reject 动作族，全部视为"拦截"
const REJECT_ACTIONS: [&str; 7] = [
    "reject",
    "reject-200",
    "reject-img",
    "reject-dict",
    "reject-array",
    "reject-video",
    "reject-tinygif",
];

// ========================================
// 分类模式
// ========================================

/// 非语法行的处理模式
///
/// 两种模式不会混用：一次运行只使用一种，并写入输出文件头。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClassifyMode {
    /// 只识别 host*/url + reject 语法，其余行都报告为 unrecognized
    #[default]
    Strict,
    /// 非语法行被当作要拦截的字面文本，转义为 `/escaped/` 正则
    Literal,
}

impl fmt::Display for ClassifyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyMode::Strict => write!(f, "strict"),
            ClassifyMode::Literal => write!(f, "literal"),
        }
    }
}

// ========================================
// 分类结果
// ========================================

/// 无法识别的原因（只用于诊断日志，不影响输出文本）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnrecognizedReason {
    /// `/pattern/` 或转义后的字面量无法编译
    InvalidPattern(String),
    /// 域名为空或为通配符 `*`
    EmptyOrWildcard,
    /// 语法关键字正确，但字段数量或字段内容不合法
    Malformed,
    /// 语法关键字正确，但动作不是 reject
    NotRejectAction,
    /// 包含 reject，但不是支持的规则类型
    UnsupportedRule,
    /// `@` / `tag:` 元数据行
    Metadata,
    /// 不包含 reject 动作的普通文本（严格模式）
    NoRejectAction,
    /// 处理该行时发生了意外错误
    Internal(String),
}

impl fmt::Display for UnrecognizedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnrecognizedReason::InvalidPattern(msg) => write!(f, "invalid pattern: {}", msg),
            UnrecognizedReason::EmptyOrWildcard => write!(f, "empty or wildcard domain"),
            UnrecognizedReason::Malformed => write!(f, "malformed rule"),
            UnrecognizedReason::NotRejectAction => write!(f, "action is not reject"),
            UnrecognizedReason::UnsupportedRule => write!(f, "unsupported rule type"),
            UnrecognizedReason::Metadata => write!(f, "metadata line"),
            UnrecognizedReason::NoRejectAction => write!(f, "no reject action"),
            UnrecognizedReason::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

/// 单行的分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedRule {
    /// 精确域名
    Host { domain: String },
    /// 域名及其所有子域名
    HostSuffix { domain: String },
    /// 域名中包含关键字
    HostKeyword { keyword: String },
    /// URL 前缀，path 含前导 `/`，没有则为空串
    Url { domain: String, path: String },
    /// 已经是目标格式的正则规则
    Regex(ValidatedPattern),
    /// 字面模式下由普通文本转义得到的正则
    Literal(ValidatedPattern),
    /// 注释，原样保留
    Comment(String),
    /// 空行
    Blank,
    /// 无法识别，保留原文用于审计
    Unrecognized {
        original: String,
        reason: UnrecognizedReason,
    },
}

impl ClassifiedRule {
    /// 构造 Unrecognized
    pub fn unrecognized(original: &str, reason: UnrecognizedReason) -> Self {
        ClassifiedRule::Unrecognized {
            original: original.to_string(),
            reason,
        }
    }
}

// ========================================
// 分类入口
// ========================================

/// 对单行进行分类
///
/// 调用者传入原始行即可，这里会先 trim。分类是全函数：任何输入都只对应一种结果。
pub fn classify(line: &str, mode: ClassifyMode) -> ClassifiedRule {
    let line = line.trim();

    if line.is_empty() {
        return ClassifiedRule::Blank;
    }

    if line.starts_with('#') {
        return ClassifiedRule::Comment(line.to_string());
    }

    if let Some(inner) = ValidatedPattern::strip_delimiters(line) {
        return match ValidatedPattern::parse(inner) {
            Ok(pattern) => ClassifiedRule::Regex(pattern),
            Err(e) => ClassifiedRule::unrecognized(
                line,
                UnrecognizedReason::InvalidPattern(e.to_string()),
            ),
        };
    }

    if let Some(rule) = classify_grammar(line) {
        return rule;
    }

    let lower = line.to_ascii_lowercase();
    if lower.contains("reject") {
        return ClassifiedRule::unrecognized(line, UnrecognizedReason::UnsupportedRule);
    }

    if line.starts_with('@') || lower.starts_with("tag:") {
        return ClassifiedRule::unrecognized(line, UnrecognizedReason::Metadata);
    }

    match mode {
        ClassifyMode::Strict => {
            ClassifiedRule::unrecognized(line, UnrecognizedReason::NoRejectAction)
        }
        ClassifyMode::Literal => match ValidatedPattern::escape_literal(line) {
            Ok(pattern) => ClassifiedRule::Literal(pattern),
            Err(e) => ClassifiedRule::unrecognized(
                line,
                UnrecognizedReason::InvalidPattern(e.to_string()),
            ),
        },
    }
}

/// 尝试按 `<type>, <value>, <action>` 语法解析
///
/// 第一个字段不是支持的类型时返回 None，交给后续的兜底判定。
fn classify_grammar(line: &str) -> Option<ClassifiedRule> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let kind = fields[0].to_ascii_lowercase();

    if !matches!(kind.as_str(), "host" | "host-suffix" | "host-keyword" | "url") {
        return None;
    }

    if fields.len() != 3 {
        return Some(ClassifiedRule::unrecognized(line, UnrecognizedReason::Malformed));
    }

    if !is_reject_action(fields[2]) {
        return Some(ClassifiedRule::unrecognized(
            line,
            UnrecognizedReason::NotRejectAction,
        ));
    }

    let token = match parse_token(fields[1]) {
        Ok(token) => token,
        Err(reason) => return Some(ClassifiedRule::unrecognized(line, reason)),
    };

    let rule = match kind.as_str() {
        "host" => ClassifiedRule::Host {
            domain: token.to_string(),
        },
        "host-suffix" => ClassifiedRule::HostSuffix {
            domain: token.to_string(),
        },
        "host-keyword" => ClassifiedRule::HostKeyword {
            keyword: token.to_string(),
        },
        _ => match parse_url_target(token) {
            Ok((domain, path)) => ClassifiedRule::Url {
                domain: domain.to_string(),
                path: path.to_string(),
            },
            Err(reason) => ClassifiedRule::unrecognized(line, reason),
        },
    };

    Some(rule)
}

/// 判断动作字段是否属于 reject 族
fn is_reject_action(action: &str) -> bool {
    let action = action.to_ascii_lowercase();
    REJECT_ACTIONS.contains(&action.as_str())
}

/// 校验值字段：非空、不是 `*`、不含空白
fn parse_token(token: &str) -> Result<&str, UnrecognizedReason> {
    if token.is_empty() || token == "*" {
        return Err(UnrecognizedReason::EmptyOrWildcard);
    }
    if token.chars().any(char::is_whitespace) {
        return Err(UnrecognizedReason::Malformed);
    }
    Ok(token)
}

/// 拆分 url 规则的目标：`[scheme://]host[/path]` → (host, path)
fn parse_url_target(target: &str) -> Result<(&str, &str), UnrecognizedReason> {
    let rest = match target.find("://") {
        Some(idx) => {
            let scheme = target[..idx].to_ascii_lowercase();
            if !URL_SCHEMES.contains(&scheme.as_str()) {
                return Err(UnrecognizedReason::Malformed);
            }
            &target[idx + 3..]
        }
        None => target,
    };

    let (host, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };

    if host.is_empty() || host == "*" {
        return Err(UnrecognizedReason::EmptyOrWildcard);
    }

    Ok((host, path))
}
