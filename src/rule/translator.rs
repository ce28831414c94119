//! # 规则翻译器
//!
//! 把分类结果映射为 AdGuard / hosts 格式的输出行。所有输出语法集中在这里：
//!
//! | 输入 | 输出 |
//! |---|---|
//! | Host | `0.0.0.0 domain` |
//! | HostSuffix | `0.0.0.0 domain` + 次要行（`||domain^` 或 `:: domain`） |
//! | HostKeyword | `||*keyword*$important` |
//! | Url | `||domain/path^` |
//! | Regex / Literal | `/pattern/` |
//! | Comment | 原样 |
//! | Blank | 无输出 |
//! | Unrecognized | `# unrecognized: 原文` |

use std::fmt;

use serde::Serialize;

use super::classifier::ClassifiedRule;

/// hosts 格式前缀（IPv4）
pub const HOSTS_V4_PREFIX: &str = "0.0.0.0 ";
/// hosts 格式前缀（IPv6）
pub const HOSTS_V6_PREFIX: &str = ":: ";
/// AdGuard 域名锚点
pub const ADGUARD_ANCHOR: &str = "||";
/// AdGuard 分隔符
pub const ADGUARD_SEPARATOR: &str = "^";
/// 关键字规则的修饰符，提升优先级以压过例外规则
pub const KEYWORD_MODIFIER: &str = "$important";
/// 无法识别的行的注释前缀
pub const UNRECOGNIZED_PREFIX: &str = "# unrecognized: ";
/// 被白名单过滤的行的注释前缀
pub const WHITELISTED_PREFIX: &str = "# whitelisted: ";

// ========================================
// 次要行策略
// ========================================

/// host-suffix 规则的第二行输出形式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SuffixMarker {
    /// AdGuard 后缀语法 `||domain^`，覆盖所有子域名
    #[default]
    Adguard,
    /// IPv6 hosts 行 `:: domain`，只在显式要求 IPv6 覆盖时使用
    Ipv6,
}

impl fmt::Display for SuffixMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuffixMarker::Adguard => write!(f, "adguard"),
            SuffixMarker::Ipv6 => write!(f, "ipv6"),
        }
    }
}

// ========================================
// 翻译器
// ========================================

/// 规则翻译器
#[derive(Debug, Clone, Copy, Default)]
pub struct Translator {
    suffix_marker: SuffixMarker,
}

impl Translator {
    pub fn new(suffix_marker: SuffixMarker) -> Self {
        Self { suffix_marker }
    }

    /// 翻译单条分类结果，输出可能为空（Blank）或多行（HostSuffix）
    pub fn translate(&self, rule: &ClassifiedRule) -> Vec<String> {
        match rule {
            ClassifiedRule::Host { domain } => vec![hosts_line(domain)],
            ClassifiedRule::HostSuffix { domain } => {
                let marker = match self.suffix_marker {
                    SuffixMarker::Adguard => adguard_line(domain, ""),
                    SuffixMarker::Ipv6 => format!("{}{}", HOSTS_V6_PREFIX, domain),
                };
                vec![hosts_line(domain), marker]
            }
            ClassifiedRule::HostKeyword { keyword } => vec![format!(
                "{}*{}*{}",
                ADGUARD_ANCHOR, keyword, KEYWORD_MODIFIER
            )],
            ClassifiedRule::Url { domain, path } => vec![adguard_line(domain, path)],
            ClassifiedRule::Regex(pattern) | ClassifiedRule::Literal(pattern) => {
                vec![pattern.to_string()]
            }
            ClassifiedRule::Comment(text) => vec![text.clone()],
            ClassifiedRule::Blank => Vec::new(),
            ClassifiedRule::Unrecognized { original, .. } => {
                vec![format!("{}{}", UNRECOGNIZED_PREFIX, original)]
            }
        }
    }
}

fn hosts_line(domain: &str) -> String {
    format!("{}{}", HOSTS_V4_PREFIX, domain)
}

fn adguard_line(domain: &str, path: &str) -> String {
    format!("{}{}{}{}", ADGUARD_ANCHOR, domain, path, ADGUARD_SEPARATOR)
}

/// 从一条输出规则中取出域名部分，供白名单比较
///
/// - `0.0.0.0 X` / `:: X` → X
/// - `||X^` / `||X/path^` → X（在第一个 `/`、`^` 或 `$` 处截断）
/// - 其他形式（正则、关键字通配）没有确定的域名，返回 None
pub fn rule_domain(line: &str) -> Option<&str> {
    let domain = if let Some(rest) = line.strip_prefix(HOSTS_V4_PREFIX) {
        rest.trim()
    } else if let Some(rest) = line.strip_prefix(HOSTS_V6_PREFIX) {
        rest.trim()
    } else if let Some(rest) = line.strip_prefix(ADGUARD_ANCHOR) {
        let end = rest.find(['/', ':', '^', '$']).unwrap_or(rest.len());
        &rest[..end]
    } else {
        return None;
    };

    if domain.is_empty() || domain.contains('*') {
        None
    } else {
        Some(domain)
    }
}

// ========================================
// 测试模块
// ========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::classifier::{classify, ClassifyMode};

    fn convert(line: &str) -> Vec<String> {
        Translator::default().translate(&classify(line, ClassifyMode::Strict))
    }

    #[test]
    fn test_translate_table() {
        let cases: [(&str, &[&str]); 10] = [
            ("host, a.com, reject", &["0.0.0.0 a.com"]),
            (
                "host-suffix, b.com, reject",
                &["0.0.0.0 b.com", "||b.com^"],
            ),
            (
                "host-keyword, ad-track-x, reject",
                &["||*ad-track-x*$important"],
            ),
            ("url, https://c.com/ads/x.js, reject", &["||c.com/ads/x.js^"]),
            ("url, c.com, reject", &["||c.com^"]),
            ("url, http://c.com/, reject", &["||c.com/^"]),
            (r"/^ad\d+\./", &[r"/^ad\d+\./"]),
            ("# keep me", &["# keep me"]),
            ("", &[]),
            ("host, *, reject", &["# unrecognized: host, *, reject"]),
        ];

        for (line, expected) in cases {
            assert_eq!(convert(line), expected, "line: {:?}", line);
        }
    }

    #[test]
    fn test_translate_preserves_case() {
        assert_eq!(convert("HOST, Ads.Example.com, REJECT"), ["0.0.0.0 Ads.Example.com"]);
    }

    #[test]
    fn test_suffix_marker_ipv6() {
        let translator = Translator::new(SuffixMarker::Ipv6);
        let rule = classify("host-suffix, b.com, reject", ClassifyMode::Strict);
        assert_eq!(translator.translate(&rule), ["0.0.0.0 b.com", ":: b.com"]);

        // ipv6 只影响 host-suffix
        let rule = classify("host, a.com, reject", ClassifyMode::Strict);
        assert_eq!(translator.translate(&rule), ["0.0.0.0 a.com"]);
    }

    #[test]
    fn test_translate_literal_mode() {
        let rule = classify("ads.js", ClassifyMode::Literal);
        assert_eq!(Translator::default().translate(&rule), [r"/ads\.js/"]);
    }

    #[test]
    fn test_rule_domain() {
        assert_eq!(rule_domain("0.0.0.0 a.com"), Some("a.com"));
        assert_eq!(rule_domain(":: a.com"), Some("a.com"));
        assert_eq!(rule_domain("||a.com^"), Some("a.com"));
        assert_eq!(rule_domain("||a.com/path/x^"), Some("a.com"));
        assert_eq!(rule_domain("||a.com:8443/ad^"), Some("a.com"));
        assert_eq!(rule_domain("||*ad*$important"), None);
        assert_eq!(rule_domain(r"/^ad\./"), None);
        assert_eq!(rule_domain("# comment"), None);
    }
}
