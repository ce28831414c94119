//! # 正则规则值类型
//!
//! 规则源里 `/pattern/` 形式的行本身就是 AdGuard 正则规则。
//! 这里把"能否编译"收敛成一个值类型：只有通过校验的模式才能构造出 `ValidatedPattern`。
//!
//! 编译后体积超过 `PATTERN_SIZE_LIMIT`（1 MiB）的模式也按无效处理，该行输出为
//! `# unrecognized: ...`。

use std::fmt;

use regex::RegexBuilder;

use crate::error::ConvertError;

/// 编译校验时允许的最大正则体积，防止病态规则拖慢整批转换
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// 已通过编译校验的正则模式（不含两侧的 `/`）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPattern(String);

impl ValidatedPattern {
    /// 校验原样的正则模式
    pub fn parse(pattern: &str) -> Result<Self, ConvertError> {
        if pattern.is_empty() {
            return Err(ConvertError::InvalidPattern {
                pattern: String::new(),
                reason: "empty pattern".to_string(),
            });
        }

        RegexBuilder::new(pattern)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
            .map_err(|e| ConvertError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self(pattern.to_string()))
    }

    /// 把任意文本转义为"字面匹配"的正则
    ///
    /// 除了正则元字符，还会转义 `/`，否则输出的 `/.../` 会被提前截断。
    pub fn escape_literal(text: &str) -> Result<Self, ConvertError> {
        let escaped = regex::escape(text).replace('/', r"\/");
        Self::parse(&escaped)
    }

    /// 模式文本
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 判断一行是否是 `/pattern/` 形式，返回内部模式
    pub fn strip_delimiters(line: &str) -> Option<&str> {
        if line.len() >= 2 && line.starts_with('/') && line.ends_with('/') {
            Some(&line[1..line.len() - 1])
        } else {
            None
        }
    }
}

impl fmt::Display for ValidatedPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.as_str())
    }
}

// ========================================
// 测试模块
// ========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_pattern() {
        let p = ValidatedPattern::parse(r"^ads?\d+\.example\.com$").unwrap();
        assert_eq!(p.as_str(), r"^ads?\d+\.example\.com$");
        assert_eq!(p.to_string(), r"/^ads?\d+\.example\.com$/");
    }

    #[test]
    fn test_parse_invalid_pattern() {
        let err = ValidatedPattern::parse("ads[").unwrap_err();
        assert!(matches!(err, ConvertError::InvalidPattern { .. }));
        assert!(ValidatedPattern::parse("").is_err());
    }

    #[test]
    fn test_oversized_pattern_is_invalid() {
        let huge = format!("(?:{}){{1000}}", r"\w{100}");
        let err = ValidatedPattern::parse(&huge).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidPattern { .. }));
    }

    #[test]
    fn test_escape_literal() {
        let p = ValidatedPattern::escape_literal("a.b*c").unwrap();
        assert_eq!(p.as_str(), r"a\.b\*c");
        // 转义后的模式必须能字面匹配原文本
        let re = regex::Regex::new(p.as_str()).unwrap();
        assert!(re.is_match("xx a.b*c yy"));
        assert!(!re.is_match("aXbbc"));
    }

    #[test]
    fn test_strip_delimiters() {
        assert_eq!(ValidatedPattern::strip_delimiters("/ads/"), Some("ads"));
        assert_eq!(ValidatedPattern::strip_delimiters("//"), Some(""));
        assert_eq!(ValidatedPattern::strip_delimiters("/"), None);
        assert_eq!(ValidatedPattern::strip_delimiters("ads/"), None);
    }
}
