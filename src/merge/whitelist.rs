//! # 白名单
//!
//! 白名单文件每行一个条目，支持两种写法：
//! - 裸域名：`ads.example.com`
//! - AdGuard 例外规则：`@@||ads.example.com^`
//!
//! 空行、`#` 和 `!` 开头的行忽略。比较时统一小写；条目本身和它的所有子域名都会被放行。

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::ConvertError;
use crate::rule::translator::rule_domain;
use crate::source::fetch::decode_body;

/// 域名白名单
#[derive(Debug, Clone, Default)]
pub struct Whitelist {
    entries: HashSet<String>,
}

impl Whitelist {
    /// 解析白名单文本
    pub fn parse(text: &str) -> Self {
        let entries = text.lines().filter_map(normalize_entry).collect();
        Self { entries }
    }

    /// 读取白名单文件
    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        let bytes = fs::read(path).map_err(|source| ConvertError::Whitelist {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&decode_body(&bytes, None)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 域名等于某个条目，或是某个条目的严格子域名
    pub fn matches_domain(&self, domain: &str) -> bool {
        if self.entries.is_empty() {
            return false;
        }

        let domain = domain.to_ascii_lowercase();
        if self.entries.contains(&domain) {
            return true;
        }

        // 逐级去掉左侧标签：a.b.c → b.c → c
        domain
            .match_indices('.')
            .any(|(idx, _)| self.entries.contains(&domain[idx + 1..]))
    }

    /// 判断一条输出规则是否应被白名单过滤
    pub fn matches_rule(&self, rule: &str) -> bool {
        rule_domain(rule).is_some_and(|domain| self.matches_domain(domain))
    }
}

/// 把一行白名单文本规范化为小写域名
fn normalize_entry(line: &str) -> Option<String> {
    let line = line.trim_start_matches('\u{feff}').trim();
    if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
        return None;
    }

    let rest = line.strip_prefix("@@").unwrap_or(line);
    let rest = rest.trim_start_matches('|');
    let end = rest.find(['^', '$', '/', ':']).unwrap_or(rest.len());
    let domain = rest[..end]
        .trim()
        .trim_start_matches("*.")
        .trim_start_matches('.');

    if domain.is_empty() || domain.contains(char::is_whitespace) {
        return None;
    }

    Some(domain.to_ascii_lowercase())
}
