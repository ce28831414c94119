//! # 输出文档
//!
//! 文件头 + 按输入顺序排列的正文行 + 统计。
//! 文件头不包含时间戳，同样的输入重复运行得到逐字节相同的文件。

use std::fmt;

use serde::Serialize;

use crate::rule::{ClassifyMode, SuffixMarker};

// ========================================
// 统计
// ========================================

/// 单次运行的统计计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    /// 输入行总数（含空行与注释）
    pub total_lines: usize,
    /// 成功识别并翻译的输入行
    pub translated: usize,
    /// 原样保留的注释行
    pub comments: usize,
    /// 空行
    pub blank: usize,
    /// 无法识别的行
    pub unrecognized: usize,
    /// 因重复而省略的规则行
    pub duplicates: usize,
    /// 被白名单过滤的规则行
    pub whitelisted: usize,
    /// 最终写出的规则行
    pub emitted: usize,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total input lines: {}", self.total_lines)?;
        writeln!(f, "  translated:   {}", self.translated)?;
        writeln!(f, "  comments:     {}", self.comments)?;
        writeln!(f, "  blank:        {}", self.blank)?;
        writeln!(f, "  unrecognized: {}", self.unrecognized)?;
        writeln!(f, "Rules emitted: {}", self.emitted)?;
        writeln!(f, "  duplicates:   {}", self.duplicates)?;
        write!(f, "  whitelisted:  {}", self.whitelisted)
    }
}

// ========================================
// 文件头
// ========================================

/// 文件头描述的运行参数
#[derive(Debug, Clone)]
pub struct Header {
    /// 规则源列表文件
    pub rules_file: String,
    /// 规则源数量
    pub sources: usize,
    pub mode: ClassifyMode,
    pub suffix_marker: SuffixMarker,
    /// 白名单文件（可选）
    pub whitelist: Option<String>,
}

impl Header {
    /// 渲染为注释行
    pub fn render(&self) -> Vec<String> {
        let suffix_output = match self.suffix_marker {
            SuffixMarker::Adguard => "0.0.0.0 <domain> + ||<domain>^",
            SuffixMarker::Ipv6 => "0.0.0.0 <domain> + :: <domain>",
        };

        let mut lines = vec![
            format!("# {} generated blocklist", env!("CARGO_PKG_NAME")),
            format!("# Source list: {} ({} sources)", self.rules_file, self.sources),
            format!("# Mode: {}", self.mode),
            format!("# Host-suffix marker: {}", self.suffix_marker),
            format!(
                "# Whitelist: {}",
                self.whitelist.as_deref().unwrap_or("none")
            ),
            "#".to_string(),
            "# Supported grammars:".to_string(),
            "#   host, <domain>, reject              -> 0.0.0.0 <domain>".to_string(),
            format!("#   host-suffix, <domain>, reject       -> {}", suffix_output),
            "#   host-keyword, <keyword>, reject     -> ||*<keyword>*$important".to_string(),
            "#   url, [scheme://]<host>[/path], reject -> ||<host>[/path]^".to_string(),
            "#   /regex/                             -> /regex/".to_string(),
        ];
        if self.mode == ClassifyMode::Literal {
            lines.push("#   other text                          -> /escaped text/".to_string());
        }
        lines.push("# Lines that cannot be converted are kept as \"# unrecognized: ...\".".to_string());
        lines.push("#".to_string());
        lines
    }
}

// ========================================
// 输出文档
// ========================================

/// 最终输出文档
#[derive(Debug, Clone)]
pub struct OutputDocument {
    pub header: Vec<String>,
    pub body: Vec<String>,
    pub report: Report,
}

impl OutputDocument {
    /// 依次返回文件头与正文
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.header
            .iter()
            .chain(self.body.iter())
            .map(String::as_str)
    }
}
