//! # 规则源列表解析
//!
//! 规则源列表（默认 `rules.txt`）每行一个规则源：
//! - `http://` / `https://` 开头 → 远程 URL
//! - 存在的文件路径 → 本地规则文件
//! - 其他 → 直接当作一条规则文本
//!
//! 空行和 `#` 开头的行会被忽略。

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use super::fetch::decode_body;
use crate::error::ConvertError;

/// 单个规则源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// 远程 URL
    Remote(String),
    /// 本地规则文件
    LocalFile(PathBuf),
    /// 行内规则文本
    Inline(String),
}

impl SourceRef {
    /// 用于日志与诊断的来源描述
    pub fn origin(&self) -> String {
        match self {
            SourceRef::Remote(url) => url.clone(),
            SourceRef::LocalFile(path) => path.display().to_string(),
            SourceRef::Inline(_) => "inline".to_string(),
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceRef::Remote(url) => write!(f, "remote {}", url),
            SourceRef::LocalFile(path) => write!(f, "file {}", path.display()),
            SourceRef::Inline(text) => write!(f, "inline {:?}", text),
        }
    }
}

/// 判断是否为远程 URL（不区分大小写）
pub fn is_remote(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// 解析规则源列表文本
///
/// `is_file` 决定一行是否被当作本地文件，方便测试时不依赖真实文件系统。
pub fn parse_source_list<F>(text: &str, is_file: F) -> Vec<SourceRef>
where
    F: Fn(&Path) -> bool,
{
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| {
            if is_remote(line) {
                SourceRef::Remote(line.to_string())
            } else if is_file(Path::new(line)) {
                SourceRef::LocalFile(PathBuf::from(line))
            } else {
                SourceRef::Inline(line.to_string())
            }
        })
        .collect()
}

/// 读取并解析规则源列表文件
///
/// 文件不存在、不可读或解析后为空都是配置错误。
/// 解码方式与本地规则文件相同（去 BOM，非 UTF-8 回退 GB18030）。
pub fn load_source_list(path: &Path) -> Result<Vec<SourceRef>, ConvertError> {
    let bytes = fs::read(path).map_err(|source| ConvertError::SourceList {
        path: path.to_path_buf(),
        source,
    })?;
    let text = decode_body(&bytes, None);

    let sources = parse_source_list(&text, Path::is_file);
    if sources.is_empty() {
        return Err(ConvertError::NoSources(path.to_path_buf()));
    }

    Ok(sources)
}
