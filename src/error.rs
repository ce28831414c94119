//! # 错误类型
//!
//! 模块内部使用类型化的 `ConvertError`，应用边界（main / pipeline）统一转成 `anyhow::Error`。

use std::path::PathBuf;

use thiserror::Error;

/// 转换过程中的错误
#[derive(Debug, Error)]
pub enum ConvertError {
    /// 规则源列表为空
    #[error("no sources found in {}", .0.display())]
    NoSources(PathBuf),

    /// 规则源列表无法读取
    #[error("failed to read source list {}", .path.display())]
    SourceList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 展开后没有任何可转换的行，或者没有产生任何规则
    #[error("no rules produced: {0}")]
    NoRules(String),

    /// 远程规则源拉取失败
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// 本地规则文件读取失败
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 白名单文件读取失败
    #[error("failed to read whitelist {}", .path.display())]
    Whitelist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 正则规则无法编译
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// 输出文件写入失败
    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConvertError::NoSources(PathBuf::from("rules.txt"));
        assert_eq!(err.to_string(), "no sources found in rules.txt");

        let err = ConvertError::Fetch {
            url: "https://example.com/a.list".to_string(),
            reason: "HTTP 404".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to fetch https://example.com/a.list: HTTP 404"
        );
    }
}
