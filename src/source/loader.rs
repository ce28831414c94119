//! # 规则源加载器
//!
//! 把规则源列表展开为有序的原始行序列：先按规则源顺序，再按源内行顺序。
//! 单个规则源失败只记录警告并跳过，不会中断整次运行。

use std::fs;

use crate::error::ConvertError;
use crate::reporter::{Diagnostic, Reporter};

use super::config::SourceRef;
use super::fetch::{decode_body, Fetcher};

/// 一行原始文本，保留来源用于诊断
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    /// 行内容（未 trim）
    pub text: String,
    /// 来源描述（URL、路径或 inline）
    pub origin: String,
    /// 源内行号，从 1 开始
    pub line_no: usize,
}

/// 规则源加载器
pub struct Loader<'a> {
    fetcher: &'a dyn Fetcher,
    /// 首次失败后的额外重试次数
    retries: usize,
}

impl<'a> Loader<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, retries: usize) -> Self {
        Self { fetcher, retries }
    }

    /// 依次加载所有规则源
    pub fn load(&self, sources: &[SourceRef], reporter: &mut dyn Reporter) -> Vec<RawLine> {
        let mut lines = Vec::new();

        for source in sources {
            let origin = source.origin();
            match self.load_one(source, reporter) {
                Ok(text) => {
                    let before = lines.len();
                    lines.extend(text.lines().enumerate().map(|(idx, line)| RawLine {
                        text: line.to_string(),
                        origin: origin.clone(),
                        line_no: idx + 1,
                    }));
                    reporter.report(Diagnostic::SourceLoaded {
                        origin,
                        lines: lines.len() - before,
                    });
                }
                Err(e) => reporter.report(Diagnostic::SourceSkipped {
                    origin,
                    reason: e.to_string(),
                }),
            }
        }

        lines
    }

    /// 取得单个规则源的完整文本
    fn load_one(
        &self,
        source: &SourceRef,
        reporter: &mut dyn Reporter,
    ) -> Result<String, ConvertError> {
        match source {
            SourceRef::Remote(url) => self.fetch_with_retry(url, reporter),
            SourceRef::LocalFile(path) => {
                let bytes = fs::read(path).map_err(|source| ConvertError::Read {
                    path: path.clone(),
                    source,
                })?;
                Ok(decode_body(&bytes, None))
            }
            SourceRef::Inline(text) => Ok(text.clone()),
        }
    }

    /// 拉取远程规则源，失败时最多重试 `retries` 次，不做退避
    ///
    /// 只有完整成功的响应才会被使用，重试不会改变输出顺序。
    fn fetch_with_retry(
        &self,
        url: &str,
        reporter: &mut dyn Reporter,
    ) -> Result<String, ConvertError> {
        let mut attempt = 0;
        loop {
            match self.fetcher.fetch(url) {
                Ok(text) => return Ok(text),
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    reporter.report(Diagnostic::FetchRetry {
                        url: url.to_string(),
                        attempt,
                        max_retries: self.retries,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }
}
