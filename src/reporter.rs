//! # 诊断输出
//!
//! 流水线不直接打印日志，而是把诊断事件交给 `Reporter`。
//! 命令行下使用 `LogReporter` 转发到 `log`，测试中使用 `MemoryReporter` 收集事件。

use std::fmt;

/// 流水线产生的诊断事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// 规则源加载成功
    SourceLoaded { origin: String, lines: usize },
    /// 规则源失败被跳过（贡献 0 行）
    SourceSkipped { origin: String, reason: String },
    /// 远程拉取失败，准备重试
    FetchRetry {
        url: String,
        attempt: usize,
        max_retries: usize,
        reason: String,
    },
    /// 无法识别的行
    Unrecognized {
        origin: String,
        line_no: usize,
        line: String,
        reason: String,
    },
    /// 处理某一行时发生意外错误，已按 unrecognized 处理
    LineFault {
        origin: String,
        line_no: usize,
        line: String,
        message: String,
    },
    /// 被白名单过滤的规则
    Whitelisted { rule: String },
    /// 重复的规则
    Duplicate { rule: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SourceLoaded { origin, lines } => {
                write!(f, "loaded {} lines from {}", lines, origin)
            }
            Diagnostic::SourceSkipped { origin, reason } => {
                write!(f, "skip source {}: {}", origin, reason)
            }
            Diagnostic::FetchRetry {
                url,
                attempt,
                max_retries,
                reason,
            } => write!(
                f,
                "fetch {} failed ({}), retrying (attempt {}/{})",
                url, reason, attempt, max_retries
            ),
            Diagnostic::Unrecognized {
                origin,
                line_no,
                line,
                reason,
            } => write!(f, "{}:{}: {} ({:?})", origin, line_no, reason, line),
            Diagnostic::LineFault {
                origin,
                line_no,
                line,
                message,
            } => write!(
                f,
                "{}:{}: unexpected error processing {:?}: {}",
                origin, line_no, line, message
            ),
            Diagnostic::Whitelisted { rule } => write!(f, "whitelisted: {}", rule),
            Diagnostic::Duplicate { rule } => write!(f, "duplicate: {}", rule),
        }
    }
}

/// 诊断事件接收者
pub trait Reporter {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// 转发到 `log` 门面
#[derive(Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::SourceLoaded { .. } => log::info!("{}", diagnostic),
            Diagnostic::SourceSkipped { .. } | Diagnostic::FetchRetry { .. } => {
                log::warn!("{}", diagnostic)
            }
            Diagnostic::LineFault { .. } => log::error!("{}", diagnostic),
            Diagnostic::Unrecognized { .. } | Diagnostic::Whitelisted { .. } => {
                log::debug!("{}", diagnostic)
            }
            Diagnostic::Duplicate { .. } => log::trace!("{}", diagnostic),
        }
    }
}

/// 收集所有事件，供测试断言
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryReporter {
    pub events: Vec<Diagnostic>,
}

#[cfg(test)]
impl Reporter for MemoryReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.events.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::SourceSkipped {
            origin: "https://example.com/a.list".to_string(),
            reason: "HTTP 404".to_string(),
        };
        assert_eq!(d.to_string(), "skip source https://example.com/a.list: HTTP 404");

        let d = Diagnostic::Unrecognized {
            origin: "rules.txt".to_string(),
            line_no: 3,
            line: "foobar".to_string(),
            reason: "no reject action".to_string(),
        };
        assert_eq!(d.to_string(), "rules.txt:3: no reject action (\"foobar\")");
    }
}
