//! # 转换编排模块
//!
//! 把各个组件串成单遍、严格顺序的流水线：
//! 1. 加载：按规则源顺序展开为原始行（单个规则源失败会被跳过）
//! 2. 分类 + 翻译：逐行进行，每一行的意外错误都在行边界被捕获
//! 3. 合并：去重、白名单过滤、统计
//!
//! 写文件和打印摘要由调用者（main）负责。

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::error::ConvertError;
use crate::merge::{Header, Merger, OutputDocument, Whitelist};
use crate::reporter::{Diagnostic, Reporter};
use crate::rule::{classify, ClassifiedRule, ClassifyMode, SuffixMarker, Translator, UnrecognizedReason};
use crate::source::{Fetcher, Loader, RawLine, SourceRef};

// ========================================
// 运行配置
// ========================================

/// 一次转换的完整配置（由命令行参数构造）
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// 规则源列表文件
    pub rules_file: PathBuf,
    /// 输出文件
    pub output: PathBuf,
    /// 单次请求超时
    pub timeout: Duration,
    /// 拉取失败后的额外重试次数
    pub retries: usize,
    pub mode: ClassifyMode,
    pub suffix_marker: SuffixMarker,
    /// 白名单文件（可选）
    pub whitelist: Option<PathBuf>,
    /// 只预览，不写文件
    pub dry_run: bool,
    /// 预览行数
    pub preview: usize,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            rules_file: PathBuf::from("rules.txt"),
            output: PathBuf::from("adguard-rules.txt"),
            timeout: Duration::from_secs(20),
            retries: 2,
            mode: ClassifyMode::default(),
            suffix_marker: SuffixMarker::default(),
            whitelist: None,
            dry_run: false,
            preview: 20,
        }
    }
}

// ========================================
// 流水线
// ========================================

/// 加载、转换并合并所有规则源，生成输出文档
pub fn build_document(
    config: &ConvertConfig,
    sources: &[SourceRef],
    fetcher: &dyn Fetcher,
    reporter: &mut dyn Reporter,
) -> Result<OutputDocument> {
    let whitelist = match &config.whitelist {
        Some(path) => {
            let wl = Whitelist::load(path)?;
            if wl.is_empty() {
                log::warn!("whitelist {} has no entries", path.display());
            } else {
                log::info!("loaded {} whitelist entries from {}", wl.len(), path.display());
            }
            wl
        }
        None => Whitelist::default(),
    };

    let lines = Loader::new(fetcher, config.retries).load(sources, reporter);
    log::info!(
        "expanded {} sources to {} total lines",
        sources.len(),
        lines.len()
    );

    let translator = Translator::new(config.suffix_marker);
    let mode = config.mode;
    let mut merger = Merger::new(whitelist);
    convert_lines(
        &lines,
        |text| {
            let rule = classify(text, mode);
            let output = translator.translate(&rule);
            (rule, output)
        },
        &mut merger,
        reporter,
    );
    log::debug!("merge finished: {:?}", merger.report());

    let header = Header {
        rules_file: config.rules_file.display().to_string(),
        sources: sources.len(),
        mode: config.mode,
        suffix_marker: config.suffix_marker,
        whitelist: config.whitelist.as_ref().map(|p| p.display().to_string()),
    };

    Ok(merger.finish(&header))
}

/// 逐行转换并交给合并器
///
/// `convert` 中的 panic 在行边界被捕获，该行按 unrecognized 处理，批处理继续。
fn convert_lines<F>(lines: &[RawLine], convert: F, merger: &mut Merger, reporter: &mut dyn Reporter)
where
    F: Fn(&str) -> (ClassifiedRule, Vec<String>),
{
    let fallback = Translator::default();

    for raw in lines {
        let (rule, output) = match panic::catch_unwind(AssertUnwindSafe(|| convert(&raw.text))) {
            Ok(converted) => converted,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                reporter.report(Diagnostic::LineFault {
                    origin: raw.origin.clone(),
                    line_no: raw.line_no,
                    line: raw.text.clone(),
                    message: message.clone(),
                });
                let rule = ClassifiedRule::unrecognized(
                    raw.text.trim(),
                    UnrecognizedReason::Internal(message),
                );
                let output = fallback.translate(&rule);
                (rule, output)
            }
        };

        if let ClassifiedRule::Unrecognized { original, reason } = &rule {
            if !matches!(reason, UnrecognizedReason::Internal(_)) {
                reporter.report(Diagnostic::Unrecognized {
                    origin: raw.origin.clone(),
                    line_no: raw.line_no,
                    line: original.clone(),
                    reason: reason.to_string(),
                });
            }
        }

        merger.push(&rule, output, reporter);
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// 检查文档是否值得写出：必须有输入行，且至少产生一条规则
pub fn check_document(doc: &OutputDocument) -> Result<()> {
    if doc.report.total_lines == 0 {
        return Err(ConvertError::NoRules("no lines found after expanding sources".to_string()))
            .context("nothing to convert");
    }
    if doc.report.emitted == 0 {
        return Err(ConvertError::NoRules(format!(
            "{} input lines produced no rules",
            doc.report.total_lines
        )))
        .context("nothing to write");
    }
    Ok(())
}

/// dry-run 预览：正文的前 `limit` 行
pub fn preview(doc: &OutputDocument, limit: usize) -> Vec<&str> {
    doc.body.iter().take(limit).map(String::as_str).collect()
}
