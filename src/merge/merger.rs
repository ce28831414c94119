//! # 合并 / 去重 / 白名单
//!
//! 按输入顺序接收每一行的分类结果与翻译结果，累积成最终文档。
//!
//! ## 规则行的处理顺序
//! 1. 与已出现过的规则行逐字节相同 → 计为重复并省略（先出现者保留位置）
//! 2. 域名命中白名单 → 替换为 `# whitelisted: ...` 注释
//! 3. 否则写入正文
//!
//! 注释与诊断注释不参与去重。

use std::collections::HashSet;

use crate::reporter::{Diagnostic, Reporter};
use crate::rule::translator::WHITELISTED_PREFIX;
use crate::rule::ClassifiedRule;

use super::document::{Header, OutputDocument, Report};
use super::whitelist::Whitelist;

/// 合并器，独占去重集合与统计
#[derive(Debug, Default)]
pub struct Merger {
    whitelist: Whitelist,
    seen: HashSet<String>,
    body: Vec<String>,
    report: Report,
}

impl Merger {
    pub fn new(whitelist: Whitelist) -> Self {
        Self {
            whitelist,
            ..Default::default()
        }
    }

    /// 接收一行输入的分类结果及其翻译输出
    pub fn push(&mut self, rule: &ClassifiedRule, output: Vec<String>, reporter: &mut dyn Reporter) {
        self.report.total_lines += 1;

        match rule {
            ClassifiedRule::Blank => self.report.blank += 1,
            ClassifiedRule::Comment(_) => {
                self.report.comments += 1;
                self.body.extend(output);
            }
            ClassifiedRule::Unrecognized { .. } => {
                self.report.unrecognized += 1;
                self.body.extend(output);
            }
            _ => {
                self.report.translated += 1;
                for line in output {
                    self.push_rule_line(line, reporter);
                }
            }
        }
    }

    fn push_rule_line(&mut self, line: String, reporter: &mut dyn Reporter) {
        if self.seen.contains(&line) {
            self.report.duplicates += 1;
            reporter.report(Diagnostic::Duplicate { rule: line });
            return;
        }
        self.seen.insert(line.clone());

        if self.whitelist.matches_rule(&line) {
            self.report.whitelisted += 1;
            self.body.push(format!("{}{}", WHITELISTED_PREFIX, line));
            reporter.report(Diagnostic::Whitelisted { rule: line });
            return;
        }

        self.report.emitted += 1;
        self.body.push(line);
    }

    /// 当前统计
    pub fn report(&self) -> Report {
        self.report
    }

    /// 结束合并，生成文档
    pub fn finish(self, header: &Header) -> OutputDocument {
        OutputDocument {
            header: header.render(),
            body: self.body,
            report: self.report,
        }
    }
}
