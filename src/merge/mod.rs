//! # 合并模块
//!
//! 累积所有规则源的翻译结果：去重、白名单过滤、统计，并生成最终文档。

pub mod document;
pub mod merger;
pub mod whitelist;

pub use document::{Header, OutputDocument, Report};
pub use merger::Merger;
pub use whitelist::Whitelist;
