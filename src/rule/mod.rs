//! # 规则转换模块
//!
//! 此模块负责：
//! 1. 将 QuantumultX 风格的规则行分类为有限的几种语法
//! 2. 将分类结果翻译为 AdGuard / hosts 格式
//! 3. 校验正则形式的规则

pub mod classifier;
pub mod pattern;
pub mod translator;

pub use classifier::{classify, ClassifiedRule, ClassifyMode, UnrecognizedReason};
pub use translator::{SuffixMarker, Translator};
