//! # 规则源模块
//!
//! 负责读取规则源列表、拉取远程规则、读取本地规则文件，并展开为原始行。

pub mod config;
pub mod fetch;
pub mod loader;

pub use config::{load_source_list, SourceRef};
pub use fetch::{Fetcher, HttpFetcher};
pub use loader::{Loader, RawLine};
