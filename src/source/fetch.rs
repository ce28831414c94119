//! # 远程规则拉取
//!
//! 使用 reqwest 阻塞客户端按顺序拉取远程规则。
//!
//! ## 注意
//! - 非 2xx 状态码视为失败
//! - 响应体优先按 UTF-8 解码（去掉 BOM），失败时按 Content-Type 声明的编码
//!   或 GB18030 回退解码

use std::time::Duration;

use anyhow::{Context, Result};
use encoding_rs::{Encoding, GB18030, UTF_8};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;

use crate::error::ConvertError;

/// 请求时携带的客户端标识
pub const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION"),
    " (QuantumultX to AdGuard rule converter)"
);

/// 最多跟随的重定向次数
const MAX_REDIRECTS: usize = 10;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 远程文本拉取接口
///
/// 流水线只依赖这个 trait，测试时可以替换为内存实现。
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<String, ConvertError>;
}

// ========================================
// HTTP 实现
// ========================================

/// 基于 reqwest 的拉取器
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// 创建带超时的客户端
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, ConvertError> {
        let fetch_err = |reason: String| ConvertError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP {}", status)));
        }

        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type)
            .map(str::to_string);

        let body = response.bytes().map_err(|e| fetch_err(e.to_string()))?;

        Ok(decode_body(&body, charset.as_deref()))
    }
}

// ========================================
// 解码
// ========================================

/// 从 Content-Type 中取出 charset 参数
///
/// `text/plain; charset="gbk"` → `gbk`
pub fn charset_from_content_type(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"'))
        } else {
            None
        }
    })
}

/// 把原始字节解码为文本
///
/// 1. 去掉 UTF-8 BOM
/// 2. 合法 UTF-8 直接返回
/// 3. 否则按 charset 提示解码；没有提示（或提示就是 UTF-8）时回退到 GB18030
pub fn decode_body(bytes: &[u8], charset: Option<&str>) -> String {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let encoding = charset
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .filter(|enc| *enc != UTF_8)
        .unwrap_or(GB18030);

    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::debug!("lossy decode with {}", encoding.name());
    }
    decoded.into_owned()
}

// ========================================
// 测试模块
// ========================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_with_bom() {
        let bytes = b"\xEF\xBB\xBFhost, a.com, reject\n";
        assert_eq!(decode_body(bytes, None), "host, a.com, reject\n");
    }

    #[test]
    fn test_decode_gb18030_fallback() {
        let (encoded, _, _) = GB18030.encode("# 广告规则\nhost, a.com, reject");
        assert!(std::str::from_utf8(&encoded).is_err());
        assert_eq!(
            decode_body(&encoded, None),
            "# 广告规则\nhost, a.com, reject"
        );
    }

    #[test]
    fn test_decode_with_charset_hint() {
        let (encoded, _, _) = encoding_rs::SHIFT_JIS.encode("# 広告");
        assert_eq!(decode_body(&encoded, Some("shift_jis")), "# 広告");
    }

    #[test]
    fn test_charset_from_content_type() {
        assert_eq!(
            charset_from_content_type("text/plain; charset=utf-8"),
            Some("utf-8")
        );
        assert_eq!(
            charset_from_content_type("text/plain;Charset=\"GBK\""),
            Some("GBK")
        );
        assert_eq!(charset_from_content_type("text/plain"), None);
    }

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT.starts_with("qx2adguard/"));
    }
}
