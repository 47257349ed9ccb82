//! 短码生成
//!
//! 短码 = MD5(url) 的小写十六进制前缀。相同 URL 永远得到相同短码，
//! 与历史部署生成的短码逐字节兼容。

use md5::{Digest, Md5};

/// 默认短码长度
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// MD5 十六进制摘要的长度，也是短码长度上限
pub const MAX_CODE_LENGTH: usize = 32;

/// Derive the short code for `url`.
///
/// Different URLs may share a prefix; no collision detection happens here,
/// the later save simply overwrites the earlier mapping.
pub fn generate_short_code(url: &str, length: usize) -> String {
    let digest = Md5::digest(url.as_bytes());
    let mut hex = format!("{:x}", digest);
    hex.truncate(length.min(MAX_CODE_LENGTH));
    hex
}

/// 检查路径片段是否可能是合法短码（1-32 位 ASCII 字母数字）
///
/// 用于在访问存储前过滤掉 `favicon.ico` 之类的请求。
#[inline]
pub fn is_valid_short_code(code: &str) -> bool {
    !code.is_empty()
        && code.len() <= MAX_CODE_LENGTH
        && code.bytes().all(|b| b.is_ascii_alphanumeric())
}
