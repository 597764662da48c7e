// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use url::{ParseError, Url};

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:[-\w.]|%[\da-fA-F]{2})+[^\s,;]*").expect("valid url regex")
});

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 以字符串形式解析相对链接，失败时返回 `None`
pub fn absolutize(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    resolve_url(&base, href.trim()).ok().map(String::from)
}

/// 校验任务 URL：必须可解析且带有 http(s) 协议和主机名
pub fn validate_task_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("{}: {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("{}: unsupported scheme {}", raw, other)),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(format!("{}: missing host", raw));
    }
    Ok(url)
}

/// 从上传的 CSV 或纯文本内容中提取去重后的 URL 列表
pub fn extract_urls(content: &str) -> Vec<String> {
    let found: BTreeSet<String> = URL_PATTERN
        .find_iter(content)
        .map(|m| m.as_str().trim_end_matches(['"', '\'', ')']).to_string())
        .collect();
    found.into_iter().collect()
}
