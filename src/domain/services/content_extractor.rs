// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::url_utils;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

/// 容器 class 中出现任一关键词即视为候选
const CONTAINER_KEYWORDS: [&str; 6] = [
    "scholarship",
    "award",
    "grant",
    "funding",
    "bursary",
    "opportunity",
];

/// 标题回退时使用的关键词
const HEADING_KEYWORDS: [&str; 5] = ["scholarship", "award", "grant", "funding", "bursary"];

const DETAIL_LINK_KEYWORDS: [&str; 3] = ["apply", "learn more", "details"];

/// 生成全文时整体跳过的元素
const SKIPPED_ELEMENTS: [&str; 5] = ["script", "style", "nav", "header", "footer"];

pub const NOT_SPECIFIED: &str = "Not specified";

const CONTAINER_TAGS: [&str; 3] = ["div", "article", "section"];

static CONTAINER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div, article, section").expect("valid selector"));
static HEADING_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4").expect("valid selector"));
static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));

static AMOUNT_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\$[\d,]+(?:\.\d{2})?",
        r"(?i)(?:award|value|amount).*?\$[\d,]+(?:\.\d{2})?",
        r"(?i)\$[\d,]+(?:\.\d{2})?.*?(?:award|scholarship|grant)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid amount pattern"))
    .collect()
});

static DEADLINE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(?:deadline|due date|closes|applications close)\b.*?\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b",
        r"(?i)\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b.*?\b(?:deadline|due date)\b",
        r"(?i)\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},?\s+\d{4}\b",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid deadline pattern"))
    .collect()
});

/// 页面解析结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedPage {
    pub domain: String,
    pub url: String,
    /// 候选奖学金文本块，按文档顺序
    pub text_blocks: Vec<String>,
    /// 去掉脚本、样式和导航后的全文，每行一段且没有空行
    pub full_text: String,
    /// 解析整体失败时的错误信息
    pub error: Option<String>,
}

/// 按固定格式组装文本块，结构化提取器按同样的行前缀读取
pub fn format_block(title: &str, amount: &str, deadline: &str, url: &str, description: &str) -> String {
    format!(
        "Title: {}\nAmount: {}\nDeadline: {}\nURL: {}\nDescription: {}",
        title, amount, deadline, url, description
    )
}

/// 内容提取器
///
/// 从页面 HTML 中找出可能描述奖学金的区域，并为每个区域生成一个文本块。
/// 优先使用 class 名命中关键词的 `div/article/section`，
/// 一个都没有时退回到标题加后续兄弟元素的分组方式。
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentExtractor;

struct Candidate {
    title: String,
    content: String,
    detail_url: Option<String>,
}

impl ContentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 解析页面，不会因为页面内容而 panic 或返回错误
    pub fn parse(&self, html: &str, page_url: &str) -> ParsedPage {
        let base = match Url::parse(page_url) {
            Ok(base) => base,
            Err(e) => {
                warn!("Cannot parse page {}: {}", page_url, e);
                return ParsedPage {
                    url: page_url.to_string(),
                    error: Some(format!("invalid page url {}: {}", page_url, e)),
                    ..Default::default()
                };
            }
        };

        let document = Html::parse_document(html);
        let mut candidates = class_candidates(&document, &base);
        if candidates.is_empty() {
            candidates = heading_candidates(&document);
        }

        let text_blocks: Vec<String> = candidates
            .into_iter()
            .filter(|c| !c.title.is_empty())
            .map(|c| {
                let detail_url = c.detail_url.unwrap_or_else(|| page_url.to_string());
                format_block(
                    &c.title,
                    &first_match(&AMOUNT_PATTERNS, &c.content),
                    &first_match(&DEADLINE_PATTERNS, &c.content),
                    &detail_url,
                    &c.content,
                )
            })
            .collect();

        info!(
            "Extracted {} candidate blocks from {}",
            text_blocks.len(),
            page_url
        );

        ParsedPage {
            domain: base.host_str().unwrap_or_default().to_string(),
            url: page_url.to_string(),
            text_blocks,
            full_text: full_text(&document),
            error: None,
        }
    }
}

fn first_match(patterns: &[Regex], content: &str) -> String {
    patterns
        .iter()
        .find_map(|p| p.find(content))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let haystack = haystack.to_lowercase();
    needles.iter().any(|n| haystack.contains(n))
}

/// 把一组文本片段合并为单行，连续空白压缩为一个空格
fn squash<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn element_text(element: &ElementRef) -> String {
    squash(element.text())
}

fn is_keyword_container(el: &ElementRef) -> bool {
    CONTAINER_TAGS.contains(&el.value().name())
        && el.value().classes().any(|c| contains_any(c, &CONTAINER_KEYWORDS))
}

fn has_heading(el: &ElementRef) -> bool {
    el.select(&HEADING_SELECTOR).next().is_some()
}

/// 内部有自带标题的关键词容器时，外层容器由内层代表
fn has_titled_inner_container(container: &ElementRef) -> bool {
    container
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|inner| is_keyword_container(&inner) && has_heading(&inner))
}

fn class_candidates(document: &Html, base: &Url) -> Vec<Candidate> {
    document
        .select(&CONTAINER_SELECTOR)
        .filter(is_keyword_container)
        .filter(|el| !has_titled_inner_container(el))
        .map(|container| {
            let title = container
                .select(&HEADING_SELECTOR)
                .next()
                .map(|h| element_text(&h))
                .unwrap_or_default();

            let detail_url = container
                .select(&ANCHOR_SELECTOR)
                .filter(|a| contains_any(&element_text(a), &DETAIL_LINK_KEYWORDS))
                .find_map(|a| {
                    let href = a.value().attr("href")?;
                    url_utils::resolve_url(base, href).ok().map(String::from)
                });

            Candidate {
                title,
                content: element_text(&container),
                detail_url,
            }
        })
        .collect()
}

/// `h1`..`h6` 的级别，数字越小级别越高
fn heading_rank(name: &str) -> Option<u8> {
    match name {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

fn heading_candidates(document: &Html) -> Vec<Candidate> {
    document
        .select(&HEADING_SELECTOR)
        .filter(|h| contains_any(&element_text(h), &HEADING_KEYWORDS))
        .map(|heading| {
            let rank = heading_rank(heading.value().name()).unwrap_or(u8::MAX);
            let section: Vec<String> = heading
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .take_while(|el| heading_rank(el.value().name()).map_or(true, |r| r > rank))
                .map(|el| element_text(&el))
                .filter(|text| !text.is_empty())
                .collect();

            debug!(
                "Heading candidate with {} following elements",
                section.len()
            );

            Candidate {
                title: element_text(&heading),
                content: section.join(" "),
                detail_url: None,
            }
        })
        .collect()
}

fn is_skipped(node: &Node) -> bool {
    node.as_element()
        .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
}

fn full_text(document: &Html) -> String {
    document
        .root_element()
        .descendants()
        .filter(|node| !node.ancestors().any(|a| is_skipped(a.value())))
        .filter_map(|node| node.value().as_text().map(|t| t.to_string()))
        .flat_map(|text| {
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "content_extractor_test.rs"]
mod tests;
