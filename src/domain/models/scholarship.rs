// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 金额类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AmountType {
    Fixed,
    Range,
    #[default]
    Unknown,
}

impl fmt::Display for AmountType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AmountType::Fixed => write!(f, "fixed"),
            AmountType::Range => write!(f, "range"),
            AmountType::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for AmountType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(AmountType::Fixed),
            "range" => Ok(AmountType::Range),
            "unknown" => Ok(AmountType::Unknown),
            _ => Err(()),
        }
    }
}

/// 归一化后的金额
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedAmount {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub amount_type: AmountType,
    pub is_renewable: bool,
}

/// 推理服务结构化后的奖学金，尚未关联任务
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedScholarship {
    pub title: String,
    /// 原始金额文本
    pub amount: String,
    pub normalized_amount: NormalizedAmount,
    pub deadline: Option<NaiveDate>,
    pub field_of_study: String,
    pub level_of_study: String,
    pub eligibility_criteria: String,
    /// 文本块中的详情链接
    pub application_url: Option<String>,
    pub location_of_study: String,
    /// 推理服务返回的完整 JSON
    pub ai_summary: serde_json::Value,
    pub confidence_score: f64,
}

/// 持久化的奖学金记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scholarship {
    pub id: Uuid,
    pub task_id: Uuid,
    pub title: String,
    pub amount: String,
    pub amount_normalized_min: Option<f64>,
    pub amount_normalized_max: Option<f64>,
    pub amount_type: AmountType,
    pub is_renewable: bool,
    pub deadline: Option<NaiveDate>,
    pub field_of_study: String,
    pub level_of_study: String,
    pub eligibility_criteria: String,
    pub application_url: String,
    pub source_url: String,
    pub location_of_study: String,
    pub ai_summary: serde_json::Value,
    pub confidence_score: f64,
    pub created_at: DateTime<FixedOffset>,
    pub last_updated: DateTime<FixedOffset>,
}

impl Scholarship {
    /// 将结构化结果绑定到任务和来源页面
    ///
    /// 没有详情链接时使用来源页面作为申请地址
    pub fn from_extracted(task_id: Uuid, source_url: &str, extracted: ExtractedScholarship) -> Self {
        let now: DateTime<FixedOffset> = Utc::now().into();
        Self {
            id: Uuid::new_v4(),
            task_id,
            title: extracted.title,
            amount: extracted.amount,
            amount_normalized_min: extracted.normalized_amount.min,
            amount_normalized_max: extracted.normalized_amount.max,
            amount_type: extracted.normalized_amount.amount_type,
            is_renewable: extracted.normalized_amount.is_renewable,
            deadline: extracted.deadline,
            field_of_study: extracted.field_of_study,
            level_of_study: extracted.level_of_study,
            eligibility_criteria: extracted.eligibility_criteria,
            application_url: extracted
                .application_url
                .unwrap_or_else(|| source_url.to_string()),
            source_url: source_url.to_string(),
            location_of_study: extracted.location_of_study,
            ai_summary: extracted.ai_summary,
            confidence_score: extracted.confidence_score,
            created_at: now,
            last_updated: now,
        }
    }
}

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%b %d, %Y",
    "%B %d, %Y",
];

static DATE_IN_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:\d{4}[-/]\d{1,2}[-/]\d{1,2}|\d{1,2}[-/]\d{1,2}[-/]\d{4}|(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2},?\s+\d{4})\b",
    )
    .expect("valid date regex")
});

fn parse_exact(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// 解析截止日期
///
/// 先按已知格式整体解析，失败时在文本中查找第一个日期片段再解析。
/// 无法识别时返回 `None`。
pub fn parse_deadline(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(date) = parse_exact(value) {
        return Some(date);
    }
    let fragment = DATE_IN_TEXT.find(value)?.as_str().replace('.', "");
    let normalized = if fragment.contains(',') || fragment.contains(['-', '/']) {
        fragment
    } else {
        // "March 15 2025" -> "March 15, 2025"
        match fragment.rsplit_once(' ') {
            Some((head, year)) => format!("{}, {}", head.trim_end(), year),
            None => fragment,
        }
    };
    parse_exact(&normalized)
}
