// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scholarship::Scholarship;
use serde::Serialize;

/// CSV 导出的表头，顺序与 [`ScholarshipCsvRow`] 字段一致
pub const CSV_HEADERS: [&str; 10] = [
    "Title",
    "Amount",
    "Deadline",
    "Field of Study",
    "Level of Study",
    "Eligibility Criteria",
    "Application URL",
    "Source URL",
    "Confidence Score",
    "Last Updated",
];

/// CSV 导出的一行
#[derive(Debug, Clone, Serialize)]
pub struct ScholarshipCsvRow {
    pub title: String,
    pub amount: String,
    /// ISO 日期，未知时为空
    pub deadline: String,
    pub field_of_study: String,
    pub level_of_study: String,
    pub eligibility_criteria: String,
    pub application_url: String,
    pub source_url: String,
    pub confidence_score: f64,
    pub last_updated: String,
}

impl From<&Scholarship> for ScholarshipCsvRow {
    fn from(s: &Scholarship) -> Self {
        Self {
            title: s.title.clone(),
            amount: s.amount.clone(),
            deadline: s
                .deadline
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            field_of_study: s.field_of_study.clone(),
            level_of_study: s.level_of_study.clone(),
            eligibility_criteria: s.eligibility_criteria.clone(),
            application_url: s.application_url.clone(),
            source_url: s.source_url.clone(),
            confidence_score: s.confidence_score,
            last_updated: s.last_updated.to_rfc3339(),
        }
    }
}
