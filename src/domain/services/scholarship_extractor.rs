// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::WorkerSettings;
use crate::domain::models::scholarship::{
    parse_deadline, AmountType, ExtractedScholarship, NormalizedAmount,
};
use crate::domain::services::content_extractor::NOT_SPECIFIED;
use crate::domain::services::llm_service::{strip_code_fences, InferenceService};
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

const SYSTEM_PROMPT: &str = "You are a scholarship analysis expert. Return only valid JSON.";
const TEMPERATURE: f32 = 0.1;
const UNKNOWN_TITLE: &str = "Unknown";
const DEFAULT_ELIGIBILITY: &str = "Contact institution";

static TITLE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Title:[ \t]*([^\n]*)").expect("valid title regex"));
static AMOUNT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Amount:[ \t]*([^\n]*)").expect("valid amount regex"));
static DEADLINE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Deadline:[ \t]*([^\n]*)").expect("valid deadline regex"));
static URL_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)URL:[ \t]*([^\n]*)").expect("valid url regex"));
static DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)Description:\s*(.*)").expect("valid description regex"));

/// `$` 开头或带千分位的金额
static MONEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\d+(?:,\d{3})*(?:\.\d{2})?|\b\d{1,3}(?:,\d{3})+(?:\.\d{2})?\b")
        .expect("valid money regex")
});
static RENEWABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)renewable|per year|annual|yearly").expect("valid renewal regex"));

/// 结构化提取错误
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Inference failed: {0}")]
    Inference(#[from] anyhow::Error),
    #[error("Invalid JSON answer: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Missing field in answer: {0}")]
    MissingField(&'static str),
    #[error("Confidence score out of range: {0}")]
    InvalidConfidence(String),
}

/// 将金额描述归一化为最小值、最大值和类型
///
/// 没有金额时为 `unknown`，一个金额时为 `fixed`，两个及以上时为 `range`
pub fn normalize_amount(value: &str) -> NormalizedAmount {
    let amounts: Vec<f64> = MONEY
        .find_iter(value)
        .filter_map(|m| m.as_str().replace(['$', ','], "").parse::<f64>().ok())
        .collect();

    let mut normalized = NormalizedAmount {
        is_renewable: RENEWABLE.is_match(value),
        ..Default::default()
    };

    match amounts.as_slice() {
        [] => {}
        [single] => {
            normalized.amount_type = AmountType::Fixed;
            normalized.min = Some(*single);
            normalized.max = Some(*single);
        }
        many => {
            normalized.amount_type = AmountType::Range;
            normalized.min = many.iter().copied().reduce(f64::min);
            normalized.max = many.iter().copied().reduce(f64::max);
        }
    }
    normalized
}

/// 文本块中按行前缀读出的字段
struct BlockFields {
    title: String,
    amount: String,
    deadline: Option<String>,
    url: Option<String>,
}

fn capture(regex: &Regex, block: &str) -> Option<String> {
    regex
        .captures(block)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// 标题行或描述缺失时返回 `None`
fn parse_block(block: &str) -> Option<BlockFields> {
    let title = capture(&TITLE_LINE, block)?;
    let description = capture(&DESCRIPTION, block)?;
    if description.is_empty() {
        return None;
    }
    Some(BlockFields {
        title: if title.is_empty() {
            UNKNOWN_TITLE.to_string()
        } else {
            title
        },
        amount: capture(&AMOUNT_LINE, block)
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
        deadline: capture(&DEADLINE_LINE, block).filter(|d| !d.is_empty()),
        url: capture(&URL_LINE, block).filter(|u| !u.is_empty()),
    })
}

fn build_prompt(block: &str) -> String {
    format!(
        r#"Analyze this scholarship information and provide a structured JSON response:

{}

Return a JSON object with this exact structure:
{{
    "amount_analysis": {{
        "type": "fixed|range|unknown",
        "value": "string",
        "is_renewable": boolean,
        "conditions": []
    }},
    "eligibility_requirements": [],
    "deadline_info": {{
        "date": "YYYY-MM-DD|null",
        "is_recurring": boolean
    }},
    "field_of_study": "string",
    "level_of_study": "string",
    "confidence_score": number
}}"#,
        block
    )
}

fn text_field(answer: &Value, key: &str) -> String {
    answer
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_SPECIFIED)
        .to_string()
}

fn eligibility(answer: &Value) -> String {
    let items: Vec<String> = answer
        .get("eligibility_requirements")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                })
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if items.is_empty() {
        DEFAULT_ELIGIBILITY.to_string()
    } else {
        items.join("\n")
    }
}

fn confidence(answer: &Value) -> Result<f64, ExtractionError> {
    let raw = answer
        .get("confidence_score")
        .ok_or(ExtractionError::MissingField("confidence_score"))?;
    let score: f64 = raw
        .as_f64()
        .or_else(|| raw.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or(ExtractionError::MissingField("confidence_score"))?;
    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(ExtractionError::InvalidConfidence(raw.to_string()));
    }
    Ok(score)
}

/// 结构化提取器
///
/// 先在本地读出文本块的各行字段，再交给推理服务分析，
/// 最后做金额归一化并按置信度过滤。
#[derive(Clone)]
pub struct ScholarshipExtractor {
    inference: Arc<dyn InferenceService>,
    confidence_threshold: f64,
    batch_size: usize,
}

impl ScholarshipExtractor {
    pub fn new(inference: Arc<dyn InferenceService>, settings: &WorkerSettings) -> Self {
        Self {
            inference,
            confidence_threshold: settings.effective_confidence_threshold(),
            batch_size: settings.extraction_batch_size.max(1),
        }
    }

    /// 处理单个文本块
    ///
    /// 缺少标题或描述、或置信度低于阈值时返回 `Ok(None)`；
    /// 推理失败或回答不是合法 JSON 时返回错误。
    pub async fn process_block(
        &self,
        block: &str,
    ) -> Result<Option<ExtractedScholarship>, ExtractionError> {
        let Some(fields) = parse_block(block) else {
            warn!("Skipping scholarship due to missing essential information");
            return Ok(None);
        };

        let raw = self
            .inference
            .complete(SYSTEM_PROMPT, &build_prompt(block), TEMPERATURE)
            .await?;
        let answer: Value = serde_json::from_str(strip_code_fences(&raw))?;
        let confidence_score = confidence(&answer)?;

        if confidence_score < self.confidence_threshold {
            warn!(
                "Skipping low-confidence scholarship: {} ({:.2})",
                fields.title, confidence_score
            );
            return Ok(None);
        }

        let amount_value = answer
            .pointer("/amount_analysis/value")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let deadline = answer
            .pointer("/deadline_info/date")
            .and_then(Value::as_str)
            .and_then(parse_deadline)
            .or_else(|| fields.deadline.as_deref().and_then(parse_deadline));

        info!("Successfully processed scholarship: {}", fields.title);

        Ok(Some(ExtractedScholarship {
            title: fields.title,
            amount: fields.amount,
            normalized_amount: normalize_amount(amount_value),
            deadline,
            field_of_study: text_field(&answer, "field_of_study"),
            level_of_study: text_field(&answer, "level_of_study"),
            eligibility_criteria: eligibility(&answer),
            application_url: fields.url,
            location_of_study: text_field(&answer, "location_of_study"),
            confidence_score,
            ai_summary: answer,
        }))
    }

    /// 顺序处理一组文本块，单个块失败只记录日志
    pub async fn process_chunk(&self, chunk: &[String]) -> Vec<ExtractedScholarship> {
        let mut accepted = Vec::new();
        for block in chunk {
            match self.process_block(block).await {
                Ok(Some(scholarship)) => accepted.push(scholarship),
                Ok(None) => {}
                Err(e) => error!("Error processing scholarship: {}", e),
            }
        }
        accepted
    }

    /// 以固定并发度处理文本块，结果保持输入顺序
    pub async fn batch_process(&self, blocks: &[String]) -> Vec<ExtractedScholarship> {
        let results: Vec<_> = stream::iter(blocks)
            .map(|block| self.process_block(block))
            .buffered(self.batch_size)
            .collect()
            .await;

        results
            .into_iter()
            .filter_map(|result| match result {
                Ok(found) => found,
                Err(e) => {
                    error!("Batch processing error: {}", e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "scholarship_extractor_test.rs"]
mod tests;
