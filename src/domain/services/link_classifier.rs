// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scraped_link::LinkClassification;
use crate::domain::services::llm_service::InferenceService;
use std::sync::Arc;
use tracing::{debug, error, warn};

const SYSTEM_PROMPT: &str = "You are a link classification expert. Return only the category name.";
const TEMPERATURE: f32 = 0.1;

/// 链接分类器
///
/// 询问推理服务链接是否指向奖学金信息。推理失败或回答无法识别时
/// 一律返回 [`LinkClassification::Irrelevant`]，不会向上传播错误。
#[derive(Clone)]
pub struct LinkClassifier {
    inference: Arc<dyn InferenceService>,
}

impl LinkClassifier {
    pub fn new(inference: Arc<dyn InferenceService>) -> Self {
        Self { inference }
    }

    pub async fn classify(&self, link_text: &str, link_url: &str) -> LinkClassification {
        let prompt = format!(
            "Given the following link text and URL, classify the link into one of these categories: scholarship, irrelevant.\n\n\
             Link Text: {}\nURL: {}\n\n\
             Return only the category name, either \"scholarship\" or \"irrelevant\".",
            link_text, link_url
        );

        let answer = match self
            .inference
            .complete(SYSTEM_PROMPT, &prompt, TEMPERATURE)
            .await
        {
            Ok(answer) => answer,
            Err(e) => {
                error!("Link classification failed for {}: {}", link_url, e);
                return LinkClassification::Irrelevant;
            }
        };

        let normalized = answer.trim().to_lowercase();
        debug!("Classifier answer for {}: {}", link_url, normalized);
        match normalized.parse() {
            Ok(classification) => classification,
            Err(_) => {
                warn!("Invalid link classification response: {}", normalized);
                LinkClassification::Irrelevant
            }
        }
    }
}
