// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 链接分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LinkClassification {
    Scholarship,
    #[default]
    Irrelevant,
}

impl fmt::Display for LinkClassification {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LinkClassification::Scholarship => write!(f, "scholarship"),
            LinkClassification::Irrelevant => write!(f, "irrelevant"),
        }
    }
}

impl FromStr for LinkClassification {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scholarship" => Ok(LinkClassification::Scholarship),
            "irrelevant" => Ok(LinkClassification::Irrelevant),
            _ => Err(()),
        }
    }
}

/// 种子页面上发现并分类过的链接，写入后不再修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedLink {
    pub id: Uuid,
    pub task_id: Uuid,
    pub text: String,
    /// 绝对 URL
    pub url: String,
    pub classification: LinkClassification,
    pub found_at: DateTime<FixedOffset>,
}

impl ScrapedLink {
    pub fn new(task_id: Uuid, text: String, url: String, classification: LinkClassification) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            text,
            url,
            classification,
            found_at: Utc::now().into(),
        }
    }
}
