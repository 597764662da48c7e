// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::task::TaskStatus;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 任务进度
///
/// 与任务一对一。`processed_links` 只在一个链接的处理步骤全部结束后前进，
/// 并且一旦 `total_links` 已知就不会超过它。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskProgress {
    pub id: Uuid,
    pub task_id: Uuid,
    pub status: TaskStatus,
    pub total_links: i32,
    pub processed_links: i32,
    pub scholarships_found: i32,
    pub start_time: Option<DateTime<FixedOffset>>,
    pub end_time: Option<DateTime<FixedOffset>>,
    /// 处理耗时（秒），运行结束时写入
    pub processing_duration: Option<f64>,
    pub error_message: Option<String>,
    pub last_update: DateTime<FixedOffset>,
}

impl TaskProgress {
    /// 新任务的初始进度记录
    pub fn pending(task_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            status: TaskStatus::Pending,
            total_links: 0,
            processed_links: 0,
            scholarships_found: 0,
            start_time: None,
            end_time: None,
            processing_duration: None,
            error_message: None,
            last_update: Utc::now().into(),
        }
    }

    /// 完成百分比，链接总数未知时为 0
    pub fn percentage(&self) -> f64 {
        if self.total_links > 0 {
            f64::from(self.processed_links) / f64::from(self.total_links) * 100.0
        } else {
            0.0
        }
    }

    /// 耗时（秒）：已结束的运行取记录值，运行中的按当前时间计算
    pub fn duration_secs(&self) -> Option<f64> {
        if let Some(duration) = self.processing_duration {
            return Some(duration);
        }
        let start = self.start_time?;
        let end = self.end_time.unwrap_or_else(|| Utc::now().into());
        Some((end - start).num_milliseconds() as f64 / 1000.0)
    }
}
