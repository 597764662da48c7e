// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::progress::TaskProgress;
use crate::domain::models::task::{ScrapingTask, TaskStatus};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use uuid::Uuid;

/// 单个 URL 的录入结果
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", content = "task", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// 新建任务
    Added(ScrapingTask),
    /// 任务已存在且未失败，未做任何修改
    AlreadyExists(ScrapingTask),
    /// 已失败的任务被重置为 pending
    Reset(ScrapingTask),
}

impl IngestOutcome {
    pub fn task(&self) -> &ScrapingTask {
        match self {
            IngestOutcome::Added(task)
            | IngestOutcome::AlreadyExists(task)
            | IngestOutcome::Reset(task) => task,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            IngestOutcome::Added(_) => "Task added successfully",
            IngestOutcome::AlreadyExists(_) => "Task already exists",
            IngestOutcome::Reset(_) => "Task reset for retry",
        }
    }
}

/// 批量录入中单个 URL 的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkItemStatus {
    Added,
    Skipped,
    Reset,
    Invalid,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkIngestItem {
    pub url: String,
    pub status: BulkItemStatus,
    pub task_id: Option<Uuid>,
    /// URL 校验失败的原因
    pub error: Option<String>,
}

/// 批量录入报告
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkIngestReport {
    pub added: usize,
    pub skipped: usize,
    pub reset: usize,
    pub invalid: usize,
    pub total: usize,
    pub items: Vec<BulkIngestItem>,
}

impl BulkIngestReport {
    pub(crate) fn record(&mut self, url: &str, outcome: &IngestOutcome) {
        let status = match outcome {
            IngestOutcome::Added(_) => {
                self.added += 1;
                BulkItemStatus::Added
            }
            IngestOutcome::AlreadyExists(_) => {
                self.skipped += 1;
                BulkItemStatus::Skipped
            }
            IngestOutcome::Reset(_) => {
                self.reset += 1;
                BulkItemStatus::Reset
            }
        };
        self.items.push(BulkIngestItem {
            url: url.to_string(),
            status,
            task_id: Some(outcome.task().id),
            error: None,
        });
    }

    pub(crate) fn record_invalid(&mut self, url: &str, error: String) {
        self.invalid += 1;
        self.items.push(BulkIngestItem {
            url: url.to_string(),
            status: BulkItemStatus::Invalid,
            task_id: None,
            error: Some(error),
        });
    }
}

/// 任务及其最近一次运行的进度
#[derive(Debug, Clone, Serialize)]
pub struct TaskProgressView {
    pub task_id: Uuid,
    pub url: String,
    pub status: TaskStatus,
    pub total_links: i32,
    pub processed_links: i32,
    pub scholarships_found: i32,
    /// 已处理链接百分比，链接总数为 0 时为 0
    pub percentage: f64,
    /// 运行耗时（秒）
    pub duration_secs: Option<f64>,
    pub start_time: Option<DateTime<FixedOffset>>,
    pub end_time: Option<DateTime<FixedOffset>>,
    pub error_message: Option<String>,
    pub success_count: i32,
    pub fail_count: i32,
    pub created_at: DateTime<FixedOffset>,
    pub last_run: Option<DateTime<FixedOffset>>,
    pub next_run: Option<DateTime<FixedOffset>>,
}

impl TaskProgressView {
    /// 没有进度记录时计数均为 0
    pub fn new(task: &ScrapingTask, progress: Option<&TaskProgress>) -> Self {
        Self {
            task_id: task.id,
            url: task.url.clone(),
            status: task.status,
            total_links: progress.map_or(0, |p| p.total_links),
            processed_links: progress.map_or(0, |p| p.processed_links),
            scholarships_found: progress.map_or(0, |p| p.scholarships_found),
            percentage: progress.map_or(0.0, TaskProgress::percentage),
            duration_secs: progress.and_then(TaskProgress::duration_secs),
            start_time: progress.and_then(|p| p.start_time),
            end_time: progress.and_then(|p| p.end_time),
            error_message: task
                .error_message
                .clone()
                .or_else(|| progress.and_then(|p| p.error_message.clone())),
            success_count: task.success_count,
            fail_count: task.fail_count,
            created_at: task.created_at,
            last_run: task.last_run,
            next_run: task.next_run,
        }
    }
}

/// 分页结果
#[derive(Debug, Clone, Serialize)]
pub struct TaskPage {
    pub total: u64,
    pub items: Vec<TaskProgressView>,
}

/// 任务状态汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusSummary {
    pub total_tasks: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub failed: u64,
    /// 成功率（百分比）：completed / (completed + failed)，按任务当前状态计算
    pub success_rate: f64,
}
