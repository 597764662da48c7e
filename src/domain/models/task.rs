// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// 抓取任务实体
///
/// 表示一个种子页面。任务按计划被调度器拾取，由页面流水线处理，
/// 成功后按重新抓取间隔再次进入调度。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingTask {
    /// 任务唯一标识符
    pub id: Uuid,
    /// 种子页面 URL（全局唯一）
    pub url: String,
    /// 任务状态
    pub status: TaskStatus,
    /// 最近一次成功运行的时间
    pub last_run: Option<DateTime<FixedOffset>>,
    /// 下一次可被调度的时间，为空表示立即可调度
    pub next_run: Option<DateTime<FixedOffset>>,
    /// 最近一次失败的错误信息
    pub error_message: Option<String>,
    /// 成功次数
    pub success_count: i32,
    /// 失败次数
    pub fail_count: i32,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// 任务状态枚举
///
/// Pending → InProgress → Completed/Failed，
/// Failed 与 Completed 可通过重试回到 Pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// 等待调度
    #[default]
    Pending,
    /// 正在处理
    InProgress,
    /// 已完成
    Completed,
    /// 已失败
    Failed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Failed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "failed" => Ok(TaskStatus::Failed),
            other => Err(DomainError::ValidationError(format!(
                "unknown task status: {}",
                other
            ))),
        }
    }
}

/// 领域错误类型
#[derive(Error, Debug, PartialEq)]
pub enum DomainError {
    /// 无效的状态转换
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: TaskStatus, to: TaskStatus },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().into()
}

impl ScrapingTask {
    /// 创建一个新的待处理任务，立即可调度
    pub fn new(url: String) -> Self {
        let now = now();
        Self {
            id: Uuid::new_v4(),
            url,
            status: TaskStatus::Pending,
            last_run: None,
            next_run: Some(now),
            error_message: None,
            success_count: 0,
            fail_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// 判断任务在给定时间点是否可被调度
    ///
    /// 只有 Pending 任务会被调度，Failed 任务必须先 `retry` 或重新提交
    pub fn is_eligible(&self, at: DateTime<FixedOffset>) -> bool {
        self.status == TaskStatus::Pending && self.next_run.map_or(true, |next| next <= at)
    }

    /// 开始处理
    pub fn start(mut self) -> Result<Self, DomainError> {
        match self.status {
            TaskStatus::Pending => {
                self.status = TaskStatus::InProgress;
                self.updated_at = now();
                Ok(self)
            }
            from => Err(DomainError::InvalidStateTransition {
                from,
                to: TaskStatus::InProgress,
            }),
        }
    }

    /// 处理成功
    ///
    /// 记录运行时间并按 `rescrape_after` 安排下一次抓取
    pub fn complete(mut self, rescrape_after: Duration) -> Result<Self, DomainError> {
        match self.status {
            TaskStatus::InProgress => {
                let now = now();
                self.status = TaskStatus::Completed;
                self.last_run = Some(now);
                self.next_run = Some(now + rescrape_after);
                self.success_count += 1;
                self.error_message = None;
                self.updated_at = now;
                Ok(self)
            }
            from => Err(DomainError::InvalidStateTransition {
                from,
                to: TaskStatus::Completed,
            }),
        }
    }

    /// 处理失败
    ///
    /// `next_run` 保持不变，任务不再被自动调度
    pub fn fail(mut self, error: impl Into<String>) -> Result<Self, DomainError> {
        match self.status {
            TaskStatus::InProgress => {
                self.status = TaskStatus::Failed;
                self.error_message = Some(error.into());
                self.fail_count += 1;
                self.updated_at = now();
                Ok(self)
            }
            from => Err(DomainError::InvalidStateTransition {
                from,
                to: TaskStatus::Failed,
            }),
        }
    }

    /// 手动重试：仅允许 Failed 或 Completed 的任务
    pub fn retry(mut self) -> Result<Self, DomainError> {
        match self.status {
            TaskStatus::Failed | TaskStatus::Completed => {
                let now = now();
                self.status = TaskStatus::Pending;
                self.error_message = None;
                self.next_run = Some(now);
                self.updated_at = now;
                Ok(self)
            }
            from => Err(DomainError::InvalidStateTransition {
                from,
                to: TaskStatus::Pending,
            }),
        }
    }

    /// 重新提交已失败的 URL 时重置任务，失败计数清零
    pub fn reset_failed(self) -> Result<Self, DomainError> {
        if self.status != TaskStatus::Failed {
            return Err(DomainError::InvalidStateTransition {
                from: self.status,
                to: TaskStatus::Pending,
            });
        }
        let mut task = self.retry()?;
        task.fail_count = 0;
        Ok(task)
    }
}
