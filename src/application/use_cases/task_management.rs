// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{
    application::dto::task_dto::{
        BulkIngestReport, IngestOutcome, StatusSummary, TaskPage, TaskProgressView,
    },
    domain::{
        models::{
            progress::TaskProgress,
            task::{ScrapingTask, TaskStatus},
        },
        repositories::{
            progress_repository::ProgressRepository,
            task_repository::{RepositoryError, TaskRepository},
        },
    },
    utils::{errors::ServiceError, url_utils},
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// 搜索关键字的最小长度
const MIN_QUERY_LEN: usize = 3;
const SEARCH_LIMIT: u64 = 1000;
const MAX_PAGE_SIZE: u64 = 1000;

fn not_found(id: Uuid) -> impl FnOnce(RepositoryError) -> ServiceError {
    move |e| match e {
        RepositoryError::NotFound => ServiceError::NotFound(format!("task {}", id)),
        other => other.into(),
    }
}

/// 任务管理用例
///
/// 负责任务的录入、重试、删除和状态查询
pub struct TaskService<TR, PR> {
    task_repo: Arc<TR>,
    progress_repo: Arc<PR>,
}

impl<TR, PR> TaskService<TR, PR>
where
    TR: TaskRepository + 'static,
    PR: ProgressRepository + 'static,
{
    pub fn new(task_repo: Arc<TR>, progress_repo: Arc<PR>) -> Self {
        Self {
            task_repo,
            progress_repo,
        }
    }

    /// 录入一个种子 URL
    ///
    /// - 不存在：新建 pending 任务和 pending 进度记录
    /// - 已存在且失败：重置为 pending，失败计数清零
    /// - 其他状态：原样返回，不创建新记录
    pub async fn create_task(&self, raw_url: &str) -> Result<IngestOutcome, ServiceError> {
        let url = url_utils::validate_task_url(raw_url)
            .map_err(ServiceError::InvalidUrl)?
            .to_string();

        match self.task_repo.find_by_url(&url).await? {
            Some(existing) if existing.status == TaskStatus::Failed => {
                let reset = existing
                    .reset_failed()
                    .map_err(|e| ServiceError::InvalidState(e.to_string()))?;
                let saved = self.task_repo.update(&reset).await?;
                info!("Task reset for retry: {}", saved.url);
                Ok(IngestOutcome::Reset(saved))
            }
            Some(existing) => Ok(IngestOutcome::AlreadyExists(existing)),
            None => {
                let task = self.task_repo.create(&ScrapingTask::new(url)).await?;
                self.progress_repo
                    .upsert(&TaskProgress::pending(task.id))
                    .await?;
                info!("Task added: {}", task.url);
                Ok(IngestOutcome::Added(task))
            }
        }
    }

    /// 批量录入，逐个 URL 处理并提交
    ///
    /// 非法 URL 记入报告而不中断整批；仓库错误直接返回
    pub async fn create_tasks_bulk(&self, urls: &[String]) -> Result<BulkIngestReport, ServiceError> {
        let mut report = BulkIngestReport {
            total: urls.len(),
            ..Default::default()
        };

        for url in urls {
            match self.create_task(url).await {
                Ok(outcome) => report.record(url, &outcome),
                Err(ServiceError::InvalidUrl(reason)) => {
                    warn!("Skipping invalid URL {}", reason);
                    report.record_invalid(url, reason);
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Bulk ingest finished: added={}, skipped={}, reset={}, invalid={}",
            report.added, report.skipped, report.reset, report.invalid
        );
        Ok(report)
    }

    /// 从上传的 CSV 或纯文本内容中提取 URL 并批量录入
    pub async fn create_tasks_from_text(&self, content: &str) -> Result<BulkIngestReport, ServiceError> {
        let urls = url_utils::extract_urls(content);
        if urls.is_empty() {
            return Err(ServiceError::Validation(
                "No valid URLs found in file".to_string(),
            ));
        }
        self.create_tasks_bulk(&urls).await
    }

    /// 删除任务及其进度、链接和奖学金
    pub async fn delete_task(&self, id: Uuid) -> Result<(), ServiceError> {
        self.task_repo.delete(id).await.map_err(not_found(id))?;
        info!("Task {} and related data deleted", id);
        Ok(())
    }

    /// 删除全部任务，返回删除数量
    pub async fn delete_all(&self) -> Result<u64, ServiceError> {
        let deleted = self.task_repo.delete_all().await?;
        info!("All records deleted: {} tasks", deleted);
        Ok(deleted)
    }

    /// 重试已失败或已完成的任务，并为其写入新的 pending 进度记录
    pub async fn retry_task(&self, id: Uuid) -> Result<ScrapingTask, ServiceError> {
        let task = self
            .task_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("task {}", id)))?;

        let pending = task.retry().map_err(|_| {
            ServiceError::InvalidState("Task must be failed or completed to retry".to_string())
        })?;

        let saved = self.task_repo.update(&pending).await.map_err(not_found(id))?;
        self.progress_repo
            .upsert(&TaskProgress::pending(saved.id))
            .await?;
        info!("Task {} scheduled for retry", id);
        Ok(saved)
    }

    /// 把 in_progress 的任务放回 pending
    ///
    /// 用于以 Abandon 方式关闭后恢复遗留任务
    pub async fn reset_stale_tasks(&self) -> Result<u64, ServiceError> {
        let count = self.task_repo.reset_in_progress().await?;
        if count > 0 {
            warn!("Reset {} stale in-progress tasks", count);
        }
        Ok(count)
    }

    /// 列出任务及其进度，按创建时间倒序
    pub async fn list_tasks(&self, skip: u64, limit: u64) -> Result<Vec<TaskProgressView>, ServiceError> {
        let tasks = self
            .task_repo
            .list(skip, limit.clamp(1, MAX_PAGE_SIZE))
            .await?;
        self.with_progress(&tasks).await
    }

    pub async fn task_progress(&self, id: Uuid) -> Result<TaskProgressView, ServiceError> {
        let task = self
            .task_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("task {}", id)))?;
        let progress = self
            .progress_repo
            .find_by_task(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("progress for task {}", id)))?;
        Ok(TaskProgressView::new(&task, Some(&progress)))
    }

    /// 各状态数量与成功率
    pub async fn status_summary(&self) -> Result<StatusSummary, ServiceError> {
        let counts = self.task_repo.count_by_status().await?;
        let count = |status: TaskStatus| counts.get(&status).copied().unwrap_or(0);

        let completed = count(TaskStatus::Completed);
        let failed = count(TaskStatus::Failed);
        let finished = completed + failed;

        Ok(StatusSummary {
            total_tasks: counts.values().sum(),
            pending: count(TaskStatus::Pending),
            in_progress: count(TaskStatus::InProgress),
            completed,
            failed,
            success_rate: if finished > 0 {
                completed as f64 / finished as f64 * 100.0
            } else {
                0.0
            },
        })
    }

    pub async fn failed_tasks(&self, skip: u64, limit: u64) -> Result<TaskPage, ServiceError> {
        let (tasks, total) = self
            .task_repo
            .find_by_status(TaskStatus::Failed, skip, limit.clamp(1, MAX_PAGE_SIZE))
            .await?;
        Ok(TaskPage {
            total,
            items: self.with_progress(&tasks).await?,
        })
    }

    /// 按 URL 子串搜索任务，可选按状态过滤
    pub async fn search_tasks(
        &self,
        query: &str,
        status: Option<TaskStatus>,
    ) -> Result<Vec<ScrapingTask>, ServiceError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Err(ServiceError::Validation(format!(
                "query must be at least {} characters",
                MIN_QUERY_LEN
            )));
        }
        Ok(self
            .task_repo
            .search(Some(query), status, SEARCH_LIMIT)
            .await?)
    }

    async fn with_progress(&self, tasks: &[ScrapingTask]) -> Result<Vec<TaskProgressView>, ServiceError> {
        let ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
        let progress: HashMap<Uuid, TaskProgress> = self
            .progress_repo
            .find_by_tasks(&ids)
            .await?
            .into_iter()
            .map(|p| (p.task_id, p))
            .collect();

        Ok(tasks
            .iter()
            .map(|task| TaskProgressView::new(task, progress.get(&task.id)))
            .collect())
    }
}

#[cfg(test)]
#[path = "task_management_test.rs"]
mod tests;
