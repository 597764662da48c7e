// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::task_repository::RepositoryError;
use crate::domain::models::progress::TaskProgress;
use async_trait::async_trait;
use uuid::Uuid;

/// 进度仓库特质
///
/// 每个写操作独立提交，中途失败时已写入的进度保留
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn find_by_task(&self, task_id: Uuid) -> Result<Option<TaskProgress>, RepositoryError>;
    /// 批量查询多个任务的进度
    async fn find_by_tasks(&self, task_ids: &[Uuid]) -> Result<Vec<TaskProgress>, RepositoryError>;
    /// 写入或替换任务的进度记录
    async fn upsert(&self, progress: &TaskProgress) -> Result<TaskProgress, RepositoryError>;
    /// 开始一次运行：in_progress，计数清零，记录开始时间
    async fn start_run(&self, task_id: Uuid) -> Result<TaskProgress, RepositoryError>;
    async fn set_total_links(&self, task_id: Uuid, total: i32) -> Result<(), RepositoryError>;
    /// 已处理链接数加一，不会超过链接总数
    async fn increment_processed(&self, task_id: Uuid) -> Result<(), RepositoryError>;
    /// 标记完成并写入结束时间和耗时
    async fn mark_completed(&self, task_id: Uuid) -> Result<(), RepositoryError>;
    async fn mark_failed(&self, task_id: Uuid, error: &str) -> Result<(), RepositoryError>;
}
