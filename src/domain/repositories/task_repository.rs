// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::task::{ScrapingTask, TaskStatus};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::DbErr;
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
}

/// 任务仓库特质
///
/// 定义任务数据访问接口
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// 创建新任务
    async fn create(&self, task: &ScrapingTask) -> Result<ScrapingTask, RepositoryError>;
    /// 根据ID查找任务
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScrapingTask>, RepositoryError>;
    /// 根据URL查找任务
    async fn find_by_url(&self, url: &str) -> Result<Option<ScrapingTask>, RepositoryError>;
    /// 更新任务
    async fn update(&self, task: &ScrapingTask) -> Result<ScrapingTask, RepositoryError>;
    /// 查找可调度的任务：pending 或 failed，且 next_run 为空或不晚于 `now`
    async fn find_eligible(
        &self,
        now: DateTime<FixedOffset>,
        limit: u64,
    ) -> Result<Vec<ScrapingTask>, RepositoryError>;
    /// 按创建时间倒序列出任务
    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<ScrapingTask>, RepositoryError>;
    /// 按状态分页查询，返回结果和总数
    async fn find_by_status(
        &self,
        status: TaskStatus,
        skip: u64,
        limit: u64,
    ) -> Result<(Vec<ScrapingTask>, u64), RepositoryError>;
    /// URL 子串搜索，可选按状态过滤
    async fn search(
        &self,
        query: Option<&str>,
        status: Option<TaskStatus>,
        limit: u64,
    ) -> Result<Vec<ScrapingTask>, RepositoryError>;
    /// 各状态的任务数量
    async fn count_by_status(&self) -> Result<HashMap<TaskStatus, u64>, RepositoryError>;
    /// 删除任务及其进度、链接和奖学金
    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError>;
    /// 删除全部记录，返回删除的任务数
    async fn delete_all(&self) -> Result<u64, RepositoryError>;
    /// 将处于 in_progress 的任务放回 pending
    async fn reset_in_progress(&self) -> Result<u64, RepositoryError>;
}
