// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::task_repository::RepositoryError;
use crate::domain::models::scholarship::Scholarship;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use uuid::Uuid;

/// 奖学金查询条件
#[derive(Debug, Default, Clone)]
pub struct ScholarshipFilter {
    /// 最低置信度
    pub min_confidence: Option<f64>,
    /// 学科（不区分大小写的子串匹配）
    pub field_of_study: Option<String>,
    /// 学历层次（精确匹配）
    pub level_of_study: Option<String>,
    /// 截止日期晚于
    pub deadline_after: Option<NaiveDate>,
    /// 来源 URL（不区分大小写的子串匹配）
    pub source_url: Option<String>,
}

/// 奖学金仓库特质
#[async_trait]
pub trait ScholarshipRepository: Send + Sync {
    /// 在同一事务中写入奖学金并增加任务进度的 scholarships_found。
    /// 失败时整个事务回滚。
    async fn save_with_progress(
        &self,
        scholarship: &Scholarship,
    ) -> Result<Scholarship, RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Scholarship>, RepositoryError>;
    async fn find_by_task(&self, task_id: Uuid) -> Result<Vec<Scholarship>, RepositoryError>;
    async fn find(
        &self,
        filter: &ScholarshipFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Scholarship>, RepositoryError>;
    /// 按创建时间范围查询，最新的在前
    async fn find_created_between(
        &self,
        start: Option<DateTime<FixedOffset>>,
        end: Option<DateTime<FixedOffset>>,
    ) -> Result<Vec<Scholarship>, RepositoryError>;
}
