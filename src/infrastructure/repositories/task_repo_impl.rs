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

use crate::domain::models::task::{ScrapingTask, TaskStatus};
use crate::domain::repositories::task_repository::{RepositoryError, TaskRepository};
use crate::infrastructure::database::entities::{
    scholarship as scholarship_entity, scraped_link as link_entity,
    scraping_progress as progress_entity, scraping_task as task_entity,
};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// 任务仓库实现
///
/// 基于SeaORM实现的任务数据访问层
#[derive(Clone)]
pub struct TaskRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl TaskRepositoryImpl {
    /// 创建新的任务仓库实例
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<task_entity::Model> for ScrapingTask {
    fn from(model: task_entity::Model) -> Self {
        let status = model.status.parse().unwrap_or_else(|_| {
            warn!(
                "Unknown status {} for task {}, treating as pending",
                model.status, model.id
            );
            TaskStatus::Pending
        });
        Self {
            id: model.id,
            url: model.url,
            status,
            last_run: model.last_run,
            next_run: model.next_run,
            error_message: model.error_message,
            success_count: model.success_count,
            fail_count: model.fail_count,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&ScrapingTask> for task_entity::ActiveModel {
    fn from(task: &ScrapingTask) -> Self {
        Self {
            id: Set(task.id),
            url: Set(task.url.clone()),
            status: Set(task.status.to_string()),
            last_run: Set(task.last_run),
            next_run: Set(task.next_run),
            error_message: Set(task.error_message.clone()),
            success_count: Set(task.success_count),
            fail_count: Set(task.fail_count),
            created_at: Set(task.created_at),
            updated_at: Set(task.updated_at),
        }
    }
}

#[async_trait]
impl TaskRepository for TaskRepositoryImpl {
    async fn create(&self, task: &ScrapingTask) -> Result<ScrapingTask, RepositoryError> {
        let model: task_entity::ActiveModel = task.into();
        let inserted = model.insert(self.db.as_ref()).await?;
        Ok(inserted.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ScrapingTask>, RepositoryError> {
        let model = task_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<ScrapingTask>, RepositoryError> {
        let model = task_entity::Entity::find()
            .filter(task_entity::Column::Url.eq(url))
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn update(&self, task: &ScrapingTask) -> Result<ScrapingTask, RepositoryError> {
        let mut model: task_entity::ActiveModel = task.into();
        model.updated_at = Set(Utc::now().into());
        let updated = model.update(self.db.as_ref()).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => RepositoryError::NotFound,
            other => RepositoryError::Database(other),
        })?;
        Ok(updated.into())
    }

    async fn find_eligible(
        &self,
        now: DateTime<FixedOffset>,
        limit: u64,
    ) -> Result<Vec<ScrapingTask>, RepositoryError> {
        let models = task_entity::Entity::find()
            .filter(task_entity::Column::Status.eq(TaskStatus::Pending.to_string()))
            .filter(
                Condition::any()
                    .add(task_entity::Column::NextRun.is_null())
                    .add(task_entity::Column::NextRun.lte(now)),
            )
            .order_by_asc(task_entity::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list(&self, skip: u64, limit: u64) -> Result<Vec<ScrapingTask>, RepositoryError> {
        let models = task_entity::Entity::find()
            .order_by_desc(task_entity::Column::CreatedAt)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_by_status(
        &self,
        status: TaskStatus,
        skip: u64,
        limit: u64,
    ) -> Result<(Vec<ScrapingTask>, u64), RepositoryError> {
        let query = task_entity::Entity::find()
            .filter(task_entity::Column::Status.eq(status.to_string()));
        let total = query.clone().count(self.db.as_ref()).await?;
        let models = query
            .order_by_desc(task_entity::Column::UpdatedAt)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    async fn search(
        &self,
        query: Option<&str>,
        status: Option<TaskStatus>,
        limit: u64,
    ) -> Result<Vec<ScrapingTask>, RepositoryError> {
        let mut select = task_entity::Entity::find();
        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(task_entity::Column::Url)))
                    .like(format!("%{}%", q.to_lowercase())),
            );
        }
        if let Some(status) = status {
            select = select.filter(task_entity::Column::Status.eq(status.to_string()));
        }
        let models = select
            .order_by_desc(task_entity::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count_by_status(&self) -> Result<HashMap<TaskStatus, u64>, RepositoryError> {
        let mut counts = HashMap::new();
        for status in TaskStatus::ALL {
            let count = task_entity::Entity::find()
                .filter(task_entity::Column::Status.eq(status.to_string()))
                .count(self.db.as_ref())
                .await?;
            counts.insert(status, count);
        }
        Ok(counts)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        progress_entity::Entity::delete_many()
            .filter(progress_entity::Column::TaskId.eq(id))
            .exec(&txn)
            .await?;
        link_entity::Entity::delete_many()
            .filter(link_entity::Column::TaskId.eq(id))
            .exec(&txn)
            .await?;
        scholarship_entity::Entity::delete_many()
            .filter(scholarship_entity::Column::TaskId.eq(id))
            .exec(&txn)
            .await?;
        let result = task_entity::Entity::delete_by_id(id).exec(&txn).await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(RepositoryError::NotFound);
        }

        txn.commit().await?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let txn = self.db.begin().await?;

        progress_entity::Entity::delete_many().exec(&txn).await?;
        link_entity::Entity::delete_many().exec(&txn).await?;
        scholarship_entity::Entity::delete_many().exec(&txn).await?;
        let result = task_entity::Entity::delete_many().exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected)
    }

    async fn reset_in_progress(&self) -> Result<u64, RepositoryError> {
        let result = task_entity::Entity::update_many()
            .col_expr(
                task_entity::Column::Status,
                Expr::value(TaskStatus::Pending.to_string()),
            )
            .col_expr(
                task_entity::Column::UpdatedAt,
                Expr::value(DateTime::<FixedOffset>::from(Utc::now())),
            )
            .filter(task_entity::Column::Status.eq(TaskStatus::InProgress.to_string()))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}
