// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::progress::TaskProgress;
use crate::domain::models::task::TaskStatus;
use crate::domain::repositories::progress_repository::ProgressRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use crate::infrastructure::database::entities::scraping_progress as progress_entity;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 进度仓库实现
#[derive(Clone)]
pub struct ProgressRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ProgressRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn require(&self, task_id: Uuid) -> Result<progress_entity::Model, RepositoryError> {
        progress_entity::Entity::find()
            .filter(progress_entity::Column::TaskId.eq(task_id))
            .one(self.db.as_ref())
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}

fn now() -> DateTime<FixedOffset> {
    Utc::now().into()
}

impl From<progress_entity::Model> for TaskProgress {
    fn from(model: progress_entity::Model) -> Self {
        Self {
            id: model.id,
            task_id: model.task_id,
            status: model.status.parse().unwrap_or_default(),
            total_links: model.total_links,
            processed_links: model.processed_links,
            scholarships_found: model.scholarships_found,
            start_time: model.start_time,
            end_time: model.end_time,
            processing_duration: model.processing_duration,
            error_message: model.error_message,
            last_update: model.last_update,
        }
    }
}

impl From<&TaskProgress> for progress_entity::ActiveModel {
    fn from(progress: &TaskProgress) -> Self {
        Self {
            id: Set(progress.id),
            task_id: Set(progress.task_id),
            status: Set(progress.status.to_string()),
            total_links: Set(progress.total_links),
            processed_links: Set(progress.processed_links),
            scholarships_found: Set(progress.scholarships_found),
            start_time: Set(progress.start_time),
            end_time: Set(progress.end_time),
            processing_duration: Set(progress.processing_duration),
            error_message: Set(progress.error_message.clone()),
            last_update: Set(progress.last_update),
        }
    }
}

#[async_trait]
impl ProgressRepository for ProgressRepositoryImpl {
    async fn find_by_task(&self, task_id: Uuid) -> Result<Option<TaskProgress>, RepositoryError> {
        let model = progress_entity::Entity::find()
            .filter(progress_entity::Column::TaskId.eq(task_id))
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_tasks(&self, task_ids: &[Uuid]) -> Result<Vec<TaskProgress>, RepositoryError> {
        if task_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = progress_entity::Entity::find()
            .filter(progress_entity::Column::TaskId.is_in(task_ids.iter().copied()))
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn upsert(&self, progress: &TaskProgress) -> Result<TaskProgress, RepositoryError> {
        let model: progress_entity::ActiveModel = progress.into();
        progress_entity::Entity::insert(model)
            .on_conflict(
                OnConflict::column(progress_entity::Column::TaskId)
                    .update_columns([
                        progress_entity::Column::Status,
                        progress_entity::Column::TotalLinks,
                        progress_entity::Column::ProcessedLinks,
                        progress_entity::Column::ScholarshipsFound,
                        progress_entity::Column::StartTime,
                        progress_entity::Column::EndTime,
                        progress_entity::Column::ProcessingDuration,
                        progress_entity::Column::ErrorMessage,
                        progress_entity::Column::LastUpdate,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await?;

        Ok(self.require(progress.task_id).await?.into())
    }

    async fn start_run(&self, task_id: Uuid) -> Result<TaskProgress, RepositoryError> {
        let mut progress = TaskProgress::pending(task_id);
        progress.status = TaskStatus::InProgress;
        progress.start_time = Some(now());
        self.upsert(&progress).await
    }

    async fn set_total_links(&self, task_id: Uuid, total: i32) -> Result<(), RepositoryError> {
        let mut model: progress_entity::ActiveModel = self.require(task_id).await?.into();
        model.total_links = Set(total);
        model.last_update = Set(now());
        model.update(self.db.as_ref()).await?;
        Ok(())
    }

    async fn increment_processed(&self, task_id: Uuid) -> Result<(), RepositoryError> {
        progress_entity::Entity::update_many()
            .col_expr(
                progress_entity::Column::ProcessedLinks,
                Expr::col(progress_entity::Column::ProcessedLinks).add(1),
            )
            .col_expr(progress_entity::Column::LastUpdate, Expr::value(now()))
            .filter(progress_entity::Column::TaskId.eq(task_id))
            .filter(
                Expr::col(progress_entity::Column::ProcessedLinks)
                    .lt(Expr::col(progress_entity::Column::TotalLinks)),
            )
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn mark_completed(&self, task_id: Uuid) -> Result<(), RepositoryError> {
        let current = self.require(task_id).await?;
        let end = now();
        let duration = current
            .start_time
            .map(|start| (end - start).num_milliseconds() as f64 / 1000.0);

        let mut model: progress_entity::ActiveModel = current.into();
        model.status = Set(TaskStatus::Completed.to_string());
        model.end_time = Set(Some(end));
        model.processing_duration = Set(duration);
        model.error_message = Set(None);
        model.last_update = Set(end);
        model.update(self.db.as_ref()).await?;
        Ok(())
    }

    async fn mark_failed(&self, task_id: Uuid, error: &str) -> Result<(), RepositoryError> {
        let current = self.require(task_id).await?;
        let end = now();
        let duration = current
            .start_time
            .map(|start| (end - start).num_milliseconds() as f64 / 1000.0);

        let mut model: progress_entity::ActiveModel = current.into();
        model.status = Set(TaskStatus::Failed.to_string());
        model.end_time = Set(Some(end));
        model.processing_duration = Set(duration);
        model.error_message = Set(Some(error.to_string()));
        model.last_update = Set(end);
        model.update(self.db.as_ref()).await?;
        Ok(())
    }
}
