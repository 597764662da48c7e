// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scholarship::Scholarship;
use crate::domain::repositories::scholarship_repository::{
    ScholarshipFilter, ScholarshipRepository,
};
use crate::domain::repositories::task_repository::RepositoryError;
use crate::infrastructure::database::entities::{
    scholarship as scholarship_entity, scraping_progress as progress_entity,
};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

/// 奖学金仓库实现
#[derive(Clone)]
pub struct ScholarshipRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl ScholarshipRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<scholarship_entity::Model> for Scholarship {
    fn from(model: scholarship_entity::Model) -> Self {
        Self {
            id: model.id,
            task_id: model.task_id,
            title: model.title,
            amount: model.amount,
            amount_normalized_min: model.amount_normalized_min,
            amount_normalized_max: model.amount_normalized_max,
            amount_type: model.amount_type.parse().unwrap_or_default(),
            is_renewable: model.is_renewable,
            deadline: model.deadline,
            field_of_study: model.field_of_study,
            level_of_study: model.level_of_study,
            eligibility_criteria: model.eligibility_criteria,
            application_url: model.application_url,
            source_url: model.source_url,
            location_of_study: model.location_of_study,
            ai_summary: model.ai_summary,
            confidence_score: model.confidence_score,
            created_at: model.created_at,
            last_updated: model.last_updated,
        }
    }
}

impl From<&Scholarship> for scholarship_entity::ActiveModel {
    fn from(s: &Scholarship) -> Self {
        Self {
            id: Set(s.id),
            task_id: Set(s.task_id),
            title: Set(s.title.clone()),
            amount: Set(s.amount.clone()),
            amount_normalized_min: Set(s.amount_normalized_min),
            amount_normalized_max: Set(s.amount_normalized_max),
            amount_type: Set(s.amount_type.to_string()),
            is_renewable: Set(s.is_renewable),
            deadline: Set(s.deadline),
            field_of_study: Set(s.field_of_study.clone()),
            level_of_study: Set(s.level_of_study.clone()),
            eligibility_criteria: Set(s.eligibility_criteria.clone()),
            application_url: Set(s.application_url.clone()),
            source_url: Set(s.source_url.clone()),
            location_of_study: Set(s.location_of_study.clone()),
            ai_summary: Set(s.ai_summary.clone()),
            confidence_score: Set(s.confidence_score),
            created_at: Set(s.created_at),
            last_updated: Set(s.last_updated),
        }
    }
}

fn contains_ignore_case<C: ColumnTrait>(column: C, needle: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", needle.to_lowercase()))
}

#[async_trait]
impl ScholarshipRepository for ScholarshipRepositoryImpl {
    async fn save_with_progress(
        &self,
        scholarship: &Scholarship,
    ) -> Result<Scholarship, RepositoryError> {
        let txn = self.db.begin().await?;

        let model: scholarship_entity::ActiveModel = scholarship.into();
        let inserted = match model.insert(&txn).await {
            Ok(inserted) => inserted,
            Err(e) => {
                txn.rollback().await?;
                return Err(e.into());
            }
        };

        let now: DateTime<FixedOffset> = Utc::now().into();
        let bumped = progress_entity::Entity::update_many()
            .col_expr(
                progress_entity::Column::ScholarshipsFound,
                Expr::col(progress_entity::Column::ScholarshipsFound).add(1),
            )
            .col_expr(progress_entity::Column::LastUpdate, Expr::value(now))
            .filter(progress_entity::Column::TaskId.eq(scholarship.task_id))
            .exec(&txn)
            .await;

        if let Err(e) = bumped {
            txn.rollback().await?;
            return Err(e.into());
        }

        txn.commit().await?;
        Ok(inserted.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Scholarship>, RepositoryError> {
        let model = scholarship_entity::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_task(&self, task_id: Uuid) -> Result<Vec<Scholarship>, RepositoryError> {
        let models = scholarship_entity::Entity::find()
            .filter(scholarship_entity::Column::TaskId.eq(task_id))
            .order_by_asc(scholarship_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find(
        &self,
        filter: &ScholarshipFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Scholarship>, RepositoryError> {
        let mut select = scholarship_entity::Entity::find();

        if let Some(min) = filter.min_confidence {
            select = select.filter(scholarship_entity::Column::ConfidenceScore.gte(min));
        }
        if let Some(field) = &filter.field_of_study {
            select = select.filter(contains_ignore_case(
                scholarship_entity::Column::FieldOfStudy,
                field,
            ));
        }
        if let Some(level) = &filter.level_of_study {
            select = select.filter(scholarship_entity::Column::LevelOfStudy.eq(level.as_str()));
        }
        if let Some(after) = filter.deadline_after {
            select = select.filter(scholarship_entity::Column::Deadline.gt(after));
        }
        if let Some(source) = &filter.source_url {
            select = select.filter(contains_ignore_case(
                scholarship_entity::Column::SourceUrl,
                source,
            ));
        }

        let models = select
            .order_by_desc(scholarship_entity::Column::CreatedAt)
            .offset(skip)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn find_created_between(
        &self,
        start: Option<DateTime<FixedOffset>>,
        end: Option<DateTime<FixedOffset>>,
    ) -> Result<Vec<Scholarship>, RepositoryError> {
        let mut select = scholarship_entity::Entity::find();
        if let Some(start) = start {
            select = select.filter(scholarship_entity::Column::CreatedAt.gte(start));
        }
        if let Some(end) = end {
            select = select.filter(scholarship_entity::Column::CreatedAt.lte(end));
        }
        let models = select
            .order_by_desc(scholarship_entity::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}
