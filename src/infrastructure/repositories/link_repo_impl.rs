// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::scraped_link::ScrapedLink;
use crate::domain::repositories::link_repository::LinkRepository;
use crate::domain::repositories::task_repository::RepositoryError;
use crate::infrastructure::database::entities::scraped_link as link_entity;
use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// 链接仓库实现
#[derive(Clone)]
pub struct LinkRepositoryImpl {
    db: Arc<DatabaseConnection>,
}

impl LinkRepositoryImpl {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<link_entity::Model> for ScrapedLink {
    fn from(model: link_entity::Model) -> Self {
        Self {
            id: model.id,
            task_id: model.task_id,
            text: model.text,
            url: model.url,
            classification: model.classification.parse().unwrap_or_default(),
            found_at: model.found_at,
        }
    }
}

#[async_trait]
impl LinkRepository for LinkRepositoryImpl {
    async fn create(&self, link: &ScrapedLink) -> Result<ScrapedLink, RepositoryError> {
        let model = link_entity::ActiveModel {
            id: Set(link.id),
            task_id: Set(link.task_id),
            text: Set(link.text.clone()),
            url: Set(link.url.clone()),
            classification: Set(link.classification.to_string()),
            found_at: Set(link.found_at),
        };
        Ok(model.insert(self.db.as_ref()).await?.into())
    }

    async fn find_by_task(&self, task_id: Uuid) -> Result<Vec<ScrapedLink>, RepositoryError> {
        let models = link_entity::Entity::find()
            .filter(link_entity::Column::TaskId.eq(task_id))
            .order_by_asc(link_entity::Column::FoundAt)
            .all(self.db.as_ref())
            .await?;
        Ok(models.into_iter().map(Into::into).collect())
    }
}
