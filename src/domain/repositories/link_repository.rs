// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::task_repository::RepositoryError;
use crate::domain::models::scraped_link::ScrapedLink;
use async_trait::async_trait;
use uuid::Uuid;

/// 链接仓库特质
#[async_trait]
pub trait LinkRepository: Send + Sync {
    async fn create(&self, link: &ScrapedLink) -> Result<ScrapedLink, RepositoryError>;
    async fn find_by_task(&self, task_id: Uuid) -> Result<Vec<ScrapedLink>, RepositoryError>;
}
