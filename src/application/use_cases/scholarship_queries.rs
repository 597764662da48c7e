// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::{
    application::dto::scholarship_dto::{ScholarshipCsvRow, CSV_HEADERS},
    domain::{
        models::scholarship::Scholarship,
        repositories::scholarship_repository::{ScholarshipFilter, ScholarshipRepository},
    },
    utils::errors::ServiceError,
};
use chrono::{DateTime, FixedOffset};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const MAX_PAGE_SIZE: u64 = 1000;

/// 奖学金查询与导出
pub struct ScholarshipService<SR> {
    repo: Arc<SR>,
}

impl<SR> ScholarshipService<SR>
where
    SR: ScholarshipRepository + 'static,
{
    pub fn new(repo: Arc<SR>) -> Self {
        Self { repo }
    }

    /// 按条件分页查询，`limit` 限制在 1..=1000
    pub async fn list(
        &self,
        filter: &ScholarshipFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Scholarship>, ServiceError> {
        Ok(self
            .repo
            .find(filter, skip, limit.clamp(1, MAX_PAGE_SIZE))
            .await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<Scholarship, ServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("scholarship {}", id)))
    }

    /// 按创建时间范围导出，最新的在前
    pub async fn export(
        &self,
        start: Option<DateTime<FixedOffset>>,
        end: Option<DateTime<FixedOffset>>,
    ) -> Result<Vec<Scholarship>, ServiceError> {
        Ok(self.repo.find_created_between(start, end).await?)
    }

    /// 导出为 CSV 文本，首行为表头
    pub async fn export_csv(
        &self,
        start: Option<DateTime<FixedOffset>>,
        end: Option<DateTime<FixedOffset>>,
    ) -> Result<String, ServiceError> {
        let scholarships = self.export(start, end).await?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer
            .write_record(CSV_HEADERS)
            .map_err(|e| ServiceError::Export(e.to_string()))?;
        for scholarship in &scholarships {
            writer
                .serialize(ScholarshipCsvRow::from(scholarship))
                .map_err(|e| ServiceError::Export(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ServiceError::Export(e.to_string()))?;
        info!("Exported {} scholarships", scholarships.len());
        String::from_utf8(bytes).map_err(|e| ServiceError::Export(e.to_string()))
    }
}

#[cfg(test)]
#[path = "scholarship_queries_test.rs"]
mod tests;
