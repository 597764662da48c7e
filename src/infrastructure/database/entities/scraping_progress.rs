// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "scraping_progress")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub task_id: Uuid,
    pub status: String,
    pub total_links: i32,
    pub processed_links: i32,
    pub scholarships_found: i32,
    pub start_time: Option<ChronoDateTimeWithTimeZone>,
    pub end_time: Option<ChronoDateTimeWithTimeZone>,
    pub processing_duration: Option<f64>,
    pub error_message: Option<String>,
    pub last_update: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
