// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm::entity::prelude::*;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "scholarships")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub task_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub amount: String,
    pub amount_normalized_min: Option<f64>,
    pub amount_normalized_max: Option<f64>,
    pub amount_type: String,
    pub is_renewable: bool,
    pub deadline: Option<Date>,
    #[sea_orm(column_type = "Text")]
    pub field_of_study: String,
    #[sea_orm(column_type = "Text")]
    pub level_of_study: String,
    #[sea_orm(column_type = "Text")]
    pub eligibility_criteria: String,
    #[sea_orm(column_type = "Text")]
    pub application_url: String,
    #[sea_orm(column_type = "Text")]
    pub source_url: String,
    #[sea_orm(column_type = "Text")]
    pub location_of_study: String,
    pub ai_summary: Json,
    pub confidence_score: f64,
    pub created_at: ChronoDateTimeWithTimeZone,
    pub last_updated: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
