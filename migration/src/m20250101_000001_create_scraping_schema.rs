// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScrapingTasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScrapingTasks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScrapingTasks::Url).string().not_null())
                    .col(
                        ColumnDef::new(ScrapingTasks::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(ScrapingTasks::LastRun).timestamp_with_time_zone())
                    .col(ColumnDef::new(ScrapingTasks::NextRun).timestamp_with_time_zone())
                    .col(ColumnDef::new(ScrapingTasks::ErrorMessage).text())
                    .col(
                        ColumnDef::new(ScrapingTasks::SuccessCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ScrapingTasks::FailCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ScrapingTasks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ScrapingTasks::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scraping_tasks_url")
                    .table(ScrapingTasks::Table)
                    .col(ScrapingTasks::Url)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scraping_tasks_status_next_run")
                    .table(ScrapingTasks::Table)
                    .col(ScrapingTasks::Status)
                    .col(ScrapingTasks::NextRun)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ScrapingProgress::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScrapingProgress::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScrapingProgress::TaskId).uuid().not_null())
                    .col(ColumnDef::new(ScrapingProgress::Status).string().not_null())
                    .col(
                        ColumnDef::new(ScrapingProgress::TotalLinks)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ScrapingProgress::ProcessedLinks)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ScrapingProgress::ScholarshipsFound)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ScrapingProgress::StartTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(ScrapingProgress::EndTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(ScrapingProgress::ProcessingDuration).double())
                    .col(ColumnDef::new(ScrapingProgress::ErrorMessage).text())
                    .col(
                        ColumnDef::new(ScrapingProgress::LastUpdate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_scraping_progress_task")
                            .from(ScrapingProgress::Table, ScrapingProgress::TaskId)
                            .to(ScrapingTasks::Table, ScrapingTasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scraping_progress_task_id")
                    .table(ScrapingProgress::Table)
                    .col(ScrapingProgress::TaskId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ScrapedLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScrapedLinks::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScrapedLinks::TaskId).uuid().not_null())
                    .col(ColumnDef::new(ScrapedLinks::Text).text().not_null())
                    .col(ColumnDef::new(ScrapedLinks::Url).text().not_null())
                    .col(ColumnDef::new(ScrapedLinks::Classification).string().not_null())
                    .col(
                        ColumnDef::new(ScrapedLinks::FoundAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_scraped_links_task")
                            .from(ScrapedLinks::Table, ScrapedLinks::TaskId)
                            .to(ScrapingTasks::Table, ScrapingTasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scraped_links_task_id")
                    .table(ScrapedLinks::Table)
                    .col(ScrapedLinks::TaskId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Scholarships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Scholarships::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Scholarships::TaskId).uuid().not_null())
                    .col(ColumnDef::new(Scholarships::Title).text().not_null())
                    .col(ColumnDef::new(Scholarships::Amount).text().not_null())
                    .col(ColumnDef::new(Scholarships::AmountNormalizedMin).double())
                    .col(ColumnDef::new(Scholarships::AmountNormalizedMax).double())
                    .col(
                        ColumnDef::new(Scholarships::AmountType)
                            .string()
                            .not_null()
                            .default("unknown"),
                    )
                    .col(
                        ColumnDef::new(Scholarships::IsRenewable)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Scholarships::Deadline).date())
                    .col(ColumnDef::new(Scholarships::FieldOfStudy).text().not_null())
                    .col(ColumnDef::new(Scholarships::LevelOfStudy).text().not_null())
                    .col(ColumnDef::new(Scholarships::EligibilityCriteria).text().not_null())
                    .col(ColumnDef::new(Scholarships::ApplicationUrl).text().not_null())
                    .col(ColumnDef::new(Scholarships::SourceUrl).text().not_null())
                    .col(ColumnDef::new(Scholarships::LocationOfStudy).text().not_null())
                    .col(ColumnDef::new(Scholarships::AiSummary).json().not_null())
                    .col(ColumnDef::new(Scholarships::ConfidenceScore).double().not_null())
                    .col(
                        ColumnDef::new(Scholarships::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Scholarships::LastUpdated)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_scholarships_task")
                            .from(Scholarships::Table, Scholarships::TaskId)
                            .to(ScrapingTasks::Table, ScrapingTasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scholarships_task_id")
                    .table(Scholarships::Table)
                    .col(Scholarships::TaskId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scholarships_created_at")
                    .table(Scholarships::Table)
                    .col(Scholarships::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Scholarships::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ScrapedLinks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ScrapingProgress::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ScrapingTasks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ScrapingTasks {
    Table,
    Id,
    Url,
    Status,
    LastRun,
    NextRun,
    ErrorMessage,
    SuccessCount,
    FailCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ScrapingProgress {
    Table,
    Id,
    TaskId,
    Status,
    TotalLinks,
    ProcessedLinks,
    ScholarshipsFound,
    StartTime,
    EndTime,
    ProcessingDuration,
    ErrorMessage,
    LastUpdate,
}

#[derive(DeriveIden)]
enum ScrapedLinks {
    Table,
    Id,
    TaskId,
    Text,
    Url,
    Classification,
    FoundAt,
}

#[derive(DeriveIden)]
enum Scholarships {
    Table,
    Id,
    TaskId,
    Title,
    Amount,
    AmountNormalizedMin,
    AmountNormalizedMax,
    AmountType,
    IsRenewable,
    Deadline,
    FieldOfStudy,
    LevelOfStudy,
    EligibilityCriteria,
    ApplicationUrl,
    SourceUrl,
    LocationOfStudy,
    AiSummary,
    ConfidenceScore,
    CreatedAt,
    LastUpdated,
}
