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

use scholarrs::application::use_cases::TaskService;
use scholarrs::config::settings::Settings;
use scholarrs::domain::services::llm_service::{InferenceService, LLMService};
use scholarrs::engines::chromium_engine::ChromiumEngine;
use scholarrs::infrastructure::database::connection;
use scholarrs::infrastructure::metrics;
use scholarrs::infrastructure::repositories::{
    link_repo_impl::LinkRepositoryImpl, progress_repo_impl::ProgressRepositoryImpl,
    scholarship_repo_impl::ScholarshipRepositoryImpl, task_repo_impl::TaskRepositoryImpl,
};
use scholarrs::utils::telemetry;
use scholarrs::workers::{ScrapeWorker, ShutdownMode, TaskScheduler, WorkerManager};
use std::sync::Arc;
use tracing::info;

/// 主函数
///
/// 初始化所有组件，启动调度器，收到 Ctrl-C 后等待当前一批任务结束再退出
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Settings::new()?;

    // 2. Initialize logging
    telemetry::init_telemetry(settings.logging.json);
    info!("Starting scholarrs...");
    info!("Configuration loaded");

    // 3. Initialize Prometheus Metrics
    metrics::init_metrics(&settings.metrics);

    // 4. Connect to database and run migrations
    let db = Arc::new(connection::connect_and_migrate(&settings.database).await?);
    info!("Database connection established");

    // 5. Initialize Components
    let task_repo = Arc::new(TaskRepositoryImpl::new(db.clone()));
    let progress_repo = Arc::new(ProgressRepositoryImpl::new(db.clone()));
    let link_repo = Arc::new(LinkRepositoryImpl::new(db.clone()));
    let scholarship_repo = Arc::new(ScholarshipRepositoryImpl::new(db.clone()));

    // Tasks left in_progress by an abandoned shutdown
    TaskService::new(task_repo.clone(), progress_repo.clone())
        .reset_stale_tasks()
        .await?;

    let engine = Arc::new(ChromiumEngine::new(settings.browser.clone()));
    let inference: Arc<dyn InferenceService> = Arc::new(LLMService::new(&settings.llm)?);
    info!("Using model {}", settings.llm.model);

    let pipeline = Arc::new(ScrapeWorker::new(
        task_repo.clone(),
        progress_repo,
        link_repo,
        scholarship_repo,
        engine,
        inference,
        settings.worker.clone(),
    ));

    // 6. Start Worker
    let scheduler = TaskScheduler::new(task_repo, pipeline, settings.worker.clone());
    let mut worker_manager = WorkerManager::new(scheduler);
    worker_manager.start();

    // 7. Wait for shutdown
    worker_manager.wait_for_shutdown(ShutdownMode::Drain).await;
    info!("scholarrs stopped");

    Ok(())
}
