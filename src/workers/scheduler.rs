// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::settings::WorkerSettings;
use crate::domain::models::task::TaskStatus;
use crate::domain::repositories::{
    link_repository::LinkRepository, progress_repository::ProgressRepository,
    scholarship_repository::ScholarshipRepository, task_repository::TaskRepository,
};
use crate::utils::errors::WorkerError;
use crate::workers::scrape_worker::ScrapeWorker;

/// 一轮轮询的结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub completed: usize,
    pub failed: usize,
    /// 状态无法写回或进度记录创建失败的任务
    pub errored: usize,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.completed + self.failed + self.errored
    }
}

/// 任务调度Worker
///
/// 定期查询可调度的任务（pending 且 `next_run` 已到），
/// 每轮最多取 `batch_size` 个并发处理，整批结束后休眠 `poll_interval`。
/// 取消信号只在休眠期间或两轮之间生效，进行中的一批任务总会完整处理。
pub struct TaskScheduler<R, P, L, S>
where
    R: TaskRepository,
    P: ProgressRepository,
    L: LinkRepository,
    S: ScholarshipRepository,
{
    task_repository: Arc<R>,
    pipeline: Arc<ScrapeWorker<R, P, L, S>>,
    settings: WorkerSettings,
}

impl<R, P, L, S> TaskScheduler<R, P, L, S>
where
    R: TaskRepository,
    P: ProgressRepository,
    L: LinkRepository,
    S: ScholarshipRepository,
{
    pub fn new(
        task_repository: Arc<R>,
        pipeline: Arc<ScrapeWorker<R, P, L, S>>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            task_repository,
            pipeline,
            settings,
        }
    }

    /// 执行一轮轮询：取出一批任务并发处理，等待整批结束
    pub async fn poll_once(&self) -> Result<BatchReport, WorkerError> {
        let tasks = self
            .task_repository
            .find_eligible(Utc::now().into(), self.settings.batch_size)
            .await?;

        if tasks.is_empty() {
            debug!("No tasks found, waiting...");
            return Ok(BatchReport::default());
        }

        info!("Found {} tasks to process", tasks.len());

        let results = join_all(
            tasks
                .into_iter()
                .map(|task| self.pipeline.process_task(task)),
        )
        .await;

        let mut report = BatchReport::default();
        for result in results {
            match result {
                Ok(TaskStatus::Completed) => report.completed += 1,
                Ok(_) => report.failed += 1,
                Err(e) => {
                    error!("Task bookkeeping failed: {}", e);
                    report.errored += 1;
                }
            }
        }

        info!(
            "Batch finished: completed={}, failed={}, errored={}",
            report.completed, report.failed, report.errored
        );
        Ok(report)
    }
}

#[async_trait]
impl<R, P, L, S> crate::workers::Worker for TaskScheduler<R, P, L, S>
where
    R: TaskRepository,
    P: ProgressRepository,
    L: LinkRepository,
    S: ScholarshipRepository,
{
    async fn run(&self, shutdown: CancellationToken) -> Result<(), WorkerError> {
        info!("Worker started");

        while !shutdown.is_cancelled() {
            if let Err(e) = self.poll_once().await {
                error!("Worker error: {}", e);
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = sleep(self.settings.poll_interval()) => {}
            }
        }

        info!("Worker stopped");
        Ok(())
    }

    fn name(&self) -> &str {
        "task-scheduler"
    }
}
