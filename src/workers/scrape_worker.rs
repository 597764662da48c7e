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

use metrics::{counter, histogram};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::settings::WorkerSettings;
use crate::domain::models::scholarship::{ExtractedScholarship, Scholarship};
use crate::domain::models::scraped_link::{LinkClassification, ScrapedLink};
use crate::domain::models::task::{ScrapingTask, TaskStatus};
use crate::domain::repositories::link_repository::LinkRepository;
use crate::domain::repositories::progress_repository::ProgressRepository;
use crate::domain::repositories::scholarship_repository::ScholarshipRepository;
use crate::domain::repositories::task_repository::TaskRepository;
use crate::domain::services::content_extractor::ContentExtractor;
use crate::domain::services::link_classifier::LinkClassifier;
use crate::domain::services::llm_service::InferenceService;
use crate::domain::services::scholarship_extractor::ScholarshipExtractor;
use crate::engines::traits::{BrowserEngine, BrowserPage, EngineError, PageLink};
use crate::infrastructure::metrics::{
    LINKS_CLASSIFIED, SCHOLARSHIPS_SAVED, TASKS_COMPLETED, TASKS_FAILED, TASK_DURATION,
};
use crate::utils::errors::WorkerError;
use crate::utils::url_utils;

/// 单个链接的处理结果
///
/// 无论结果如何，每个链接处理完后 `processed_links` 都前进一次
#[derive(Debug, Clone, PartialEq)]
pub enum LinkOutcome {
    /// 文本或地址为空
    Skipped,
    /// 已分类并记录，但不是奖学金链接
    NotFollowed,
    FollowedNoResult,
    FollowedWithScholarships(usize),
    /// 记录或跟进链接时出错，已记录日志
    Error(String),
}

/// 抓取工作者（页面流水线）
///
/// 负责一个任务的完整处理：抓取种子页面、逐个分类并跟进链接、
/// 提取种子页面内容、保存奖学金并维护进度。
pub struct ScrapeWorker<R, P, L, S>
where
    R: TaskRepository,
    P: ProgressRepository,
    L: LinkRepository,
    S: ScholarshipRepository,
{
    task_repository: Arc<R>,
    progress_repository: Arc<P>,
    link_repository: Arc<L>,
    scholarship_repository: Arc<S>,
    engine: Arc<dyn BrowserEngine>,
    content_extractor: ContentExtractor,
    classifier: LinkClassifier,
    extractor: ScholarshipExtractor,
    settings: WorkerSettings,
}

impl<R, P, L, S> ScrapeWorker<R, P, L, S>
where
    R: TaskRepository,
    P: ProgressRepository,
    L: LinkRepository,
    S: ScholarshipRepository,
{
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        task_repository: Arc<R>,
        progress_repository: Arc<P>,
        link_repository: Arc<L>,
        scholarship_repository: Arc<S>,
        engine: Arc<dyn BrowserEngine>,
        inference: Arc<dyn InferenceService>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            task_repository,
            progress_repository,
            link_repository,
            scholarship_repository,
            engine,
            content_extractor: ContentExtractor::new(),
            classifier: LinkClassifier::new(inference.clone()),
            extractor: ScholarshipExtractor::new(inference, &settings),
            settings,
        }
    }

    /// 处理一个任务，返回任务的最终状态
    ///
    /// 页面处理中的错误会把任务标记为失败并返回 `Ok(TaskStatus::Failed)`；
    /// 只有进度记录创建失败或状态无法写回时才返回错误。
    #[instrument(skip(self, task), fields(task_id = %task.id, url = %task.url))]
    pub async fn process_task(&self, task: ScrapingTask) -> Result<TaskStatus, WorkerError> {
        info!("Starting to scrape URL");

        let started = task
            .start()
            .map_err(|e| WorkerError::Internal(e.to_string()))?;

        if let Err(e) = self.progress_repository.start_run(started.id).await {
            error!("Error creating progress record: {}", e);
            return Err(e.into());
        }
        let task = self.task_repository.update(&started).await?;

        let clock = Instant::now();
        let result = self.run(&task).await;
        histogram!(TASK_DURATION).record(clock.elapsed().as_secs_f64());

        match result {
            Ok(saved) => {
                let completed = task
                    .complete(chrono::Duration::hours(
                        self.settings.rescrape_interval_hours,
                    ))
                    .map_err(|e| WorkerError::Internal(e.to_string()))?;
                self.task_repository.update(&completed).await?;
                self.progress_repository.mark_completed(completed.id).await?;
                counter!(TASKS_COMPLETED).increment(1);
                info!(scholarships = saved, "Successfully processed task");
                Ok(TaskStatus::Completed)
            }
            Err(e) => {
                let message = e.to_string();
                error!("Error scraping {}: {}", task.url, message);
                let failed = task
                    .fail(message.clone())
                    .map_err(|e| WorkerError::Internal(e.to_string()))?;
                self.task_repository.update(&failed).await?;
                self.progress_repository
                    .mark_failed(failed.id, &message)
                    .await?;
                counter!(TASKS_FAILED).increment(1);
                Ok(TaskStatus::Failed)
            }
        }
    }

    /// 打开页面执行抓取，无论成功与否都会关闭页面
    async fn run(&self, task: &ScrapingTask) -> Result<usize, WorkerError> {
        let page = self.engine.open_page().await?;
        let result = self.crawl(task, page.as_ref()).await;
        if let Err(e) = page.close().await {
            warn!("Failed to close page for {}: {}", task.url, e);
        }
        result
    }

    async fn crawl(&self, task: &ScrapingTask, page: &dyn BrowserPage) -> Result<usize, WorkerError> {
        self.fetch_with_retry(page, &task.url).await?;

        // 跟进链接会离开种子页面，先保存种子页面内容
        let seed_html = page.content().await?;
        let links = page.links().await?;

        let total = i32::try_from(links.len()).unwrap_or(i32::MAX);
        self.progress_repository
            .set_total_links(task.id, total)
            .await?;
        info!("Found {} links on seed page", links.len());

        let mut saved = 0;
        for link in &links {
            let outcome = self.process_link(task, page, link).await;
            match &outcome {
                LinkOutcome::FollowedWithScholarships(count) => saved += count,
                LinkOutcome::Error(e) => warn!("Error processing link {}: {}", link.href, e),
                _ => {}
            }
            debug!(?outcome, href = %link.href, "Link processed");
            self.progress_repository.increment_processed(task.id).await?;
        }

        saved += self.process_seed_content(task, &seed_html).await;
        Ok(saved)
    }

    /// 抓取种子页面，只有超时会重试
    ///
    /// 首次尝试加上最多 `max_fetch_retries` 次重试，每次重试前等待 `retry_delay`
    pub async fn fetch_with_retry(&self, page: &dyn BrowserPage, url: &str) -> Result<(), WorkerError> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match page.goto(url, self.settings.fetch_timeout()).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_timeout() => {
                    if attempts > self.settings.max_fetch_retries {
                        return Err(WorkerError::FetchTimeout {
                            url: url.to_string(),
                            attempts,
                        });
                    }
                    warn!(
                        "Timeout error occurred while scraping {}. Retrying ({}/{})...",
                        url, attempts, self.settings.max_fetch_retries
                    );
                    sleep(self.settings.retry_delay()).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// 处理种子页面上的一个链接
    pub async fn process_link(
        &self,
        task: &ScrapingTask,
        page: &dyn BrowserPage,
        link: &PageLink,
    ) -> LinkOutcome {
        let text = link.text.trim();
        if text.is_empty() || link.href.trim().is_empty() {
            return LinkOutcome::Skipped;
        }
        let Some(url) = url_utils::absolutize(&task.url, &link.href) else {
            debug!("Unresolvable link {}", link.href);
            return LinkOutcome::Skipped;
        };

        let classification = self.classifier.classify(text, &url).await;
        counter!(LINKS_CLASSIFIED, "classification" => classification.to_string()).increment(1);

        let scraped = ScrapedLink::new(task.id, text.to_string(), url.clone(), classification);
        if let Err(e) = self.link_repository.create(&scraped).await {
            return LinkOutcome::Error(format!("failed to record link: {}", e));
        }

        if classification != LinkClassification::Scholarship {
            return LinkOutcome::NotFollowed;
        }

        match self.follow(task.id, page, &url).await {
            Ok(0) => LinkOutcome::FollowedNoResult,
            Ok(count) => LinkOutcome::FollowedWithScholarships(count),
            Err(e) => LinkOutcome::Error(e.to_string()),
        }
    }

    async fn follow(&self, task_id: Uuid, page: &dyn BrowserPage, url: &str) -> Result<usize, EngineError> {
        page.goto(url, self.settings.fetch_timeout()).await?;
        let html = page.content().await?;

        let parsed = self.content_extractor.parse(&html, url);
        if let Some(e) = parsed.error {
            warn!("Failed to parse followed page {}: {}", url, e);
            return Ok(0);
        }

        let found = self.extractor.process_chunk(&parsed.text_blocks).await;
        Ok(self.save_all(task_id, url, found).await)
    }

    async fn process_seed_content(&self, task: &ScrapingTask, html: &str) -> usize {
        let parsed = self.content_extractor.parse(html, &task.url);
        if let Some(e) = parsed.error {
            warn!("Failed to parse seed page {}: {}", task.url, e);
            return 0;
        }

        let mut saved = 0;
        for chunk in parsed.text_blocks.chunks(self.settings.chunk_size.max(1)) {
            let found = self.extractor.process_chunk(chunk).await;
            saved += self.save_all(task.id, &task.url, found).await;
        }
        saved
    }

    /// 逐条保存，单条失败只回滚自身
    async fn save_all(&self, task_id: Uuid, source_url: &str, found: Vec<ExtractedScholarship>) -> usize {
        let mut saved = 0;
        for extracted in found {
            let scholarship = Scholarship::from_extracted(task_id, source_url, extracted);
            match self
                .scholarship_repository
                .save_with_progress(&scholarship)
                .await
            {
                Ok(stored) => {
                    counter!(SCHOLARSHIPS_SAVED).increment(1);
                    info!("Saved scholarship: {}", stored.title);
                    saved += 1;
                }
                Err(e) => error!(
                    "Database error saving scholarship for task {} from {}: {}",
                    task_id, source_url, e
                ),
            }
        }
        saved
    }
}

#[cfg(test)]
#[path = "scrape_worker_test.rs"]
mod tests;
