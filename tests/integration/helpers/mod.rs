// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use scholarrs::config::settings::WorkerSettings;
use scholarrs::domain::services::llm_service::InferenceService;
use scholarrs::engines::traits::{BrowserEngine, BrowserPage, EngineError, PageLink};
use scholarrs::infrastructure::repositories::{
    link_repo_impl::LinkRepositoryImpl, progress_repo_impl::ProgressRepositoryImpl,
    scholarship_repo_impl::ScholarshipRepositoryImpl, task_repo_impl::TaskRepositoryImpl,
};
use scholarrs::workers::ScrapeWorker;
use sea_orm::{Database, DatabaseConnection};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type TestPipeline = ScrapeWorker<
    TaskRepositoryImpl,
    ProgressRepositoryImpl,
    LinkRepositoryImpl,
    ScholarshipRepositoryImpl,
>;

pub const SEED_URL: &str = "https://uni.edu/financial-aid";
pub const DETAIL_URL: &str = "https://uni.edu/scholarships/engineering";

pub const SEED_HTML: &str = r#"<html><body>
<h1>Financial Aid Office</h1>
<a href="/scholarships/engineering">Engineering Scholarships</a>
</body></html>"#;

pub const DETAIL_HTML: &str = r#"<html><body>
<div class="scholarship-item">
  <h3>Engineering Excellence Award</h3>
  <p>Award of $5,000 for engineering students.</p>
  <p>Deadline: March 1, 2026</p>
</div>
</body></html>"#;

pub const EXTRACTION_JSON: &str = r#"{
    "amount_analysis": {"type": "fixed", "value": "$5,000", "is_renewable": false},
    "deadline_info": {"date": "2026-03-01", "is_recurring": false},
    "field_of_study": "Engineering",
    "level_of_study": "Undergraduate",
    "eligibility_requirements": ["Enrolled in engineering", "GPA 3.0"],
    "location_of_study": "USA",
    "confidence_score": 0.9
}"#;

pub async fn setup_db() -> Arc<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    Arc::new(db)
}

/// 测试用站点：URL 到 HTML、锚点的映射
#[derive(Default)]
pub struct Site {
    pages: HashMap<String, String>,
    links: HashMap<String, Vec<PageLink>>,
    /// 种子页面在成功前要超时的次数
    seed_timeouts: AtomicUsize,
    pub navigations: AtomicUsize,
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
}

impl Site {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str, links: Vec<PageLink>) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self.links.insert(url.to_string(), links);
        self
    }

    pub fn seed_timeouts(self, count: usize) -> Self {
        self.seed_timeouts.store(count, Ordering::SeqCst);
        self
    }

    /// 种子页面只有一个指向奖学金详情页的链接
    pub fn scholarship_site() -> Self {
        Self::new()
            .page(
                SEED_URL,
                SEED_HTML,
                vec![PageLink::new(
                    "Engineering Scholarships",
                    "/scholarships/engineering",
                )],
            )
            .page(DETAIL_URL, DETAIL_HTML, Vec::new())
    }
}

pub struct MockEngine {
    pub site: Arc<Site>,
}

impl MockEngine {
    pub fn new(site: Site) -> Self {
        Self {
            site: Arc::new(site),
        }
    }
}

#[async_trait]
impl BrowserEngine for MockEngine {
    async fn open_page(&self) -> Result<Box<dyn BrowserPage>, EngineError> {
        self.site.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockPage {
            site: self.site.clone(),
            current: Mutex::new(None),
        }))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

struct MockPage {
    site: Arc<Site>,
    current: Mutex<Option<String>>,
}

#[async_trait]
impl BrowserPage for MockPage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), EngineError> {
        self.site.navigations.fetch_add(1, Ordering::SeqCst);
        if url == SEED_URL
            && self
                .site
                .seed_timeouts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(EngineError::Timeout(timeout));
        }
        if !self.site.pages.contains_key(url) {
            return Err(EngineError::Navigation(format!("net::ERR_NAME_NOT_RESOLVED {}", url)));
        }
        *self.current.lock().unwrap() = Some(url.to_string());
        Ok(())
    }

    async fn content(&self) -> Result<String, EngineError> {
        let current = self.current.lock().unwrap().clone();
        current
            .and_then(|url| self.site.pages.get(&url).cloned())
            .ok_or_else(|| EngineError::Browser("no page loaded".to_string()))
    }

    async fn links(&self) -> Result<Vec<PageLink>, EngineError> {
        let current = self.current.lock().unwrap().clone();
        Ok(current
            .and_then(|url| self.site.links.get(&url).cloned())
            .unwrap_or_default())
    }

    async fn close(&self) -> Result<(), EngineError> {
        self.site.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// 按系统提示区分分类请求和提取请求的推理服务
pub struct MockInference {
    /// 链接 URL 中包含该片段时分类为 scholarship
    pub scholarship_marker: String,
    pub extraction_answer: String,
    pub classify_calls: AtomicUsize,
    pub extract_calls: AtomicUsize,
}

impl MockInference {
    pub fn new(extraction_answer: &str) -> Self {
        Self {
            scholarship_marker: "/scholarships/".to_string(),
            extraction_answer: extraction_answer.to_string(),
            classify_calls: AtomicUsize::new(0),
            extract_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl InferenceService for MockInference {
    async fn complete(&self, system: &str, user: &str, _temperature: f32) -> anyhow::Result<String> {
        if system.contains("link classification") {
            self.classify_calls.fetch_add(1, Ordering::SeqCst);
            let answer = if user.contains(&self.scholarship_marker) {
                "scholarship"
            } else {
                "irrelevant"
            };
            return Ok(answer.to_string());
        }
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.extraction_answer.clone())
    }
}

/// 重试不等待的工作器配置
pub fn fast_settings() -> WorkerSettings {
    WorkerSettings {
        retry_delay_secs: 0,
        ..Default::default()
    }
}

#[allow(dead_code)]
pub struct TestContext {
    pub db: Arc<DatabaseConnection>,
    pub tasks: Arc<TaskRepositoryImpl>,
    pub progress: Arc<ProgressRepositoryImpl>,
    pub links: Arc<LinkRepositoryImpl>,
    pub scholarships: Arc<ScholarshipRepositoryImpl>,
    pub site: Arc<Site>,
    pub inference: Arc<MockInference>,
    pub pipeline: Arc<TestPipeline>,
}

pub async fn context(site: Site, inference: MockInference, settings: WorkerSettings) -> TestContext {
    let db = setup_db().await;
    let tasks = Arc::new(TaskRepositoryImpl::new(db.clone()));
    let progress = Arc::new(ProgressRepositoryImpl::new(db.clone()));
    let links = Arc::new(LinkRepositoryImpl::new(db.clone()));
    let scholarships = Arc::new(ScholarshipRepositoryImpl::new(db.clone()));

    let engine = MockEngine::new(site);
    let site = engine.site.clone();
    let inference = Arc::new(inference);

    let pipeline = Arc::new(ScrapeWorker::new(
        tasks.clone(),
        progress.clone(),
        links.clone(),
        scholarships.clone(),
        Arc::new(engine),
        inference.clone(),
        settings,
    ));

    TestContext {
        db,
        tasks,
        progress,
        links,
        scholarships,
        site,
        inference,
        pipeline,
    }
}
