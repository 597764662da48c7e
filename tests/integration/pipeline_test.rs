use super::helpers::{
    context, fast_settings, MockInference, Site, DETAIL_URL, EXTRACTION_JSON, SEED_URL,
};
use chrono::NaiveDate;
use scholarrs::domain::models::scholarship::AmountType;
use scholarrs::domain::models::scraped_link::LinkClassification;
use scholarrs::domain::models::task::{ScrapingTask, TaskStatus};
use scholarrs::domain::repositories::{
    link_repository::LinkRepository, progress_repository::ProgressRepository,
    scholarship_repository::ScholarshipRepository, task_repository::TaskRepository,
};
use scholarrs::engines::traits::PageLink;
use std::sync::atomic::Ordering;

#[tokio::test]
async fn test_seed_page_with_one_scholarship_link() {
    let ctx = context(
        Site::scholarship_site(),
        MockInference::new(EXTRACTION_JSON),
        fast_settings(),
    )
    .await;
    let task = ctx
        .tasks
        .create(&ScrapingTask::new(SEED_URL.to_string()))
        .await
        .unwrap();

    let status = ctx.pipeline.process_task(task.clone()).await.unwrap();
    assert_eq!(status, TaskStatus::Completed);

    let links = ctx.links.find_by_task(task.id).await.unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].url, DETAIL_URL);
    assert_eq!(links[0].text, "Engineering Scholarships");
    assert_eq!(links[0].classification, LinkClassification::Scholarship);

    let scholarships = ctx.scholarships.find_by_task(task.id).await.unwrap();
    assert_eq!(scholarships.len(), 1);
    let s = &scholarships[0];
    assert_eq!(s.title, "Engineering Excellence Award");
    assert_eq!(s.amount, "$5,000");
    assert_eq!(s.amount_type, AmountType::Fixed);
    assert_eq!(s.amount_normalized_min, Some(5000.0));
    assert_eq!(s.deadline, NaiveDate::from_ymd_opt(2026, 3, 1));
    assert_eq!(s.eligibility_criteria, "Enrolled in engineering\nGPA 3.0");
    assert_eq!(s.application_url, DETAIL_URL);
    assert_eq!(s.source_url, DETAIL_URL);
    assert_eq!(s.confidence_score, 0.9);

    let progress = ctx.progress.find_by_task(task.id).await.unwrap().unwrap();
    assert_eq!(progress.status, TaskStatus::Completed);
    assert_eq!(progress.total_links, 1);
    assert_eq!(progress.processed_links, 1);
    assert_eq!(progress.scholarships_found, 1);
    assert!(progress.end_time.is_some());

    let stored = ctx.tasks.find_by_id(task.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Completed);
    assert_eq!(stored.success_count, 1);
    assert!(stored.last_run.is_some());
    assert!(stored.next_run.unwrap() > stored.last_run.unwrap());

    assert_eq!(ctx.site.opened.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.site.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_seed_timeouts_within_retry_budget() {
    let ctx = context(
        Site::scholarship_site().seed_timeouts(2),
        MockInference::new(EXTRACTION_JSON),
        fast_settings(),
    )
    .await;
    let task = ctx
        .tasks
        .create(&ScrapingTask::new(SEED_URL.to_string()))
        .await
        .unwrap();

    let status = ctx.pipeline.process_task(task.clone()).await.unwrap();

    assert_eq!(status, TaskStatus::Completed);
    let stored = ctx.tasks.find_by_id(task.id).await.unwrap().unwrap();
    assert_eq!(stored.fail_count, 0);
    // 3 次种子页面导航加 1 次详情页面导航
    assert_eq!(ctx.site.navigations.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_seed_timeouts_exhaust_retries() {
    let ctx = context(
        Site::scholarship_site().seed_timeouts(4),
        MockInference::new(EXTRACTION_JSON),
        fast_settings(),
    )
    .await;
    let task = ctx
        .tasks
        .create(&ScrapingTask::new(SEED_URL.to_string()))
        .await
        .unwrap();

    let status = ctx.pipeline.process_task(task.clone()).await.unwrap();

    assert_eq!(status, TaskStatus::Failed);
    let stored = ctx.tasks.find_by_id(task.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Failed);
    assert_eq!(stored.fail_count, 1);
    assert!(stored.error_message.unwrap().contains("4 attempts"));

    let progress = ctx.progress.find_by_task(task.id).await.unwrap().unwrap();
    assert_eq!(progress.status, TaskStatus::Failed);
    assert!(progress.error_message.is_some());

    assert_eq!(ctx.site.navigations.load(Ordering::SeqCst), 4);
    assert_eq!(ctx.inference.classify_calls.load(Ordering::SeqCst), 0);
    assert_eq!(ctx.site.closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_link_errors_do_not_fail_task() {
    let site = Site::new().page(
        SEED_URL,
        "<html><body><p>Links</p></body></html>",
        vec![
            PageLink::new("Broken Scholarship", "/scholarships/missing"),
            PageLink::new("", "/scholarships/empty-text"),
            PageLink::new("Library", "/library"),
        ],
    );
    let ctx = context(site, MockInference::new(EXTRACTION_JSON), fast_settings()).await;
    let task = ctx
        .tasks
        .create(&ScrapingTask::new(SEED_URL.to_string()))
        .await
        .unwrap();

    let status = ctx.pipeline.process_task(task.clone()).await.unwrap();
    assert_eq!(status, TaskStatus::Completed);

    let progress = ctx.progress.find_by_task(task.id).await.unwrap().unwrap();
    assert_eq!(progress.total_links, 3);
    assert_eq!(progress.processed_links, 3);
    assert_eq!(progress.scholarships_found, 0);

    // 空文本的链接不分类也不记录
    assert_eq!(ctx.inference.classify_calls.load(Ordering::SeqCst), 2);
    assert_eq!(ctx.links.find_by_task(task.id).await.unwrap().len(), 2);
    assert_eq!(ctx.inference.extract_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_low_confidence_results_are_not_saved() {
    let low = EXTRACTION_JSON.replace("0.9", "0.4");
    let ctx = context(
        Site::scholarship_site(),
        MockInference::new(&low),
        fast_settings(),
    )
    .await;
    let task = ctx
        .tasks
        .create(&ScrapingTask::new(SEED_URL.to_string()))
        .await
        .unwrap();

    let status = ctx.pipeline.process_task(task.clone()).await.unwrap();

    assert_eq!(status, TaskStatus::Completed);
    assert_eq!(ctx.inference.extract_calls.load(Ordering::SeqCst), 1);
    assert!(ctx.scholarships.find_by_task(task.id).await.unwrap().is_empty());
    let progress = ctx.progress.find_by_task(task.id).await.unwrap().unwrap();
    assert_eq!(progress.scholarships_found, 0);
}

#[tokio::test]
async fn test_seed_page_blocks_are_extracted() {
    let seed = r#"<html><body>
<section class="funding-opportunity">
  <h2>Community Grant</h2>
  <p>Grants up to $1,500 for local students.</p>
  <a href="/grants/community/apply">Apply now</a>
</section>
</body></html>"#;
    let ctx = context(
        Site::new().page(SEED_URL, seed, Vec::new()),
        MockInference::new(EXTRACTION_JSON),
        fast_settings(),
    )
    .await;
    let task = ctx
        .tasks
        .create(&ScrapingTask::new(SEED_URL.to_string()))
        .await
        .unwrap();

    ctx.pipeline.process_task(task.clone()).await.unwrap();

    let scholarships = ctx.scholarships.find_by_task(task.id).await.unwrap();
    assert_eq!(scholarships.len(), 1);
    assert_eq!(scholarships[0].title, "Community Grant");
    assert_eq!(scholarships[0].source_url, SEED_URL);
    assert_eq!(
        scholarships[0].application_url,
        "https://uni.edu/grants/community/apply"
    );

    let progress = ctx.progress.find_by_task(task.id).await.unwrap().unwrap();
    assert_eq!(progress.total_links, 0);
    assert_eq!(progress.scholarships_found, 1);
}
