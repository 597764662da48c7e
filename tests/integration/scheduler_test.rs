use super::helpers::{context, fast_settings, MockInference, Site, EXTRACTION_JSON, SEED_URL};
use chrono::{Duration as ChronoDuration, Utc};
use scholarrs::application::use_cases::TaskService;
use scholarrs::domain::models::task::{ScrapingTask, TaskStatus};
use scholarrs::domain::repositories::task_repository::TaskRepository;
use scholarrs::workers::{ShutdownMode, TaskScheduler, WorkerManager};
use std::sync::atomic::Ordering;
use std::time::Duration;

const OTHER_URL: &str = "https://college.edu/aid";

#[tokio::test]
async fn test_poll_once_processes_only_eligible_tasks() {
    let site = Site::scholarship_site().page(OTHER_URL, "<html><body></body></html>", Vec::new());
    let ctx = context(site, MockInference::new(EXTRACTION_JSON), fast_settings()).await;

    let due = ctx
        .tasks
        .create(&ScrapingTask::new(SEED_URL.to_string()))
        .await
        .unwrap();
    let mut later = ScrapingTask::new(OTHER_URL.to_string());
    later.next_run = Some((Utc::now() + ChronoDuration::hours(1)).into());
    let later = ctx.tasks.create(&later).await.unwrap();

    let scheduler = TaskScheduler::new(ctx.tasks.clone(), ctx.pipeline.clone(), fast_settings());

    let report = scheduler.poll_once().await.unwrap();
    assert_eq!(report.completed, 1);
    assert_eq!(report.total(), 1);

    let due = ctx.tasks.find_by_id(due.id).await.unwrap().unwrap();
    assert_eq!(due.status, TaskStatus::Completed);
    let later = ctx.tasks.find_by_id(later.id).await.unwrap().unwrap();
    assert_eq!(later.status, TaskStatus::Pending);

    // 完成的任务要等到重新抓取间隔之后才会再次被调度
    let report = scheduler.poll_once().await.unwrap();
    assert_eq!(report.total(), 0);
}

#[tokio::test]
async fn test_failed_task_waits_for_retry() {
    let ctx = context(
        Site::scholarship_site().seed_timeouts(4),
        MockInference::new(EXTRACTION_JSON),
        fast_settings(),
    )
    .await;
    let service = TaskService::new(ctx.tasks.clone(), ctx.progress.clone());
    let task = service
        .create_task(SEED_URL)
        .await
        .unwrap()
        .task()
        .clone();
    let scheduler = TaskScheduler::new(ctx.tasks.clone(), ctx.pipeline.clone(), fast_settings());

    let first = scheduler.poll_once().await.unwrap();
    assert_eq!(first.failed, 1);

    // 失败的任务不会被自动重新调度
    for _ in 0..2 {
        let report = scheduler.poll_once().await.unwrap();
        assert_eq!(report.total(), 0);
    }
    let stored = ctx.tasks.find_by_id(task.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Failed);
    assert_eq!(stored.fail_count, 1);
    assert_eq!(ctx.site.navigations.load(Ordering::SeqCst), 4);

    service.retry_task(task.id).await.unwrap();
    let retried = scheduler.poll_once().await.unwrap();
    assert_eq!(retried.completed, 1);

    let stored = ctx.tasks.find_by_id(task.id).await.unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Completed);
    assert_eq!(stored.fail_count, 1);
    assert_eq!(stored.success_count, 1);
}

#[tokio::test]
async fn test_manager_drains_and_stops() {
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

    let scheduler = TaskScheduler::new(ctx.tasks.clone(), ctx.pipeline.clone(), fast_settings());
    let mut manager = WorkerManager::new(scheduler);
    manager.start();
    assert!(manager.is_running());

    let tasks = ctx.tasks.clone();
    tokio::time::timeout(Duration::from_secs(10), async move {
        loop {
            let stored = tasks.find_by_id(task.id).await.unwrap().unwrap();
            if stored.status == TaskStatus::Completed {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("task should complete");

    manager.shutdown(ShutdownMode::Drain).await;
    assert!(!manager.is_running());
}
