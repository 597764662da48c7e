use super::helpers::{context, fast_settings, MockInference, Site, EXTRACTION_JSON, SEED_URL};
use scholarrs::application::use_cases::{ScholarshipService, TaskService};
use scholarrs::domain::models::task::TaskStatus;
use scholarrs::domain::repositories::scholarship_repository::ScholarshipFilter;
use scholarrs::workers::TaskScheduler;

#[tokio::test]
async fn test_ingest_scrape_and_export() {
    let ctx = context(
        Site::scholarship_site(),
        MockInference::new(EXTRACTION_JSON),
        fast_settings(),
    )
    .await;
    let tasks = TaskService::new(ctx.tasks.clone(), ctx.progress.clone());
    let scholarships = ScholarshipService::new(ctx.scholarships.clone());

    let report = tasks
        .create_tasks_from_text(&format!("url\n{}\nnot-a-url\n", SEED_URL))
        .await
        .unwrap();
    assert_eq!(report.added, 1);

    let listed = tasks.list_tasks(0, 10).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, TaskStatus::Pending);

    let scheduler = TaskScheduler::new(ctx.tasks.clone(), ctx.pipeline.clone(), fast_settings());
    scheduler.poll_once().await.unwrap();

    let view = tasks.task_progress(listed[0].task_id).await.unwrap();
    assert_eq!(view.status, TaskStatus::Completed);
    assert_eq!(view.scholarships_found, 1);
    assert_eq!(view.percentage, 100.0);

    let summary = tasks.status_summary().await.unwrap();
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.success_rate, 100.0);

    let filter = ScholarshipFilter {
        field_of_study: Some("engineer".to_string()),
        ..Default::default()
    };
    let found = scholarships.list(&filter, 0, 10).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(scholarships.get(found[0].id).await.unwrap().title, found[0].title);

    let csv = scholarships.export_csv(None, None).await.unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("Engineering Excellence Award"));

    // 已完成的任务可以手动重试
    let retried = tasks.retry_task(listed[0].task_id).await.unwrap();
    assert_eq!(retried.status, TaskStatus::Pending);
    let view = tasks.task_progress(retried.id).await.unwrap();
    assert_eq!(view.processed_links, 0);
}
