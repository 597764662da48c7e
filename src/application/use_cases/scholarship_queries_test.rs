use super::*;
use crate::domain::models::scholarship::AmountType;
use crate::domain::models::task::ScrapingTask;
use crate::domain::repositories::task_repository::TaskRepository;
use crate::infrastructure::repositories::{
    scholarship_repo_impl::ScholarshipRepositoryImpl, task_repo_impl::TaskRepositoryImpl,
};
use chrono::{Duration, NaiveDate, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;

async fn service() -> (
    ScholarshipService<ScholarshipRepositoryImpl>,
    Arc<ScholarshipRepositoryImpl>,
    Uuid,
) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    let db = Arc::new(db);
    let task = TaskRepositoryImpl::new(db.clone())
        .create(&ScrapingTask::new("https://uni.edu/aid".to_string()))
        .await
        .unwrap();
    let repo = Arc::new(ScholarshipRepositoryImpl::new(db));
    (ScholarshipService::new(repo.clone()), repo, task.id)
}

fn scholarship(task_id: Uuid, title: &str, confidence: f64, age: Duration) -> Scholarship {
    let created = (Utc::now() - age).into();
    Scholarship {
        id: Uuid::new_v4(),
        task_id,
        title: title.to_string(),
        amount: "$1,000".to_string(),
        amount_normalized_min: Some(1000.0),
        amount_normalized_max: Some(1000.0),
        amount_type: AmountType::Fixed,
        is_renewable: false,
        deadline: NaiveDate::from_ymd_opt(2030, 5, 1),
        field_of_study: "Engineering".to_string(),
        level_of_study: "Undergraduate".to_string(),
        eligibility_criteria: "GPA 3.0, full-time".to_string(),
        application_url: "https://uni.edu/apply".to_string(),
        source_url: "https://uni.edu/aid".to_string(),
        location_of_study: "Not specified".to_string(),
        ai_summary: serde_json::json!({ "confidence_score": confidence }),
        confidence_score: confidence,
        created_at: created,
        last_updated: created,
    }
}

#[tokio::test]
async fn test_get_missing_scholarship() {
    let (service, _, _) = service().await;
    let err = service.get(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn test_list_applies_filter_and_clamps_limit() {
    let (service, repo, task_id) = service().await;
    repo.save_with_progress(&scholarship(task_id, "Strong", 0.9, Duration::zero()))
        .await
        .unwrap();
    repo.save_with_progress(&scholarship(task_id, "Weak", 0.65, Duration::zero()))
        .await
        .unwrap();

    let filter = ScholarshipFilter {
        min_confidence: Some(0.8),
        ..Default::default()
    };
    let found = service.list(&filter, 0, 50).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Strong");

    let all = service.list(&ScholarshipFilter::default(), 0, 0).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_export_respects_date_range() {
    let (service, repo, task_id) = service().await;
    repo.save_with_progress(&scholarship(task_id, "Old", 0.9, Duration::days(10)))
        .await
        .unwrap();
    repo.save_with_progress(&scholarship(task_id, "Recent", 0.9, Duration::hours(1)))
        .await
        .unwrap();

    let since = (Utc::now() - Duration::days(2)).into();
    let recent = service.export(Some(since), None).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].title, "Recent");

    let everything = service.export(None, None).await.unwrap();
    let titles: Vec<_> = everything.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Recent", "Old"]);
}

#[tokio::test]
async fn test_export_csv_has_header_and_rows() {
    let (service, repo, task_id) = service().await;
    repo.save_with_progress(&scholarship(task_id, "Merit Award", 0.9, Duration::zero()))
        .await
        .unwrap();

    let csv = service.export_csv(None, None).await.unwrap();
    let mut lines = csv.lines();

    assert_eq!(
        lines.next().unwrap(),
        "Title,Amount,Deadline,Field of Study,Level of Study,Eligibility Criteria,Application URL,Source URL,Confidence Score,Last Updated"
    );
    let row = lines.next().unwrap();
    assert!(row.starts_with("Merit Award,\"$1,000\",2030-05-01,Engineering,Undergraduate,\"GPA 3.0, full-time\","));
    assert!(row.contains("https://uni.edu/apply,https://uni.edu/aid,0.9,"));
    assert!(lines.next().is_none());
}

#[tokio::test]
async fn test_export_csv_empty_is_header_only() {
    let (service, _, _) = service().await;
    let csv = service.export_csv(None, None).await.unwrap();
    assert_eq!(csv.lines().count(), 1);
}
