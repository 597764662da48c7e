// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{Duration, Utc};
use scholarrs::domain::models::task::{DomainError, ScrapingTask, TaskStatus};

fn task() -> ScrapingTask {
    ScrapingTask::new("https://uni.edu/aid".to_string())
}

#[test]
fn test_failed_task_waits_for_explicit_retry() {
    let failed = task().start().unwrap().fail("Timeout").unwrap();

    assert_eq!(failed.status, TaskStatus::Failed);
    assert_eq!(failed.fail_count, 1);
    assert!(!failed.is_eligible(Utc::now().into()));
    assert!(!failed.is_eligible((Utc::now() + Duration::days(30)).into()));

    let retried = failed.retry().unwrap();
    assert!(retried.is_eligible(Utc::now().into()));
    assert_eq!(retried.fail_count, 1);
}

#[test]
fn test_in_progress_task_cannot_start_again() {
    let running = task().start().unwrap();

    let err = running.clone().start().unwrap_err();
    assert_eq!(
        err,
        DomainError::InvalidStateTransition {
            from: TaskStatus::InProgress,
            to: TaskStatus::InProgress,
        }
    );
    assert!(!running.is_eligible(Utc::now().into()));
}

#[test]
fn test_completed_task_records_next_run_without_rescheduling() {
    let done = task()
        .start()
        .unwrap()
        .complete(Duration::hours(24))
        .unwrap();

    assert_eq!(done.next_run.unwrap() - done.last_run.unwrap(), Duration::hours(24));
    assert!(!done.is_eligible(Utc::now().into()));
    assert!(!done.is_eligible((Utc::now() + Duration::hours(25)).into()));
}

#[test]
fn test_retry_only_from_finished_states() {
    assert!(task().retry().is_err());

    let retried = task()
        .start()
        .unwrap()
        .complete(Duration::hours(24))
        .unwrap()
        .retry()
        .unwrap();
    assert_eq!(retried.status, TaskStatus::Pending);
    assert_eq!(retried.success_count, 1);
    assert!(retried.is_eligible(Utc::now().into()));
}

#[test]
fn test_reset_failed_clears_fail_count() {
    let reset = task()
        .start()
        .unwrap()
        .fail("Timeout")
        .unwrap()
        .reset_failed()
        .unwrap();

    assert_eq!(reset.status, TaskStatus::Pending);
    assert_eq!(reset.fail_count, 0);
    assert!(reset.error_message.is_none());
}
