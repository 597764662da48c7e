// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工作器模块
///
/// 提供后台任务处理和工作器管理功能
/// 包括单任务页面流水线、轮询调度和工作器生命周期管理
pub mod manager;
pub mod scheduler;
pub mod scrape_worker;
pub mod worker;

pub use manager::{ShutdownMode, WorkerManager};
pub use scheduler::TaskScheduler;
pub use scrape_worker::{LinkOutcome, ScrapeWorker};
pub use worker::Worker;
