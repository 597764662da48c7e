// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::repositories::task_repository::RepositoryError;
use crate::engines::traits::EngineError;
use thiserror::Error;

/// Worker错误类型
///
/// 页面流水线中导致整个任务失败的错误
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Browser error: {0}")]
    Engine(#[from] EngineError),

    #[error("Timed out fetching {url} after {attempts} attempts")]
    FetchTimeout { url: String, attempts: u32 },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// 应用层错误类型
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Export error: {0}")]
    Export(String),
}
