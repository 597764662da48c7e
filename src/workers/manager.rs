// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::workers::Worker;
use std::sync::Arc;
use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// 关闭方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShutdownMode {
    /// 等待进行中的一批任务处理完毕
    #[default]
    Drain,
    /// 立即丢弃进行中的任务，这些任务可能停留在 in_progress，
    /// 需要通过 `reset_stale_tasks` 或手动重试恢复
    Abandon,
}

/// 工作管理器
///
/// 在后台任务中运行一个 [`Worker`]，并负责按 [`ShutdownMode`] 关闭它
pub struct WorkerManager<W>
where
    W: Worker + 'static,
{
    worker: Arc<W>,
    shutdown: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl<W> WorkerManager<W>
where
    W: Worker + 'static,
{
    pub fn new(worker: W) -> Self {
        Self {
            worker: Arc::new(worker),
            shutdown: CancellationToken::new(),
            handle: None,
        }
    }

    /// 启动工作器，重复调用无效
    pub fn start(&mut self) {
        if self.handle.is_some() {
            warn!("Worker {} already started", self.worker.name());
            return;
        }

        let worker = self.worker.clone();
        let token = self.shutdown.clone();
        self.handle = Some(tokio::spawn(async move {
            if let Err(e) = worker.run(token).await {
                error!("Worker {} exited with error: {}", worker.name(), e);
            }
        }));
        info!("Worker {} started", self.worker.name());
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// 取消令牌，可交给其他组件触发关闭
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// 关闭工作器
    pub async fn shutdown(&mut self, mode: ShutdownMode) {
        self.shutdown.cancel();

        let Some(handle) = self.handle.take() else {
            return;
        };

        info!("Shutting down worker {} ({:?})", self.worker.name(), mode);
        if mode == ShutdownMode::Abandon {
            handle.abort();
        }

        match handle.await {
            Ok(()) => info!("Worker shut down successfully"),
            Err(e) if e.is_cancelled() => info!("Worker aborted"),
            Err(e) => error!("Worker task panicked: {}", e),
        }
    }

    /// 等待 Ctrl-C 后按 `mode` 关闭
    pub async fn wait_for_shutdown(&mut self, mode: ShutdownMode) {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }
        self.shutdown(mode).await;
    }
}
