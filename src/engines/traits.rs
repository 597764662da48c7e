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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 导航超时，页面流水线会对此类错误重试
    #[error("Timeout after {0:?}")]
    Timeout(Duration),
    /// 导航失败
    #[error("Navigation failed: {0}")]
    Navigation(String),
    /// 浏览器或页面本身出错
    #[error("Browser error: {0}")]
    Browser(String),
}

impl EngineError {
    /// 判断错误是否为超时
    pub fn is_timeout(&self) -> bool {
        matches!(self, EngineError::Timeout(_))
    }
}

/// 页面上的一个锚点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    /// 去除首尾空白后的锚点文本
    pub text: String,
    /// 浏览器解析后的 href
    pub href: String,
}

impl PageLink {
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: href.into(),
        }
    }
}

/// 浏览器引擎特质
///
/// 每个任务运行打开一个页面，运行结束时关闭
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    async fn open_page(&self) -> Result<Box<dyn BrowserPage>, EngineError>;

    /// 引擎名称
    fn name(&self) -> &'static str;
}

/// 浏览器页面特质
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// 导航到 `url` 并等待加载，超过 `timeout` 返回 [`EngineError::Timeout`]
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), EngineError>;

    /// 当前页面的完整 HTML
    async fn content(&self) -> Result<String, EngineError>;

    /// 当前页面上的全部锚点，按文档顺序
    async fn links(&self) -> Result<Vec<PageLink>, EngineError>;

    async fn close(&self) -> Result<(), EngineError>;
}
