// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::BrowserSettings;
use crate::engines::traits::{BrowserEngine, BrowserPage, EngineError, PageLink};
use async_trait::async_trait;
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

// Global browser instance to avoid re-launching Chrome for every task.
static BROWSER_INSTANCE: OnceCell<Browser> = OnceCell::const_new();

const COLLECT_LINKS: &str = "Array.from(document.querySelectorAll('a')).map(a => ({ \
    text: (a.textContent || '').trim(), \
    href: a.href || '' \
}))";

async fn get_browser(settings: &BrowserSettings) -> Result<&'static Browser, EngineError> {
    BROWSER_INSTANCE
        .get_or_try_init(|| async {
            let remote_debugging_url = settings
                .remote_debugging_url
                .clone()
                .or_else(|| std::env::var("CHROMIUM_REMOTE_DEBUGGING_URL").ok());

            let (browser, mut handler) = if let Some(ref url) = remote_debugging_url {
                info!("Connecting to remote Chrome instance at: {}", url);
                Browser::connect(url).await.map_err(|e| {
                    EngineError::Browser(format!("Failed to connect to remote Chrome: {}", e))
                })?
            } else {
                let mut builder = BrowserConfig::builder()
                    .no_sandbox()
                    .request_timeout(settings.request_timeout())
                    .arg("--disable-gpu")
                    .arg("--disable-dev-shm-usage");
                if !settings.headless {
                    builder = builder.with_head();
                }
                let config = builder.build().map_err(EngineError::Browser)?;
                Browser::launch(config)
                    .await
                    .map_err(|e| EngineError::Browser(e.to_string()))?
            };

            // Spawn a handler to process browser events
            tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            });

            Ok(browser)
        })
        .await
}

/// CDP 请求超时同样视为导航超时，交给上层按超时重试
fn navigation_error(url: &str, timeout: Duration, err: CdpError) -> EngineError {
    match err {
        CdpError::Timeout => EngineError::Timeout(timeout),
        other => EngineError::Navigation(format!("{}: {}", url, other)),
    }
}

/// 基于 chromiumoxide 的浏览器引擎
pub struct ChromiumEngine {
    settings: BrowserSettings,
}

impl ChromiumEngine {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn open_page(&self) -> Result<Box<dyn BrowserPage>, EngineError> {
        let browser = get_browser(&self.settings).await?;
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))?;
        Ok(Box::new(ChromiumPage { page }))
    }

    fn name(&self) -> &'static str {
        "chromium"
    }
}

/// chromiumoxide 页面
pub struct ChromiumPage {
    page: Page,
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), EngineError> {
        debug!("Navigating to {}", url);
        let navigation = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| navigation_error(url, timeout, e))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|e| navigation_error(url, timeout, e))?;
            Ok::<(), EngineError>(())
        };

        tokio::time::timeout(timeout, navigation)
            .await
            .map_err(|_| EngineError::Timeout(timeout))?
    }

    async fn content(&self) -> Result<String, EngineError> {
        self.page
            .content()
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))
    }

    async fn links(&self) -> Result<Vec<PageLink>, EngineError> {
        self.page
            .evaluate_expression(COLLECT_LINKS)
            .await
            .map_err(|e| EngineError::Browser(e.to_string()))?
            .into_value::<Vec<PageLink>>()
            .map_err(|e| EngineError::Browser(format!("Unexpected link payload: {}", e)))
    }

    async fn close(&self) -> Result<(), EngineError> {
        if let Err(e) = self.page.clone().close().await {
            warn!("Failed to close page: {}", e);
            return Err(EngineError::Browser(e.to_string()));
        }
        Ok(())
    }
}
