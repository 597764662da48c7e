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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// 应用程序配置设置
///
/// 包含数据库、LLM、浏览器、工作器、指标和日志等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 数据库配置
    pub database: DatabaseSettings,
    /// LLM 推理服务配置
    pub llm: LlmSettings,
    /// 浏览器配置
    pub browser: BrowserSettings,
    /// 工作器配置
    pub worker: WorkerSettings,
    /// 指标导出配置
    pub metrics: MetricsSettings,
    /// 日志配置
    pub logging: LoggingSettings,
}

/// 数据库配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// 数据库连接URL
    pub url: String,
    /// 最大连接数
    pub max_connections: Option<u32>,
    /// 最小连接数
    pub min_connections: Option<u32>,
    /// 连接超时时间（秒）
    pub connect_timeout: Option<u64>,
    /// 空闲连接超时时间（秒）
    pub idle_timeout: Option<u64>,
}

/// LLM 配置设置
///
/// 兼容 OpenAI chat completions 接口的推理服务
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
}

/// 浏览器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSettings {
    /// 远程 Chrome 调试地址，为空时本地启动
    pub remote_debugging_url: Option<String>,
    pub headless: bool,
    /// 单条 CDP 命令的超时（秒），应大于 `worker.fetch_timeout_secs`
    pub request_timeout_secs: u64,
}

impl BrowserSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 工作器配置
///
/// 在启动时读取一次，之后以不可变值传入调度器和页面流水线
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerSettings {
    /// 每轮调度的最大任务数
    pub batch_size: u64,
    /// 轮询间隔（秒）
    pub poll_interval_secs: u64,
    /// 种子页面文本块分块大小
    pub chunk_size: usize,
    /// 页面导航超时（秒）
    pub fetch_timeout_secs: u64,
    /// 超时后的最大重试次数
    pub max_fetch_retries: u32,
    /// 重试间隔（秒）
    pub retry_delay_secs: u64,
    /// 并发批处理的批大小
    pub extraction_batch_size: usize,
    /// 置信度阈值，低于 0.6 的值会被抬高到 0.6
    pub confidence_threshold: f64,
    /// 成功后再次抓取的间隔（小时）
    pub rescrape_interval_hours: i64,
}

/// 指标导出配置
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsSettings {
    pub enabled: bool,
    pub listen_addr: String,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// 是否输出 JSON 格式日志
    pub json: bool,
}

/// 置信度下限，任何配置都不能低于此值
pub const MIN_CONFIDENCE: f64 = 0.6;

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            batch_size: 5,
            poll_interval_secs: 60,
            chunk_size: 1000,
            fetch_timeout_secs: 60,
            max_fetch_retries: 3,
            retry_delay_secs: 5,
            extraction_batch_size: 5,
            confidence_threshold: MIN_CONFIDENCE,
            rescrape_interval_hours: 24,
        }
    }
}

impl WorkerSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// 实际生效的置信度阈值
    pub fn effective_confidence_threshold(&self) -> f64 {
        self.confidence_threshold.max(MIN_CONFIDENCE)
    }
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次叠加默认值、`config/default`、`config/{APP_ENVIRONMENT}` 和
    /// `SCHOLARRS__` 前缀的环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("SCHOLARRS").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// 从指定文件加载配置（叠加在默认值之上）
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name(path))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let worker = WorkerSettings::default();
        Config::builder()
            // Default DB settings
            .set_default("database.url", "sqlite://scholarrs.db?mode=rwc")?
            .set_default("database.max_connections", 20)?
            .set_default("database.min_connections", 1)?
            .set_default("database.connect_timeout", 10)?
            .set_default("database.idle_timeout", 300)?
            // Default LLM settings
            .set_default("llm.model", "gpt-3.5-turbo")?
            .set_default("llm.api_base_url", "https://api.openai.com/v1")?
            .set_default("llm.request_timeout_secs", 60)?
            // Default browser settings
            .set_default("browser.headless", true)?
            .set_default("browser.request_timeout_secs", 90)?
            // Default worker settings
            .set_default("worker.batch_size", worker.batch_size)?
            .set_default("worker.poll_interval_secs", worker.poll_interval_secs)?
            .set_default("worker.chunk_size", worker.chunk_size as u64)?
            .set_default("worker.fetch_timeout_secs", worker.fetch_timeout_secs)?
            .set_default("worker.max_fetch_retries", worker.max_fetch_retries)?
            .set_default("worker.retry_delay_secs", worker.retry_delay_secs)?
            .set_default(
                "worker.extraction_batch_size",
                worker.extraction_batch_size as u64,
            )?
            .set_default("worker.confidence_threshold", worker.confidence_threshold)?
            .set_default(
                "worker.rescrape_interval_hours",
                worker.rescrape_interval_hours,
            )?
            // Default metrics settings
            .set_default("metrics.enabled", true)?
            .set_default("metrics.listen_addr", "0.0.0.0:9000")?
            .set_default("logging.json", false)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
