// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use scholarrs::utils::telemetry;

#[test]
fn test_telemetry_initialization() {
    // 全局订阅器只能安装一次，整个测试二进制中只有这里调用
    telemetry::init_telemetry(false);

    tracing::debug!("This is a debug message");
    tracing::info!(task_id = "abc", url = "https://uni.edu/aid", "Starting to scrape URL");
    tracing::warn!("This is a warning message");
}
