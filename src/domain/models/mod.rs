// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 抓取任务（task）：一个种子页面及其调度状态
/// - 任务进度（progress）：与任务一对一的计数器和状态
/// - 链接（scraped_link）：种子页面上发现并分类过的链接
/// - 奖学金（scholarship）：结构化后的奖学金记录及金额、日期规则
pub mod progress;
pub mod scholarship;
pub mod scraped_link;
pub mod task;
