// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库接口模块
///
/// 仓库接口定义了数据持久化的抽象契约，具体实现由基础设施层提供。
///
/// 包含的仓库接口：
/// - 任务仓库（task_repository）：任务的调度、状态转换和删除
/// - 进度仓库（progress_repository）：任务进度计数器
/// - 链接仓库（link_repository）：已分类链接
/// - 奖学金仓库（scholarship_repository）：奖学金记录的保存与查询
pub mod link_repository;
pub mod progress_repository;
pub mod scholarship_repository;
pub mod task_repository;
