// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 面向外部调用方的用例：任务录入、重试和删除，以及任务状态与奖学金的查询导出。
/// 该模块只编排领域仓库，不包含抓取逻辑
pub mod dto;
pub mod use_cases;
