// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据传输对象模块
///
/// 定义应用程序层返回给调用方的视图和报告
pub mod scholarship_dto;
pub mod task_dto;
