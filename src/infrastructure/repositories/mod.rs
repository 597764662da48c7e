// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 仓库实现模块
///
/// 基于 SeaORM 的领域仓库接口实现
pub mod link_repo_impl;
pub mod progress_repo_impl;
pub mod scholarship_repo_impl;
pub mod task_repo_impl;

#[cfg(test)]
#[path = "repositories_test.rs"]
mod tests;
