// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 浏览器引擎模块
///
/// `traits` 定义页面抓取所需的最小浏览器接口，
/// `chromium_engine` 为基于 chromiumoxide 的实现
pub mod chromium_engine;
pub mod traits;
