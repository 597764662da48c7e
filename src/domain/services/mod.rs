// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 内容提取（content_extractor）：从页面 HTML 中切分候选奖学金文本块
/// - 链接分类（link_classifier）：判断链接是否指向奖学金页面
/// - LLM服务（llm_service）：推理服务特质及其 HTTP 实现
/// - 结构化提取（scholarship_extractor）：把文本块转换为奖学金记录
pub mod content_extractor;
pub mod link_classifier;
pub mod llm_service;
pub mod scholarship_extractor;
