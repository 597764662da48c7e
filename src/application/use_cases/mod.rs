// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod scholarship_queries;
pub mod task_management;

pub use scholarship_queries::ScholarshipService;
pub use task_management::TaskService;
