// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

mod task_lifecycle_test;
mod telemetry_test;
mod text_block_test;
