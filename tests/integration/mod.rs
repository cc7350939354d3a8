// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod backup_flow_test;
pub mod helpers;
pub mod jobs_api_test;
pub mod repos_api_test;
