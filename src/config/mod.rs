// ABOUTME: Configuration module for the recipe assistant client
// ABOUTME: Environment-only settings, no configuration files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Environment variables and deployment mode
pub mod environment;

pub use environment::{ClientConfig, Environment};
