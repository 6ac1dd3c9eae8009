// ABOUTME: Re-exports domain constants from recipe-core
// ABOUTME: Title limits, placeholder texts, extension message types, and service names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use recipe_core::constants::*;
