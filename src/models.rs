// ABOUTME: Re-exports chat, recipe, and session models from recipe-core
// ABOUTME: Ensures wire-independent domain types are shared by the client and its tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use recipe_core::models::*;
