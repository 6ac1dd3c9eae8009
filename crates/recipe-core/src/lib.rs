// ABOUTME: Core types and constants for the recipe assistant conversation client
// ABOUTME: Foundation crate with error handling, chat/recipe domain models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Recipe Core
//!
//! Foundation crate providing shared types and constants for the recipe
//! assistant client. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Domain constants (title limits, placeholders, message types)
//! - **models**: Chat messages, sessions, recipes, and products

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (`ChatMessage`, `Recipe`, `Product`, sessions)
pub mod models;
