// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod billing;
pub mod catalog;

pub use billing::StripeClient;
pub use catalog::ExerciseCatalog;
