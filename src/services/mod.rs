// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod activity;
pub mod aggregate;
pub mod calculator;
pub mod factors;
pub mod recalc;
pub mod validate;

pub use activity::ActivityService;
pub use aggregate::summarize;
pub use calculator::compute;
pub use factors::{FactorTable, FactorTableError};
pub use recalc::{Co2eDisplay, RecalcOutcome, RecalculationController};
pub use validate::{validate, ValidatedRecord};
