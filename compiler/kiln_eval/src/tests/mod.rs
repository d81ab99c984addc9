//! Crate-level test suites.
//!
//! Suites that span several modules (resolution feeding evaluation, the
//! optimizer checked against the evaluator) live here rather than next to a
//! single implementation file.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

mod closure_tests;
mod optimize_tests;
mod support;
