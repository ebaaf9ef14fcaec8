//! Loan eligibility service core.
//!
//! Vertical slices live under [`workflows`]: `crime` resolves a letter grade for
//! a property address through a tiered fallback chain, and `lending` applies the
//! underwriting rules and persists the resulting application record.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
