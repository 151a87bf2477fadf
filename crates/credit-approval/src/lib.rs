//! Credit scoring and loan approval for a lending back-office.
//!
//! The [`lending::eligibility`] module holds the pure decision engine; the rest of
//! [`lending`] wires it to a customer registry, a loan ledger, CSV seed imports and
//! an HTTP router.

pub mod config;
pub mod error;
pub mod lending;
pub mod telemetry;
