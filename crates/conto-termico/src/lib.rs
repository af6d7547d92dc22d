//! Incentive calculation engine for the Conto Termico 3.0 scheme.
//!
//! The crate resolves who is applying into an operator class, evaluates the per-intervention
//! incentive formulas, and combines several interventions into a single capped quote.

pub mod config;
pub mod error;
pub mod incentives;
pub mod telemetry;
