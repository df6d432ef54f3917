//! Core numerics and infrastructure for mixed-layer ecosystem simulations.
//!
//! This crate is domain-neutral: it provides the hourly forcing series type,
//! the derivative-evaluator capability trait with a fixed-step fourth-order
//! Runge-Kutta integrator, the run configuration, and the error taxonomy.
//! The ecosystem model itself lives in `bloom-model`.

pub mod config;
pub mod errors;
pub mod ivp;
pub mod timeseries;
