//! Administrative record store for served machine-learning models.
//!
//! Tracks serving endpoints, the algorithm versions behind them, each
//! algorithm's status history, and a log of inference calls with optional
//! feedback. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
