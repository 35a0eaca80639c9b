//! # Polytax — FIFO capital-gains engine for prediction-market tokens
//!
//! ```text
//!  activity feed ──▶ engine::normalizer ──▶ engine::fifo ──▶ engine::worthless ──▶ engine::summary
//!                                                                  ▲
//!                                            resolution::MarketResolver (Gamma / static)
//! ```
//!
//! The library holds the pure core plus the HTTP layer; `main.rs` only wires
//! configuration, logging and the listener.

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod resolution;
pub mod routes;
pub mod state;

pub use engine::{build_report, generate_report};
