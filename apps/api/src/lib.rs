//! ESG Platform API Library
//!
//! Companies record Environmental, Social and Governance metrics, derive
//! framework-aligned reports from them, run employee surveys and track
//! follow-up tasks. This library holds the domain logic, repositories,
//! authentication and the axum HTTP layer; `main.rs` only wires them up.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod state;
