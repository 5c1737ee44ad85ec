//! fintrack server: a personal-finance REST API.
//!
//! The interesting machinery lives in the workspace crates; this package
//! wires them into an axum application and a CLI.

pub mod auth;
pub mod cli;
pub mod config;
pub mod server;
