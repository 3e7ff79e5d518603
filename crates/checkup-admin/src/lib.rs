//! Admin client for checkup templates.

pub mod api;
pub mod cli;
pub mod cmd;
pub mod config;
