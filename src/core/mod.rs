//! Core building blocks shared by every pipeline stage
//!
//! - **config**: modship.toml parsing and validation
//! - **context**: resolved project layout, built once in main.rs
//! - **error**: error taxonomy, exit codes and contextual help
//! - **vcs**: git operations through the system `git` binary

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
