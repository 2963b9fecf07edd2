//! Core plumbing shared by every stage of a nightly run
//!
//! - **config**: nightly.toml parsing, defaults and validation
//! - **error**: error types with contextual help messages
//! - **process**: templated external commands with checked exit status

pub mod config;
pub mod error;
pub mod process;
