//! CLI commands for nightly-publish
//!
//! - **publish**: build every requested branch, publish its archives and
//!   regenerate the index page

pub mod publish;

pub use publish::{PublishOptions, run_publish};
