#![forbid(unsafe_code)]

//! Demo host screen for `statelayout`.
//!
//! Submits a fake request, shows the loading overlay while it runs, the
//! error overlay when it fails (tapping Retry after a pause) and the result
//! when it succeeds. Every state change is printed as a text frame.

pub mod cli;
pub mod error;
pub mod screen;

pub use cli::{run, run_from_env};
pub use error::{DemoError, Result};
