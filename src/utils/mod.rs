//! Utility modules.
//!
//! Provides:
//! - [`console`] - `tracing` output to the browser console
//! - [`format`] - Date, prompt, and home-relative path formatting

pub mod console;
pub mod format;
