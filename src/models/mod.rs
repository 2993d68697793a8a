//! Data models for the portfolio configuration backend.
//!
//! Wire names are camelCase to match the admin and public front ends.

mod pages;
mod record;
mod site;

pub use pages::*;
pub use record::*;
pub use site::*;
