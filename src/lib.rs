//! Backend for Sparkle - turns a user's message into a set of styled images
//!
//! A submission (message, mood, season, keywords) is translated, enriched with
//! extracted key phrases and rendered into one image per visual style. The
//! images are re-hosted on the CDN before their URLs are returned.

pub mod ai;
pub mod api;
pub mod cdn;
pub mod error;
pub mod generator;
pub mod models;
pub mod persist;
pub mod prompts;
pub mod retry;
pub mod themes;

pub use error::{Error, Result};
