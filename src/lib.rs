//! Stream Manager Library
//!
//! Matches messy video names in a remote catalog against TMDB and renames
//! them to canonical, machine-checkable names, with an AI fallback parser
//! whose suggestions wait for manual approval.

pub mod cli;
pub mod core;
pub mod error;
pub mod generators;
pub mod models;
pub mod preflight;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
