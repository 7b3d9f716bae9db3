//! Core business logic modules.

pub mod cache;
pub mod cleaner;
pub mod duplicates;
pub mod jobs;
pub mod matcher;
pub mod organize;
pub mod parser;
pub mod rename;
