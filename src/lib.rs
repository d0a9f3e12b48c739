//! parlance: note storage with on-demand translation behind an eagerly
//! invalidated cache.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
