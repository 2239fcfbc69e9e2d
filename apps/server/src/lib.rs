//! HTTP server for fxlens: rate lookups, conversions and one-shot document
//! annotation over a SQLite-backed rate cache.

pub mod api;
pub mod config;
pub mod error;
pub mod main_lib;
pub mod scheduler;

pub use main_lib::{build_state, build_state_with, init_tracing, AppState};
