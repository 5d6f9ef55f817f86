// --- File: crates/services/carecard_backend/src/lib.rs ---
//! Router assembly for the CareCard server, kept out of `main` so it can be
//! driven by tests.

pub mod app;

pub use app::{build_router, AppServices};
