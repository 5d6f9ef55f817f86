// --- File: crates/carecard_portal/src/lib.rs ---
//! Customer, admin, partner and call-centre endpoints.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;

pub use auth::{authorize, require_role, PortalState, RoleGuard};
pub use error::PortalError;
pub use routes::routes;
