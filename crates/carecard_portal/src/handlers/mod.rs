// --- File: crates/carecard_portal/src/handlers/mod.rs ---
pub mod admin;
pub mod callcentre;
pub mod customer;
pub mod directory;
pub mod partner;
