// --- File: crates/carecard_razorpay/src/lib.rs ---

pub mod error;
pub mod logic;
pub mod service;

pub use error::RazorpayError;
pub use logic::{create_order, payment_signature, verify_payment_signature};
pub use service::RazorpayGateway;
