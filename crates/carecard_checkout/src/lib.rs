// --- File: crates/carecard_checkout/src/lib.rs ---

pub mod doc;
pub mod error;
pub mod handlers;
pub mod logic;
pub mod routes;

// Re-export for main backend
pub use error::CheckoutError;
pub use handlers::CheckoutState;
pub use logic::{
    CreateOrderRequest, CreateOrderResponse, PurchaseRequest, PurchaseSummary, TAX_RATE,
};
pub use routes::routes;
