// --- File: crates/carecard_portal/src/handlers/callcentre.rs ---
use axum::extract::{Path, Query, State};
use carecard_common::{handle_result, ApiResult};
use carecard_db::{MembershipView, ServiceRequest};
use tracing::debug;

use crate::auth::PortalState;
use crate::logic::{self, QueueQuery};

/// Looks up a member by the number printed on their e-card.
pub async fn lookup_ecard_handler(
    State(state): State<PortalState>,
    Path(card_number): Path<String>,
) -> ApiResult<MembershipView> {
    debug!("E-card lookup for {}", card_number);
    handle_result(logic::lookup_card(&state.db, &card_number).await)
}

/// Service-request queue, oldest first, optionally filtered by `?status=`.
pub async fn service_queue_handler(
    State(state): State<PortalState>,
    Query(query): Query<QueueQuery>,
) -> ApiResult<Vec<ServiceRequest>> {
    handle_result(logic::service_queue(&state.db, query).await)
}
