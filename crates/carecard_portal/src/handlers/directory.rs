// --- File: crates/carecard_portal/src/handlers/directory.rs ---
use axum::extract::State;
use carecard_common::{handle_result, ApiResult, AuthUser};
use carecard_db::{City, Department, Franchise, SqlDirectoryRepository};

use crate::auth::PortalState;

pub async fn list_cities_handler(
    State(state): State<PortalState>,
    _user: AuthUser,
) -> ApiResult<Vec<City>> {
    handle_result(SqlDirectoryRepository::new(state.db).list_cities().await)
}

pub async fn list_departments_handler(
    State(state): State<PortalState>,
    _user: AuthUser,
) -> ApiResult<Vec<Department>> {
    handle_result(SqlDirectoryRepository::new(state.db).list_departments().await)
}

pub async fn list_franchises_handler(
    State(state): State<PortalState>,
    _user: AuthUser,
) -> ApiResult<Vec<Franchise>> {
    handle_result(SqlDirectoryRepository::new(state.db).list_franchises().await)
}
