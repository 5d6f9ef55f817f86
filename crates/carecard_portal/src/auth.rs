// --- File: crates/carecard_portal/src/auth.rs ---

use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::Response,
};
use carecard_common::{AuthUser, CarecardError, JwtVerifier, Role};
use carecard_config::AppConfig;
use carecard_db::{DbClient, Profile, SqlProfileRepository};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::PortalError;

/// State shared by every portal handler.
#[derive(Clone)]
pub struct PortalState {
    pub config: Arc<AppConfig>,
    pub db: DbClient,
    pub jwt: JwtVerifier,
}

impl FromRef<PortalState> for JwtVerifier {
    fn from_ref(state: &PortalState) -> Self {
        state.jwt.clone()
    }
}

/// Middleware state: the portal state plus the roles one router admits.
#[derive(Clone)]
pub struct RoleGuard {
    pub state: PortalState,
    pub allowed: &'static [Role],
}

impl FromRef<RoleGuard> for JwtVerifier {
    fn from_ref(guard: &RoleGuard) -> Self {
        guard.state.jwt.clone()
    }
}

pub const ADMIN_ROLES: &[Role] = &[Role::Admin];
pub const PARTNER_ROLES: &[Role] = &[Role::Franchise, Role::Partner];
pub const CALL_CENTRE_ROLES: &[Role] = &[Role::CallCentre, Role::Admin];

/// Loads the caller's profile and checks its role against `allowed`.
pub async fn authorize(
    db: &DbClient,
    user: &AuthUser,
    allowed: &[Role],
) -> Result<Profile, PortalError> {
    let profile = SqlProfileRepository::new(db.clone())
        .find_by_id(&user.user_id)
        .await?
        .ok_or_else(|| PortalError::MissingProfile(user.user_id.clone()))?;

    if !allowed.contains(&profile.role) {
        warn!(
            "User {} with role {} refused (needs one of {:?})",
            user.user_id, profile.role, allowed
        );
        return Err(PortalError::Forbidden(profile.role));
    }
    Ok(profile)
}

/// Axum middleware guarding a portal router by role.
///
/// Rejects with 401 when the token is missing or invalid or the caller has no
/// profile, and 403 when the profile's role is not admitted. On success the
/// profile is placed in the request extensions for the handlers.
pub async fn require_role(
    State(guard): State<RoleGuard>,
    user: AuthUser,
    mut req: Request,
    next: Next,
) -> Result<Response, CarecardError> {
    let profile = authorize(&guard.state.db, &user, guard.allowed).await?;
    debug!("{} {} authorized as {}", req.method(), req.uri(), profile.role);
    req.extensions_mut().insert(profile);
    Ok(next.run(req).await)
}
