// --- File: crates/carecard_portal/src/handlers/partner.rs ---
//! Franchise and partner wallet endpoints. Every call acts on the caller's
//! own wallet, which is opened with a zero balance on first access.

use axum::{extract::State, Extension};
use carecard_common::{handle_result, ApiResponse, ApiResult, JsonBody};
use carecard_db::{Profile, SqlWalletRepository, Wallet, WalletTransaction, WithdrawalRequest};

use crate::auth::PortalState;
use crate::logic::{self, NewWithdrawal};

pub async fn wallet_handler(
    State(state): State<PortalState>,
    Extension(profile): Extension<Profile>,
) -> ApiResult<Wallet> {
    handle_result(
        SqlWalletRepository::new(state.db)
            .find_or_create(&profile.id)
            .await,
    )
}

pub async fn wallet_transactions_handler(
    State(state): State<PortalState>,
    Extension(profile): Extension<Profile>,
) -> ApiResult<Vec<WalletTransaction>> {
    let wallets = SqlWalletRepository::new(state.db);
    let wallet = wallets.find_or_create(&profile.id).await?;
    handle_result(wallets.list_transactions(&wallet.id).await)
}

pub async fn request_withdrawal_handler(
    State(state): State<PortalState>,
    Extension(profile): Extension<Profile>,
    JsonBody(payload): JsonBody<NewWithdrawal>,
) -> ApiResult<WithdrawalRequest> {
    let request = logic::request_withdrawal(&state.db, &profile.id, payload).await?;
    Ok(ApiResponse::created(request))
}

pub async fn list_withdrawals_handler(
    State(state): State<PortalState>,
    Extension(profile): Extension<Profile>,
) -> ApiResult<Vec<WithdrawalRequest>> {
    handle_result(
        SqlWalletRepository::new(state.db)
            .list_withdrawals_for_owner(&profile.id)
            .await,
    )
}
