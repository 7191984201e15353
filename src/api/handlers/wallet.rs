//! Mobile-app wallet handlers
//!
//! Top-up is a recorded stub: `topup` writes a pending ledger row and
//! returns its id as the order id, `verify-payment` settles it and
//! credits the balance. No payment gateway is contacted.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::dto::{ApiResponse, TransactionDto, WalletDto};
use crate::api::handlers::gate::domain_error_response;
use crate::application::WalletService;
use crate::auth::middleware::AuthenticatedUser;

/// State for wallet handlers
#[derive(Clone)]
pub struct WalletHandlerState {
    pub wallet: Arc<WalletService>,
}

type HandlerError = (StatusCode, Json<ApiResponse<()>>);

/// Wallet with recent ledger entries
#[derive(Debug, Serialize, ToSchema)]
pub struct WalletView {
    #[serde(flatten)]
    pub wallet: WalletDto,
    pub transactions: Vec<TransactionDto>,
}

/// Ledger page size
#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct WalletQuery {
    /// Max ledger entries to return. Default: 20
    #[serde(default = "default_txn_limit")]
    pub limit: u64,
}

fn default_txn_limit() -> u64 {
    20
}

/// Top-up order request
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({ "amount": 500 }))]
pub struct TopupRequest {
    /// Amount in minor currency units, must be positive
    pub amount: i64,
}

/// Top-up order
#[derive(Debug, Serialize, ToSchema)]
pub struct TopupOrder {
    /// Pass back in `verify-payment`
    pub order_id: i32,
    pub amount: i64,
}

/// Payment confirmation request
#[derive(Debug, Deserialize, ToSchema)]
#[schema(example = json!({ "order_id": 17, "payment_ref": "PAY-2024-0001" }))]
pub struct VerifyPaymentRequest {
    pub order_id: i32,
    /// External payment reference recorded on the ledger row
    pub payment_ref: String,
}

/// Current user's wallet
///
/// Created on first access with a zero balance.
#[utoipa::path(
    get,
    path = "/api/v1/app/wallet",
    tag = "Wallet",
    security(("bearer_auth" = [])),
    params(WalletQuery),
    responses(
        (status = 200, description = "Balance and recent ledger entries", body = ApiResponse<WalletView>)
    )
)]
pub async fn get_wallet(
    State(state): State<WalletHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<WalletQuery>,
) -> Result<Json<ApiResponse<WalletView>>, HandlerError> {
    let wallet = state
        .wallet
        .get_wallet(&user.user_id)
        .await
        .map_err(domain_error_response)?;
    let transactions = state
        .wallet
        .transactions(&user.user_id, query.limit.clamp(1, 100))
        .await
        .map_err(domain_error_response)?;

    Ok(Json(ApiResponse::success(WalletView {
        wallet: wallet.into(),
        transactions: transactions.into_iter().map(TransactionDto::from).collect(),
    })))
}

/// Start a wallet top-up
///
/// Records a pending ledger entry and returns the order id. The balance
/// is unchanged until `verify-payment`.
#[utoipa::path(
    post,
    path = "/api/v1/app/wallet/topup",
    tag = "Wallet",
    security(("bearer_auth" = [])),
    request_body = TopupRequest,
    responses(
        (status = 200, description = "Pending order created", body = ApiResponse<TopupOrder>),
        (status = 400, description = "Non-positive amount")
    )
)]
pub async fn start_topup(
    State(state): State<WalletHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<TopupRequest>,
) -> Result<Json<ApiResponse<TopupOrder>>, HandlerError> {
    let pending = state
        .wallet
        .start_topup(&user.user_id, request.amount)
        .await
        .map_err(domain_error_response)?;

    Ok(Json(ApiResponse::success(TopupOrder {
        order_id: pending.id,
        amount: pending.amount,
    })))
}

/// Confirm a top-up payment
///
/// Settles the pending order and credits the balance. Settling the same
/// order twice returns 409.
#[utoipa::path(
    post,
    path = "/api/v1/app/wallet/verify-payment",
    tag = "Wallet",
    security(("bearer_auth" = [])),
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Balance credited", body = ApiResponse<WalletDto>),
        (status = 404, description = "Unknown order"),
        (status = 409, description = "Order already settled")
    )
)]
pub async fn verify_payment(
    State(state): State<WalletHandlerState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<Json<ApiResponse<WalletDto>>, HandlerError> {
    let wallet = state
        .wallet
        .confirm_topup(&user.user_id, request.order_id, &request.payment_ref)
        .await
        .map_err(domain_error_response)?;
    Ok(Json(ApiResponse::success(wallet.into())))
}
