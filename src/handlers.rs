// region:    --- Imports
use crate::admin::{self, Caller};
use crate::auction::model::{Bid, Lot, NewLot, PricingOption};
use crate::bidding::commands::{handle_place_bid, PlaceBidCommand};
use crate::bidding::validator::BidValidator;
use crate::error::AuctionError;
use crate::pricing::charge::{submit_message_charge, MessageOrder, MessageReceipt};
use crate::store::{AuctionBackend, BidReceipt};
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

// endregion: --- Imports

// region:    --- App State
/// 핸들러 공유 상태
#[derive(Clone)]
pub struct AppState {
    backend: Arc<dyn AuctionBackend>,
    validator: BidValidator,
}

impl AppState {
    pub fn new(backend: Arc<dyn AuctionBackend>, validator: BidValidator) -> Self {
        Self { backend, validator }
    }
}

/// 라우터 구성
pub fn router(state: AppState) -> Router {
    // 관람용 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/lots", get(handle_get_lots))
        .route("/lots/:id", get(handle_get_lot))
        .route("/lots/:id/bids", get(handle_get_bids).post(handle_bid))
        .route("/options", get(handle_get_options))
        .route("/messages", post(handle_message))
        .route("/admin/lots", post(handle_create_lot))
        .route("/admin/lots/:id/active", post(handle_set_active))
        .layer(cors)
        .with_state(state)
}

// endregion: --- App State

// region:    --- Command Handlers
/// 입찰 요청 처리
pub async fn handle_bid(
    State(state): State<AppState>,
    Path(lot_id): Path<i64>,
    Json(cmd): Json<PlaceBidCommand>,
) -> Result<Json<BidReceipt>, AuctionError> {
    let receipt = handle_place_bid(lot_id, cmd, state.backend.as_ref(), &state.validator).await?;
    Ok(Json(receipt))
}

/// 메시지 청구 요청 처리
pub async fn handle_message(
    State(state): State<AppState>,
    Json(order): Json<MessageOrder>,
) -> Result<Json<MessageReceipt>, AuctionError> {
    info!(
        "{:<12} --> 메시지 청구 요청: option={} quick={} video={}",
        "Command", order.option_id, order.quick, order.video
    );
    let receipt = submit_message_charge(state.backend.as_ref(), order).await?;
    Ok(Json(receipt))
}

/// 로트 생성 (관리자)
pub async fn handle_create_lot(
    State(state): State<AppState>,
    caller: Caller,
    Json(new_lot): Json<NewLot>,
) -> Result<Json<Lot>, AuctionError> {
    let lot = admin::create_lot(state.backend.as_ref(), &caller, new_lot).await?;
    Ok(Json(lot))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// 로트 활성 상태 변경 (관리자)
pub async fn handle_set_active(
    State(state): State<AppState>,
    caller: Caller,
    Path(lot_id): Path<i64>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<Lot>, AuctionError> {
    let lot = admin::set_lot_active(state.backend.as_ref(), &caller, lot_id, req.is_active).await?;
    Ok(Json(lot))
}

// endregion: --- Command Handlers

// region:    --- Query Handlers
/// 모든 로트 조회
pub async fn handle_get_lots(State(state): State<AppState>) -> Result<Json<Vec<Lot>>, AuctionError> {
    info!("{:<12} --> 모든 로트 조회", "HandlerQuery");
    Ok(Json(state.backend.fetch_lots().await?))
}

/// 로트 조회
pub async fn handle_get_lot(
    State(state): State<AppState>,
    Path(lot_id): Path<i64>,
) -> Result<Json<Lot>, AuctionError> {
    info!("{:<12} --> 로트 조회 id: {}", "HandlerQuery", lot_id);
    Ok(Json(state.backend.fetch_lot(lot_id).await?))
}

/// 입찰 이력 조회
pub async fn handle_get_bids(
    State(state): State<AppState>,
    Path(lot_id): Path<i64>,
) -> Result<Json<Vec<Bid>>, AuctionError> {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "HandlerQuery", lot_id);
    Ok(Json(state.backend.fetch_bids(lot_id).await?))
}

/// 메시지 가격 옵션 조회
pub async fn handle_get_options(
    State(state): State<AppState>,
) -> Result<Json<Vec<PricingOption>>, AuctionError> {
    info!("{:<12} --> 가격 옵션 조회", "HandlerQuery");
    Ok(Json(state.backend.fetch_options().await?))
}

// endregion: --- Query Handlers
