// region:    --- Imports
use crate::auction::commands::{
    handle_cancel_auction, handle_create_auction, handle_publish_auction,
    handle_reinstate_auction, handle_suspend_auction, handle_update_auction,
    CreateAuctionCommand, UpdateAuctionCommand,
};
use crate::auction::model::AuctionStatus;
use crate::bidding::commands::{handle_buy_now, handle_place_bid, BuyNowCommand, PlaceBidCommand};
use crate::config::Config;
use crate::database::DatabaseManager;
use crate::error::{Error, Result};
use crate::query;
use crate::store::PostgresAuctionStore;
use crate::users::commands::{handle_register_user, RegisterUserCommand};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

/// 모든 핸들러가 공유하는 상태
pub type AppState = (Arc<DatabaseManager>, Arc<Config>);

/// 질의 문자열의 상태 필터 해석
fn parse_status(status: Option<String>) -> Result<Option<AuctionStatus>> {
    status
        .map(|s| {
            s.parse::<AuctionStatus>()
                .map_err(|_| Error::Validation(format!("알 수 없는 경매 상태: {s}")))
        })
        .transpose()
}

// region:    --- User Handlers

/// 회원 가입 요청 처리
pub async fn handle_register(
    State((db_manager, _)): State<AppState>,
    Json(cmd): Json<RegisterUserCommand>,
) -> Result<impl IntoResponse> {
    let user = handle_register_user(cmd, &db_manager).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// 모든 사용자 조회
pub async fn handle_get_users(
    State((db_manager, _)): State<AppState>,
) -> Result<impl IntoResponse> {
    let users = query::handlers::get_all_users(&db_manager).await?;
    Ok(Json(users))
}

/// 사용자 조회
pub async fn handle_get_user(
    State((db_manager, _)): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let user = query::handlers::get_user(&db_manager, user_id)
        .await?
        .ok_or(Error::UserNotFound(user_id))?;
    Ok(Json(user))
}

/// 사용자의 판매 경매 조회
pub async fn handle_get_user_auctions(
    State((db_manager, _)): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let auctions = query::handlers::find_by_seller(&db_manager, user_id).await?;
    Ok(Json(auctions))
}

/// 사용자가 최고 입찰자인 경매 조회
pub async fn handle_get_user_winning(
    State((db_manager, _)): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let auctions = query::handlers::find_by_highest_bidder(&db_manager, user_id).await?;
    Ok(Json(auctions))
}

#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub identifier: String,
}

/// 이메일 또는 사용자 이름으로 사용자 조회 (로그인 전 확인용)
pub async fn handle_lookup_user(
    State((db_manager, _)): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<impl IntoResponse> {
    // 일치하는 사용자가 없으면 null
    let user = query::handlers::find_user_by_identifier(&db_manager, params.identifier).await?;
    Ok(Json(user))
}

/// 사용자 판매 통계 조회
pub async fn handle_get_user_stats(
    State((db_manager, _)): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let auction_count = query::handlers::count_by_seller(&db_manager, user_id).await?;
    Ok(Json(serde_json::json!({
        "user_id": user_id,
        "auction_count": auction_count,
    })))
}

// endregion: --- User Handlers

// region:    --- Auction Command Handlers

/// 경매 등록 요청 처리
pub async fn handle_create(
    State((db_manager, _)): State<AppState>,
    Json(cmd): Json<CreateAuctionCommand>,
) -> Result<impl IntoResponse> {
    let auction = handle_create_auction(cmd, &db_manager).await?;
    Ok((StatusCode::CREATED, Json(auction)))
}

/// 경매 수정 요청 처리
pub async fn handle_update(
    State((db_manager, _)): State<AppState>,
    Path(auction_id): Path<i64>,
    Json(cmd): Json<UpdateAuctionCommand>,
) -> Result<impl IntoResponse> {
    let store = PostgresAuctionStore::new(db_manager.get_pool());
    let auction = handle_update_auction(auction_id, cmd, &store, &db_manager).await?;
    Ok(Json(auction))
}

/// 경매 공개 요청 처리
pub async fn handle_publish(
    State((db_manager, config)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let store = PostgresAuctionStore::new(db_manager.get_pool());
    let auction = handle_publish_auction(auction_id, &store, &config).await?;
    Ok(Json(auction))
}

/// 경매 취소 요청 처리
pub async fn handle_cancel(
    State((db_manager, config)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let store = PostgresAuctionStore::new(db_manager.get_pool());
    let auction = handle_cancel_auction(auction_id, &store, &config).await?;
    Ok(Json(auction))
}

/// 경매 중지 요청 처리
pub async fn handle_suspend(
    State((db_manager, config)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let store = PostgresAuctionStore::new(db_manager.get_pool());
    let auction = handle_suspend_auction(auction_id, &store, &config).await?;
    Ok(Json(auction))
}

/// 경매 재개 요청 처리
pub async fn handle_reinstate(
    State((db_manager, config)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let store = PostgresAuctionStore::new(db_manager.get_pool());
    let auction = handle_reinstate_auction(auction_id, &store, &config).await?;
    Ok(Json(auction))
}

// endregion: --- Auction Command Handlers

// region:    --- Bid Command Handlers

/// 입찰 요청 처리
pub async fn handle_bid(
    State((db_manager, config)): State<AppState>,
    Json(cmd): Json<PlaceBidCommand>,
) -> Result<impl IntoResponse> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Handler", cmd);
    let store = PostgresAuctionStore::new(db_manager.get_pool());
    let result = handle_place_bid(cmd, &store, &config).await?;
    Ok(Json(serde_json::json!({
        "message": "입찰이 성공적으로 처리되었습니다.",
        "result": result,
    })))
}

/// 즉시 구매 요청 처리
pub async fn handle_buy_now_request(
    State((db_manager, config)): State<AppState>,
    Json(cmd): Json<BuyNowCommand>,
) -> Result<impl IntoResponse> {
    info!("{:<12} --> 즉시 구매 요청 처리 시작: {:?}", "Handler", cmd);
    let store = PostgresAuctionStore::new(db_manager.get_pool());
    let result = handle_buy_now(cmd, &store, &config).await?;
    Ok(Json(serde_json::json!({
        "message": "즉시 구매가 성공적으로 처리되었습니다.",
        "result": result,
    })))
}

// endregion: --- Bid Command Handlers

// region:    --- Query Handlers

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EndingSoonParams {
    pub minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PriceRangeParams {
    pub min: i64,
    pub max: i64,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct WatchDelta {
    pub delta: i64,
}

/// 경매 목록 조회 (상태 필터는 선택)
pub async fn handle_get_auctions(
    State((db_manager, _)): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Result<impl IntoResponse> {
    let auctions = match parse_status(params.status)? {
        Some(status) => query::handlers::find_by_status(&db_manager, status).await?,
        None => query::handlers::get_all_auctions(&db_manager).await?,
    };
    Ok(Json(auctions))
}

/// 경매 단건 조회. 조회 수를 증가시킨다.
pub async fn handle_get_auction(
    State((db_manager, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let auction = query::handlers::get_auction(&db_manager, auction_id)
        .await?
        .ok_or(Error::AuctionNotFound(auction_id))?;
    query::handlers::increment_view_count(&db_manager, auction_id).await?;
    Ok(Json(auction))
}

/// 진행 중 경매 조회
pub async fn handle_get_active(
    State((db_manager, _)): State<AppState>,
) -> Result<impl IntoResponse> {
    let auctions = query::handlers::find_active_auctions(&db_manager, Utc::now()).await?;
    Ok(Json(auctions))
}

/// 마감 임박 경매 조회 (기본 60분)
pub async fn handle_get_ending_soon(
    State((db_manager, _)): State<AppState>,
    Query(params): Query<EndingSoonParams>,
) -> Result<impl IntoResponse> {
    let minutes = params.minutes.unwrap_or(60);
    if minutes <= 0 {
        return Err(Error::Validation(
            "minutes는 양수여야 합니다".to_string(),
        ));
    }
    let auctions =
        query::handlers::find_ending_soon(&db_manager, Utc::now(), Duration::minutes(minutes))
            .await?;
    Ok(Json(auctions))
}

/// 추천 경매 조회
pub async fn handle_get_featured(
    State((db_manager, _)): State<AppState>,
) -> Result<impl IntoResponse> {
    let auctions = query::handlers::find_featured_active(&db_manager).await?;
    Ok(Json(auctions))
}

/// 경매 검색
pub async fn handle_search(
    State((db_manager, _)): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse> {
    let status = parse_status(params.status)?;
    let auctions = query::handlers::search_auctions(&db_manager, params.q, status).await?;
    Ok(Json(auctions))
}

/// 가격 범위 조회
pub async fn handle_price_range(
    State((db_manager, _)): State<AppState>,
    Query(params): Query<PriceRangeParams>,
) -> Result<impl IntoResponse> {
    if params.min < 0 || params.max < params.min {
        return Err(Error::Validation(
            "가격 범위가 올바르지 않습니다".to_string(),
        ));
    }
    let status = parse_status(params.status)?;
    let auctions =
        query::handlers::find_by_price_range(&db_manager, params.min, params.max, status).await?;
    Ok(Json(auctions))
}

/// 인기순 조회
pub async fn handle_get_popular(
    State((db_manager, _)): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Result<impl IntoResponse> {
    let status = parse_status(params.status)?;
    let auctions = query::handlers::find_by_popularity(&db_manager, status).await?;
    Ok(Json(auctions))
}

/// 최근 등록 경매 조회 (기본 10건)
pub async fn handle_get_recent(
    State((db_manager, _)): State<AppState>,
    Query(params): Query<LimitParams>,
) -> Result<impl IntoResponse> {
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let auctions = query::handlers::find_recent(&db_manager, limit).await?;
    Ok(Json(auctions))
}

/// 카테고리별 경매 조회
pub async fn handle_get_by_category(
    State((db_manager, _)): State<AppState>,
    Path(category): Path<String>,
    Query(params): Query<StatusParams>,
) -> Result<impl IntoResponse> {
    let status = parse_status(params.status)?;
    let auctions = query::handlers::find_by_category(&db_manager, category, status).await?;
    Ok(Json(auctions))
}

/// 입찰 없는 경매 조회
pub async fn handle_get_no_bids(
    State((db_manager, _)): State<AppState>,
) -> Result<impl IntoResponse> {
    let auctions = query::handlers::find_no_bid_auctions(&db_manager).await?;
    Ok(Json(auctions))
}

/// 입찰 이력 조회
pub async fn handle_get_bid_history(
    State((db_manager, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let bids = query::handlers::get_bid_history(&db_manager, auction_id).await?;
    Ok(Json(bids))
}

/// 최고 입찰가 조회
pub async fn handle_get_highest_bid(
    State((db_manager, _)): State<AppState>,
    Path(auction_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let highest = query::handlers::get_highest_bid(&db_manager, auction_id).await?;
    Ok(Json(serde_json::json!({ "highest_bid": highest })))
}

/// 관심 수 증감
pub async fn handle_watch(
    State((db_manager, _)): State<AppState>,
    Path(auction_id): Path<i64>,
    Json(body): Json<WatchDelta>,
) -> Result<impl IntoResponse> {
    query::handlers::update_watch_count(&db_manager, auction_id, body.delta).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 플랫폼 통계 조회
pub async fn handle_get_stats(
    State((db_manager, _)): State<AppState>,
) -> Result<impl IntoResponse> {
    use crate::auction::model::AuctionStatus::*;

    let mut by_status = serde_json::Map::new();
    for status in [Draft, Scheduled, Active, Completed, EndedNoSale, Cancelled, Suspended] {
        let count = query::handlers::count_by_status(&db_manager, status).await?;
        by_status.insert(status.to_string(), count.into());
    }
    let total_active_value = query::handlers::total_active_value(&db_manager).await?;
    let average_active_price = query::handlers::average_active_price(&db_manager).await?;
    let (total_users, verified_users) = query::handlers::count_users(&db_manager).await?;

    Ok(Json(serde_json::json!({
        "auctions_by_status": by_status,
        "total_active_value": total_active_value,
        "average_active_price": average_active_price,
        "total_users": total_users,
        "verified_users": verified_users,
    })))
}

// endregion: --- Query Handlers
