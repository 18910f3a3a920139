// region:    --- Imports
use super::queries;
use crate::auction::model::{Auction, AuctionStatus};
use crate::bidding::model::Bid;
use crate::database::DatabaseManager;
use crate::users::model::User;
use chrono::{DateTime, Duration, Utc};
use sqlx::Error as SqlxError;
use sqlx::Row;
use tracing::info;

// endregion: --- Imports

// region:    --- Auction Query Handlers

/// 경매 단건 조회
pub async fn get_auction(
    db_manager: &DatabaseManager,
    auction_id: i64,
) -> Result<Option<Auction>, SqlxError> {
    info!("{:<12} --> 경매 조회 id: {}", "Query", auction_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::GET_AUCTION)
                    .bind(auction_id)
                    .fetch_optional(&mut **tx)
                    .await
            })
        })
        .await
}

/// 모든 경매 조회
pub async fn get_all_auctions(db_manager: &DatabaseManager) -> Result<Vec<Auction>, SqlxError> {
    info!("{:<12} --> 모든 경매 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::GET_ALL_AUCTIONS)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 상태별 경매 조회
pub async fn find_by_status(
    db_manager: &DatabaseManager,
    status: AuctionStatus,
) -> Result<Vec<Auction>, SqlxError> {
    info!("{:<12} --> 상태별 경매 조회: {}", "Query", status);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::FIND_BY_STATUS)
                    .bind(status.as_str())
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 입찰 가능 시간 창 안의 ACTIVE 경매 조회
pub async fn find_active_auctions(
    db_manager: &DatabaseManager,
    now: DateTime<Utc>,
) -> Result<Vec<Auction>, SqlxError> {
    info!("{:<12} --> 진행 중 경매 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::FIND_ACTIVE_AUCTIONS)
                    .bind(now)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 마감 임박 경매 조회
pub async fn find_ending_soon(
    db_manager: &DatabaseManager,
    now: DateTime<Utc>,
    within: Duration,
) -> Result<Vec<Auction>, SqlxError> {
    info!(
        "{:<12} --> 마감 임박 경매 조회 ({}분 이내)",
        "Query",
        within.num_minutes()
    );
    let cutoff = now + within;
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::FIND_ENDING_SOON)
                    .bind(now)
                    .bind(cutoff)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 판매자별 경매 조회
pub async fn find_by_seller(
    db_manager: &DatabaseManager,
    seller_id: i64,
) -> Result<Vec<Auction>, SqlxError> {
    info!("{:<12} --> 판매자별 경매 조회 id: {}", "Query", seller_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::FIND_BY_SELLER)
                    .bind(seller_id)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 카테고리별 경매 조회
pub async fn find_by_category(
    db_manager: &DatabaseManager,
    category: String,
    status: Option<AuctionStatus>,
) -> Result<Vec<Auction>, SqlxError> {
    info!("{:<12} --> 카테고리별 경매 조회: {}", "Query", category);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::FIND_BY_CATEGORY)
                    .bind(category)
                    .bind(status.map(|s| s.as_str()))
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 추천 중인 ACTIVE 경매 조회
pub async fn find_featured_active(
    db_manager: &DatabaseManager,
) -> Result<Vec<Auction>, SqlxError> {
    info!("{:<12} --> 추천 경매 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::FIND_FEATURED_ACTIVE)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 특정 사용자가 최고 입찰자인 경매 조회
pub async fn find_by_highest_bidder(
    db_manager: &DatabaseManager,
    bidder_id: i64,
) -> Result<Vec<Auction>, SqlxError> {
    info!("{:<12} --> 최고 입찰자별 경매 조회 id: {}", "Query", bidder_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::FIND_BY_HIGHEST_BIDDER)
                    .bind(bidder_id)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 제목/설명 검색
pub async fn search_auctions(
    db_manager: &DatabaseManager,
    term: String,
    status: Option<AuctionStatus>,
) -> Result<Vec<Auction>, SqlxError> {
    info!("{:<12} --> 경매 검색: {}", "Query", term);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::SEARCH_AUCTIONS)
                    .bind(term)
                    .bind(status.map(|s| s.as_str()))
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 현재 가격 범위 조회
pub async fn find_by_price_range(
    db_manager: &DatabaseManager,
    min_price: i64,
    max_price: i64,
    status: Option<AuctionStatus>,
) -> Result<Vec<Auction>, SqlxError> {
    info!(
        "{:<12} --> 가격 범위 조회: {} ~ {}",
        "Query", min_price, max_price
    );
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::FIND_BY_PRICE_RANGE)
                    .bind(min_price)
                    .bind(max_price)
                    .bind(status.map(|s| s.as_str()))
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 인기순 조회
pub async fn find_by_popularity(
    db_manager: &DatabaseManager,
    status: Option<AuctionStatus>,
) -> Result<Vec<Auction>, SqlxError> {
    info!("{:<12} --> 인기순 경매 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::FIND_BY_POPULARITY)
                    .bind(status.map(|s| s.as_str()))
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 최근 등록 경매 조회
pub async fn find_recent(
    db_manager: &DatabaseManager,
    limit: i64,
) -> Result<Vec<Auction>, SqlxError> {
    info!("{:<12} --> 최근 등록 경매 조회 (최대 {})", "Query", limit);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::FIND_RECENT)
                    .bind(limit)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 입찰 없는 ACTIVE 경매 조회
pub async fn find_no_bid_auctions(
    db_manager: &DatabaseManager,
) -> Result<Vec<Auction>, SqlxError> {
    info!("{:<12} --> 입찰 없는 경매 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(queries::FIND_NO_BID)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 상태별 경매 수
pub async fn count_by_status(
    db_manager: &DatabaseManager,
    status: AuctionStatus,
) -> Result<i64, SqlxError> {
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_scalar::<_, i64>(queries::COUNT_BY_STATUS)
                    .bind(status.as_str())
                    .fetch_one(&mut **tx)
                    .await
            })
        })
        .await
}

/// 판매자별 경매 수
pub async fn count_by_seller(
    db_manager: &DatabaseManager,
    seller_id: i64,
) -> Result<i64, SqlxError> {
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_scalar::<_, i64>(queries::COUNT_BY_SELLER)
                    .bind(seller_id)
                    .fetch_one(&mut **tx)
                    .await
            })
        })
        .await
}

/// ACTIVE 경매 현재 가격 합계
pub async fn total_active_value(db_manager: &DatabaseManager) -> Result<i64, SqlxError> {
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_scalar::<_, i64>(queries::TOTAL_ACTIVE_VALUE)
                    .fetch_one(&mut **tx)
                    .await
            })
        })
        .await
}

/// ACTIVE 경매 현재 가격 평균
pub async fn average_active_price(db_manager: &DatabaseManager) -> Result<i64, SqlxError> {
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_scalar::<_, i64>(queries::AVERAGE_ACTIVE_PRICE)
                    .fetch_one(&mut **tx)
                    .await
            })
        })
        .await
}

/// 조회 수 증가 (읽기 경로 이벤트, 버전 검사 없음)
pub async fn increment_view_count(
    db_manager: &DatabaseManager,
    auction_id: i64,
) -> Result<(), SqlxError> {
    sqlx::query(queries::INCREMENT_VIEW_COUNT)
        .bind(auction_id)
        .execute(db_manager.pool())
        .await?;
    Ok(())
}

/// 관심 수 증감
pub async fn update_watch_count(
    db_manager: &DatabaseManager,
    auction_id: i64,
    delta: i64,
) -> Result<(), SqlxError> {
    sqlx::query(queries::UPDATE_WATCH_COUNT)
        .bind(auction_id)
        .bind(delta)
        .execute(db_manager.pool())
        .await?;
    Ok(())
}

// endregion: --- Auction Query Handlers

// region:    --- Bid Query Handlers

/// 입찰 이력 조회
pub async fn get_bid_history(
    db_manager: &DatabaseManager,
    auction_id: i64,
) -> Result<Vec<Bid>, SqlxError> {
    info!("{:<12} --> 입찰 이력 조회 id: {}", "Query", auction_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Bid>(queries::GET_BID_HISTORY)
                    .bind(auction_id)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 최고 입찰가 조회
pub async fn get_highest_bid(
    db_manager: &DatabaseManager,
    auction_id: i64,
) -> Result<Option<i64>, SqlxError> {
    info!("{:<12} --> 최고 입찰가 조회 id: {}", "Query", auction_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let result = sqlx::query(queries::GET_HIGHEST_BID)
                    .bind(auction_id)
                    .fetch_one(&mut **tx)
                    .await?;

                Ok(result.get("highest_bid"))
            })
        })
        .await
}

// endregion: --- Bid Query Handlers

// region:    --- User Query Handlers

/// 사용자 단건 조회
pub async fn get_user(
    db_manager: &DatabaseManager,
    user_id: i64,
) -> Result<Option<User>, SqlxError> {
    info!("{:<12} --> 사용자 조회 id: {}", "Query", user_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, User>(queries::GET_USER)
                    .bind(user_id)
                    .fetch_optional(&mut **tx)
                    .await
            })
        })
        .await
}

/// 모든 사용자 조회
pub async fn get_all_users(db_manager: &DatabaseManager) -> Result<Vec<User>, SqlxError> {
    info!("{:<12} --> 모든 사용자 조회", "Query");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, User>(queries::GET_ALL_USERS)
                    .fetch_all(&mut **tx)
                    .await
            })
        })
        .await
}

/// 이메일 또는 사용자 이름으로 조회
pub async fn find_user_by_identifier(
    db_manager: &DatabaseManager,
    identifier: String,
) -> Result<Option<User>, SqlxError> {
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, User>(queries::FIND_USER_BY_IDENTIFIER)
                    .bind(identifier)
                    .fetch_optional(&mut **tx)
                    .await
            })
        })
        .await
}

/// 전체/인증 사용자 수
pub async fn count_users(db_manager: &DatabaseManager) -> Result<(i64, i64), SqlxError> {
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let total = sqlx::query_scalar::<_, i64>(queries::COUNT_USERS)
                    .fetch_one(&mut **tx)
                    .await?;
                let verified = sqlx::query_scalar::<_, i64>(queries::COUNT_VERIFIED_USERS)
                    .fetch_one(&mut **tx)
                    .await?;
                Ok((total, verified))
            })
        })
        .await
}

// endregion: --- User Query Handlers
