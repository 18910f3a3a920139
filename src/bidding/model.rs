use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 입찰 모델 (수락된 입찰만 기록되는 추가 전용 이력)
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub auction_id: i64,
    pub bidder_id: i64,
    pub amount: i64,
    pub bid_time: DateTime<Utc>,
}

/// 입찰 검증을 통과한 뒤 적용할 효과. 전부 적용되거나 전부 적용되지 않는다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidDecision {
    pub new_price: i64,
    /// 이번 입찰로 최저 낙찰가가 처음 충족되는지
    pub reserve_met_changed: bool,
    /// 즉시 구매 가격 도달로 경매가 곧바로 낙찰 종료되는지
    pub completes_auction: bool,
}

/// 수락된 입찰의 결과
#[derive(Debug, Serialize, Deserialize)]
pub struct BidResult {
    pub auction_id: i64,
    pub accepted_amount: i64,
    pub new_bid_count: i32,
    pub reserve_met_changed: bool,
    pub auction_completed: bool,
}
