/// 경매 행에 대한 조건부 원자 갱신 저장소
/// 입찰 적용과 상태 전이는 모두 버전 검사가 붙은 단일 UPDATE로 수행되어
/// 같은 경매에 대해 상호 배타적이다. 버전 불일치는 충돌로 보고되고
/// 호출 측 재시도 루프가 새 상태를 읽어 다시 검증한다.
// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus};
use crate::bidding::model::BidDecision;
use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;

// endregion: --- Imports

// region:    --- Auction Store Trait
#[async_trait]
pub trait AuctionStore {
    /// 경매 단건 조회. 없으면 AuctionNotFound.
    async fn fetch_auction(&self, auction_id: i64) -> Result<Auction>;

    /// 검증을 통과한 입찰을 적용한다. 가격/최고 입찰자/입찰 수/버전 갱신과
    /// 입찰 이력 삽입이 한 트랜잭션이다. 버전 충돌이면 false를 돌려준다.
    async fn apply_bid(
        &self,
        auction: &Auction,
        bidder_id: i64,
        decision: &BidDecision,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    /// 상태 전이를 적용한다. 버전 충돌이면 false를 돌려준다.
    async fn apply_transition(
        &self,
        auction: &Auction,
        to: AuctionStatus,
        previous_status: Option<AuctionStatus>,
        now: DateTime<Utc>,
    ) -> Result<bool>;
}
// endregion: --- Auction Store Trait

// region:    --- Postgres 구현체
pub struct PostgresAuctionStore {
    pool: Arc<PgPool>,
}

impl PostgresAuctionStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuctionStore for PostgresAuctionStore {
    async fn fetch_auction(&self, auction_id: i64) -> Result<Auction> {
        sqlx::query_as::<_, Auction>("SELECT * FROM auctions WHERE id = $1")
            .bind(auction_id)
            .fetch_optional(&*self.pool)
            .await?
            .ok_or(Error::AuctionNotFound(auction_id))
    }

    async fn apply_bid(
        &self,
        auction: &Auction,
        bidder_id: i64,
        decision: &BidDecision,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let new_status = if decision.completes_auction {
            AuctionStatus::Completed
        } else {
            AuctionStatus::Active
        };

        let mut tx = self.pool.begin().await?;

        // 읽었던 버전과 ACTIVE 상태가 그대로일 때만 갱신된다
        let updated = sqlx::query(
            "UPDATE auctions SET
                current_price = $1,
                highest_bidder_id = $2,
                bid_count = bid_count + 1,
                reserve_met = reserve_met OR $3,
                status = $4,
                version = version + 1,
                updated_at = $5
             WHERE id = $6 AND version = $7 AND status = 'ACTIVE'",
        )
        .bind(decision.new_price)
        .bind(bidder_id)
        .bind(decision.reserve_met_changed)
        .bind(new_status.as_str())
        .bind(now)
        .bind(auction.id)
        .bind(auction.version)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            tx.rollback().await?;
            debug!(
                "{:<12} --> 버전 충돌: auction {} version {}",
                "Store", auction.id, auction.version
            );
            return Ok(false);
        }

        // 입찰 이력 추가
        sqlx::query(
            "INSERT INTO bids (auction_id, bidder_id, amount, bid_time)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(auction.id)
        .bind(bidder_id)
        .bind(decision.new_price)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn apply_transition(
        &self,
        auction: &Auction,
        to: AuctionStatus,
        previous_status: Option<AuctionStatus>,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let updated = sqlx::query(
            "UPDATE auctions SET
                status = $1,
                previous_status = $2,
                version = version + 1,
                updated_at = $3
             WHERE id = $4 AND version = $5 AND status = $6",
        )
        .bind(to.as_str())
        .bind(previous_status.map(|s| s.as_str()))
        .bind(now)
        .bind(auction.id)
        .bind(auction.version)
        .bind(&auction.status)
        .execute(&*self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            debug!(
                "{:<12} --> 버전 충돌: auction {} {} -> {}",
                "Store", auction.id, auction.status, to
            );
        }
        Ok(updated == 1)
    }
}
// endregion: --- Postgres 구현체
