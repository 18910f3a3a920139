/// 경매 수명 주기 일괄 처리
/// SCHEDULED -> ACTIVE 활성화와 ACTIVE -> COMPLETED/ENDED_NO_SALE 만료를
/// 조건부 UPDATE로 수행한다. 이미 전이된 행은 다시 건드리지 않으므로
/// 반복 실행과 중첩 실행에 안전하다.
// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus};
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info};

// endregion: --- Imports

// region:    --- Batch Outcome
/// 일괄 처리 결과 집계
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct BatchOutcome {
    pub activated: u64,
    pub completed: u64,
    pub ended_no_sale: u64,
}

impl BatchOutcome {
    pub fn total(&self) -> u64 {
        self.activated + self.completed + self.ended_no_sale
    }
}
// endregion: --- Batch Outcome

// region:    --- 만료 판정
/// 종료 시각이 지난 ACTIVE 경매의 귀결 판정.
/// 입찰이 있고 최저 낙찰가 조건이 충족되면 낙찰, 아니면 유찰.
pub fn expiry_outcome(auction: &Auction) -> AuctionStatus {
    if auction.bid_count > 0 && (auction.reserve_price.is_none() || auction.reserve_met) {
        AuctionStatus::Completed
    } else {
        AuctionStatus::EndedNoSale
    }
}
// endregion: --- 만료 판정

// region:    --- Lifecycle Batch
/// 수명 주기 일괄 처리 실행
pub async fn run_lifecycle_batch(pool: &PgPool, now: DateTime<Utc>) -> Result<BatchOutcome> {
    let mut outcome = BatchOutcome::default();

    // SCHEDULED -> ACTIVE: 시작 시각이 지난 경매를 단일 조건부 UPDATE로 활성화.
    // 중첩 실행된 두 번째 호출은 0행에 일치한다.
    outcome.activated = sqlx::query(
        "UPDATE auctions SET status = 'ACTIVE', version = version + 1, updated_at = $1
         WHERE status = 'SCHEDULED' AND start_time <= $1",
    )
    .bind(now)
    .execute(pool)
    .await?
    .rows_affected();

    // 만료 후보 조회 후 건별로 판정한다
    let expired = sqlx::query_as::<_, Auction>(
        "SELECT * FROM auctions WHERE status = 'ACTIVE' AND end_time <= $1",
    )
    .bind(now)
    .fetch_all(pool)
    .await?;

    for auction in expired {
        let to = expiry_outcome(&auction);

        // 조회 시점의 버전이 그대로일 때만 전이한다. 동시 입찰이나 다른
        // 일괄 처리에 밀린 행은 이번 회차를 건너뛰고 다음 틱에서 처리된다.
        let updated = sqlx::query(
            "UPDATE auctions SET status = $1, version = version + 1, updated_at = $2
             WHERE id = $3 AND version = $4 AND status = 'ACTIVE'",
        )
        .bind(to.as_str())
        .bind(now)
        .bind(auction.id)
        .bind(auction.version)
        .execute(pool)
        .await?
        .rows_affected();

        if updated == 1 {
            match to {
                AuctionStatus::Completed => outcome.completed += 1,
                _ => outcome.ended_no_sale += 1,
            }
        } else {
            debug!(
                "{:<12} --> 만료 처리 건너뜀 (버전 충돌): id {}",
                "Lifecycle", auction.id
            );
        }
    }

    if outcome.total() > 0 {
        info!(
            "{:<12} --> 일괄 처리 완료: 활성화 {}, 낙찰 {}, 유찰 {}",
            "Lifecycle", outcome.activated, outcome.completed, outcome.ended_no_sale
        );
    }

    Ok(outcome)
}
// endregion: --- Lifecycle Batch

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn expired_auction(bid_count: i32, reserve_price: Option<i64>, reserve_met: bool) -> Auction {
        let now = Utc::now();
        Auction {
            id: 1,
            seller_id: 1,
            title: "만료 판정 테스트".to_string(),
            description: None,
            category: "기타".to_string(),
            condition: None,
            location: None,
            starting_price: 1_000,
            reserve_price,
            buy_now_price: None,
            current_price: 1_000 + bid_count as i64 * 500,
            start_time: now - Duration::days(1),
            end_time: now - Duration::minutes(1),
            status: "ACTIVE".to_string(),
            previous_status: None,
            highest_bidder_id: (bid_count > 0).then_some(2),
            bid_count,
            view_count: 0,
            watch_count: 0,
            reserve_met,
            featured: false,
            version: bid_count as i64,
            created_at: now - Duration::days(2),
            updated_at: now - Duration::minutes(5),
        }
    }

    #[test]
    fn no_bids_ends_without_sale() {
        let auction = expired_auction(0, None, false);
        assert_eq!(expiry_outcome(&auction), AuctionStatus::EndedNoSale);
    }

    #[test]
    fn bids_without_reserve_complete() {
        let auction = expired_auction(3, None, false);
        assert_eq!(expiry_outcome(&auction), AuctionStatus::Completed);
    }

    #[test]
    fn unmet_reserve_ends_without_sale() {
        let auction = expired_auction(3, Some(100_000), false);
        assert_eq!(expiry_outcome(&auction), AuctionStatus::EndedNoSale);
    }

    #[test]
    fn met_reserve_completes() {
        let auction = expired_auction(3, Some(2_000), true);
        assert_eq!(expiry_outcome(&auction), AuctionStatus::Completed);
    }

    #[test]
    fn outcome_total_sums_all_transitions() {
        let outcome = BatchOutcome {
            activated: 2,
            completed: 1,
            ended_no_sale: 3,
        };
        assert_eq!(outcome.total(), 6);
        assert_eq!(BatchOutcome::default().total(), 0);
    }
}
// endregion: --- Tests
