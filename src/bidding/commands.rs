/// 입찰 관련 커맨드 처리
/// 1. 입찰
/// 2. 즉시 구매
// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus};
use crate::bidding::model::{BidDecision, BidResult};
use crate::config::{BidIncrementPolicy, Config};
use crate::error::{Error, Result};
use crate::store::AuctionStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub auction_id: i64,
    pub bidder_id: i64,
    pub bid_amount: i64,
}

/// 즉시 구매 명령
#[derive(Debug, Serialize, Deserialize)]
pub struct BuyNowCommand {
    pub auction_id: i64,
    pub buyer_id: i64,
}
// endregion: --- Commands

// region:    --- 입찰 검증
/// 입찰 전제 조건 검증. 순서대로 검사하며 첫 실패가 곧 결과다.
/// 시계와 저장소에 의존하지 않는 순수 함수.
pub fn evaluate_bid(
    auction: &Auction,
    bidder_id: i64,
    amount: i64,
    now: DateTime<Utc>,
    policy: &BidIncrementPolicy,
) -> Result<BidDecision> {
    // 2. ACTIVE 상태이고 입찰 시간 창 안이어야 한다
    let status = auction.parsed_status()?;
    if status != AuctionStatus::Active || now < auction.start_time {
        return Err(Error::AuctionNotActive {
            auction_id: auction.id,
            status: auction.status.clone(),
        });
    }
    if now >= auction.end_time {
        return Err(Error::BiddingEnded {
            auction_id: auction.id,
        });
    }

    // 3. 판매자 본인 입찰 금지
    if bidder_id == auction.seller_id {
        return Err(Error::SelfBiddingNotAllowed);
    }

    // 4. 현재 가격보다 엄격히 높아야 한다. 최고 입찰자가 같은 금액을
    //    다시 제출한 경우는 이중 제출로 구분해서 알린다.
    if amount <= auction.current_price {
        if auction.highest_bidder_id == Some(bidder_id) && amount == auction.current_price {
            return Err(Error::DuplicateBid);
        }
        return Err(Error::BidTooLow {
            current_price: auction.current_price,
            bid_amount: amount,
        });
    }

    // 5. 최소 입찰 단위. 첫 입찰을 포함해 동일하게 적용한다.
    let min_increment = policy.min_increment(auction.current_price);
    if amount - auction.current_price < min_increment {
        return Err(Error::InvalidBidIncrement {
            required_min: auction.current_price + min_increment,
        });
    }

    let reserve_reached = auction
        .reserve_price
        .map_or(false, |reserve| amount >= reserve);
    let completes_auction = auction
        .buy_now_price
        .map_or(false, |buy_now| amount >= buy_now);

    Ok(BidDecision {
        new_price: amount,
        // 즉시 구매 낙찰도 최저 낙찰가 충족으로 처리한다
        reserve_met_changed: !auction.reserve_met && (reserve_reached || completes_auction),
        completes_auction,
    })
}
// endregion: --- 입찰 검증

// region:    --- Command Handlers
/// 1. 입찰
/// 최신 상태를 읽고 검증한 뒤 버전 검사가 붙은 원자 갱신을 시도한다.
/// 충돌하면 새 상태로 다시 검증한다. 밀려난 입찰은 BID_TOO_LOW로 떨어진다.
pub async fn handle_place_bid(
    cmd: PlaceBidCommand,
    store: &impl AuctionStore,
    config: &Config,
) -> Result<BidResult> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);
    let mut retries = 0;

    while retries < config.max_bid_retries {
        let auction = store.fetch_auction(cmd.auction_id).await?;
        let now = Utc::now();

        let decision = evaluate_bid(
            &auction,
            cmd.bidder_id,
            cmd.bid_amount,
            now,
            &config.bid_increment,
        )?;

        if store
            .apply_bid(&auction, cmd.bidder_id, &decision, now)
            .await?
        {
            if decision.completes_auction {
                info!(
                    "{:<12} --> 즉시 구매 가격 도달, 경매 {} 낙찰 종료",
                    "Command", auction.id
                );
            }
            return Ok(BidResult {
                auction_id: auction.id,
                accepted_amount: decision.new_price,
                new_bid_count: auction.bid_count + 1,
                reserve_met_changed: decision.reserve_met_changed,
                auction_completed: decision.completes_auction,
            });
        }

        warn!(
            "{:<12} --> 낙관적 업데이트로 인한 버전 충돌: 재시도",
            "Command"
        );
        retries += 1;
    }

    Err(Error::TransientConflict { retries })
}

/// 2. 즉시 구매(낙찰)
/// 즉시 구매 가격 그대로의 입찰로 처리한다.
pub async fn handle_buy_now(
    cmd: BuyNowCommand,
    store: &impl AuctionStore,
    config: &Config,
) -> Result<BidResult> {
    info!("{:<12} --> 즉시 구매 요청 처리 시작: {:?}", "Command", cmd);

    let auction = store.fetch_auction(cmd.auction_id).await?;
    let buy_now_price = auction.buy_now_price.ok_or_else(|| {
        Error::Validation(format!(
            "즉시 구매가 설정되지 않은 경매입니다: id {}",
            auction.id
        ))
    })?;

    handle_place_bid(
        PlaceBidCommand {
            auction_id: cmd.auction_id,
            bidder_id: cmd.buyer_id,
            bid_amount: buy_now_price,
        },
        store,
        config,
    )
    .await
}
// endregion: --- Command Handlers

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    const SELLER: i64 = 1;
    const BIDDER: i64 = 2;

    fn active_auction() -> Auction {
        let now = Utc::now();
        Auction {
            id: 10,
            seller_id: SELLER,
            title: "테스트 경매".to_string(),
            description: None,
            category: "전자기기".to_string(),
            condition: None,
            location: None,
            starting_price: 1_000,
            reserve_price: None,
            buy_now_price: None,
            current_price: 1_000,
            start_time: now - Duration::hours(1),
            end_time: now + Duration::hours(1),
            status: "ACTIVE".to_string(),
            previous_status: None,
            highest_bidder_id: None,
            bid_count: 0,
            view_count: 0,
            watch_count: 0,
            reserve_met: false,
            featured: false,
            version: 0,
            created_at: now - Duration::hours(2),
            updated_at: now - Duration::hours(1),
        }
    }

    fn fixed_policy() -> BidIncrementPolicy {
        BidIncrementPolicy::Fixed(100)
    }

    #[test]
    fn rejects_non_active_statuses() {
        for status in ["DRAFT", "SCHEDULED", "COMPLETED", "SUSPENDED"] {
            let mut auction = active_auction();
            auction.status = status.to_string();
            let err =
                evaluate_bid(&auction, BIDDER, 2_000, Utc::now(), &fixed_policy()).unwrap_err();
            assert!(
                matches!(err, Error::AuctionNotActive { .. }),
                "{status}: {err:?}"
            );
        }
    }

    #[test]
    fn rejects_bid_before_start_time() {
        let mut auction = active_auction();
        auction.start_time = Utc::now() + Duration::hours(1);
        let err = evaluate_bid(&auction, BIDDER, 2_000, Utc::now(), &fixed_policy()).unwrap_err();
        assert!(matches!(err, Error::AuctionNotActive { .. }));
    }

    #[test]
    fn rejects_bid_after_end_time() {
        let mut auction = active_auction();
        auction.end_time = Utc::now() - Duration::seconds(1);
        let err = evaluate_bid(&auction, BIDDER, 2_000, Utc::now(), &fixed_policy()).unwrap_err();
        assert!(matches!(err, Error::BiddingEnded { .. }));
    }

    #[test]
    fn rejects_self_bid_regardless_of_amount() {
        let auction = active_auction();
        for amount in [1_001, 100_000] {
            let err =
                evaluate_bid(&auction, SELLER, amount, Utc::now(), &fixed_policy()).unwrap_err();
            assert!(matches!(err, Error::SelfBiddingNotAllowed));
        }
    }

    #[test]
    fn rejects_amount_equal_to_current_price() {
        let auction = active_auction();
        let err = evaluate_bid(&auction, BIDDER, 1_000, Utc::now(), &fixed_policy()).unwrap_err();
        assert!(matches!(err, Error::BidTooLow { .. }));
    }

    #[test]
    fn duplicate_resubmission_by_highest_bidder() {
        let mut auction = active_auction();
        auction.current_price = 2_000;
        auction.bid_count = 1;
        auction.highest_bidder_id = Some(BIDDER);
        // 최고 입찰자 본인의 동일 금액 재제출은 중복 입찰
        let err = evaluate_bid(&auction, BIDDER, 2_000, Utc::now(), &fixed_policy()).unwrap_err();
        assert!(matches!(err, Error::DuplicateBid));
        // 다른 사용자의 동일 금액은 그냥 낮은 입찰
        let err = evaluate_bid(&auction, 3, 2_000, Utc::now(), &fixed_policy()).unwrap_err();
        assert!(matches!(err, Error::BidTooLow { .. }));
    }

    #[test]
    fn enforces_minimum_increment() {
        let auction = active_auction();
        // 1센트 인상은 100센트 단위 정책에서 거절
        let err = evaluate_bid(&auction, BIDDER, 1_001, Utc::now(), &fixed_policy()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidBidIncrement { required_min: 1_100 }
        ));
        // 정확히 한 단위 위는 수락
        let decision = evaluate_bid(&auction, BIDDER, 1_100, Utc::now(), &fixed_policy()).unwrap();
        assert_eq!(decision.new_price, 1_100);
        assert!(!decision.reserve_met_changed);
        assert!(!decision.completes_auction);
    }

    #[test]
    fn percent_increment_policy() {
        let mut auction = active_auction();
        auction.current_price = 10_000;
        let policy = BidIncrementPolicy::Percent(5);
        // 5% = 500센트 미만 인상은 거절
        let err = evaluate_bid(&auction, BIDDER, 10_499, Utc::now(), &policy).unwrap_err();
        assert!(matches!(err, Error::InvalidBidIncrement { .. }));
        assert!(evaluate_bid(&auction, BIDDER, 10_500, Utc::now(), &policy).is_ok());
    }

    #[test]
    fn bid_meeting_reserve_flips_reserve_met() {
        // 시작가 10.00, 최저 낙찰가 50.00에 55.00 입찰
        let mut auction = active_auction();
        auction.reserve_price = Some(5_000);
        let decision = evaluate_bid(&auction, BIDDER, 5_500, Utc::now(), &fixed_policy()).unwrap();
        assert_eq!(decision.new_price, 5_500);
        assert!(decision.reserve_met_changed);
        assert!(!decision.completes_auction);
    }

    #[test]
    fn reserve_met_does_not_change_twice() {
        let mut auction = active_auction();
        auction.reserve_price = Some(5_000);
        auction.reserve_met = true;
        auction.current_price = 5_500;
        auction.bid_count = 1;
        auction.highest_bidder_id = Some(3);
        let decision = evaluate_bid(&auction, BIDDER, 5_600, Utc::now(), &fixed_policy()).unwrap();
        assert!(!decision.reserve_met_changed);
    }

    #[test]
    fn bid_below_reserve_is_accepted_without_reserve_met() {
        let mut auction = active_auction();
        auction.reserve_price = Some(5_000);
        let decision = evaluate_bid(&auction, BIDDER, 2_000, Utc::now(), &fixed_policy()).unwrap();
        assert!(!decision.reserve_met_changed);
    }

    #[test]
    fn reaching_buy_now_completes_auction() {
        let mut auction = active_auction();
        auction.buy_now_price = Some(50_000);
        let decision = evaluate_bid(&auction, BIDDER, 50_000, Utc::now(), &fixed_policy()).unwrap();
        assert!(decision.completes_auction);
        // 즉시 구매 낙찰은 최저 낙찰가 충족으로도 처리된다
        assert!(decision.reserve_met_changed);
        // 가격은 즉시 구매가가 아니라 입찰가 그대로
        let decision = evaluate_bid(&auction, BIDDER, 55_000, Utc::now(), &fixed_policy()).unwrap();
        assert_eq!(decision.new_price, 55_000);
        assert!(decision.completes_auction);
    }

    #[test]
    fn losing_concurrent_bid_revalidates_to_bid_too_low() {
        // 50.00에서 65.00 입찰이 먼저 적용된 뒤 60.00 입찰이 재검증되는 상황
        let mut auction = active_auction();
        auction.current_price = 6_500;
        auction.bid_count = 1;
        auction.highest_bidder_id = Some(3);
        let err = evaluate_bid(&auction, BIDDER, 6_000, Utc::now(), &fixed_policy()).unwrap_err();
        assert!(matches!(
            err,
            Error::BidTooLow {
                current_price: 6_500,
                bid_amount: 6_000
            }
        ));
    }
}
// endregion: --- Tests
