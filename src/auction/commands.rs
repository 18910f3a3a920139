/// 경매 관련 커맨드 처리
/// 1. 등록 / 수정
/// 2. 공개, 취소, 중지, 재개 (상태 전이)
// region:    --- Imports
use crate::auction::model::{Auction, AuctionStatus};
use crate::config::Config;
use crate::database::DatabaseManager;
use crate::error::{Error, Result};
use crate::store::AuctionStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Commands
/// 경매 등록 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateAuctionCommand {
    pub seller_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub starting_price: i64,
    pub reserve_price: Option<i64>,
    pub buy_now_price: Option<i64>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub featured: bool,
}

/// 경매 수정 명령. 지정한 필드만 바꾼다.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateAuctionCommand {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub starting_price: Option<i64>,
    pub reserve_price: Option<i64>,
    pub buy_now_price: Option<i64>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

const MAX_TITLE_LENGTH: usize = 200;
const MAX_DESCRIPTION_LENGTH: usize = 2_000;
const MAX_CATEGORY_LENGTH: usize = 100;
const MAX_CONDITION_LENGTH: usize = 50;
const MAX_LOCATION_LENGTH: usize = 200;

/// 등록 명령 검증
fn validate_create(cmd: &CreateAuctionCommand) -> Result<()> {
    if cmd.title.trim().is_empty() {
        return Err(Error::Validation("경매 제목은 비울 수 없습니다".to_string()));
    }
    if cmd.title.chars().count() > MAX_TITLE_LENGTH {
        return Err(Error::Validation(format!(
            "제목은 {MAX_TITLE_LENGTH}자를 넘을 수 없습니다"
        )));
    }
    if cmd.category.trim().is_empty() {
        return Err(Error::Validation("카테고리는 비울 수 없습니다".to_string()));
    }
    if cmd.category.chars().count() > MAX_CATEGORY_LENGTH {
        return Err(Error::Validation(format!(
            "카테고리는 {MAX_CATEGORY_LENGTH}자를 넘을 수 없습니다"
        )));
    }
    if let Some(description) = &cmd.description {
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(Error::Validation(format!(
                "설명은 {MAX_DESCRIPTION_LENGTH}자를 넘을 수 없습니다"
            )));
        }
    }
    if let Some(condition) = &cmd.condition {
        if condition.chars().count() > MAX_CONDITION_LENGTH {
            return Err(Error::Validation(format!(
                "상품 상태는 {MAX_CONDITION_LENGTH}자를 넘을 수 없습니다"
            )));
        }
    }
    if let Some(location) = &cmd.location {
        if location.chars().count() > MAX_LOCATION_LENGTH {
            return Err(Error::Validation(format!(
                "지역은 {MAX_LOCATION_LENGTH}자를 넘을 수 없습니다"
            )));
        }
    }
    if cmd.starting_price < 1 {
        return Err(Error::Validation(
            "시작 가격은 최소 화폐 단위(0.01) 이상이어야 합니다".to_string(),
        ));
    }
    for (name, price) in [
        ("최저 낙찰가", cmd.reserve_price),
        ("즉시 구매가", cmd.buy_now_price),
    ] {
        if let Some(price) = price {
            if price < 1 {
                return Err(Error::Validation(format!(
                    "{name}은(는) 최소 화폐 단위(0.01) 이상이어야 합니다"
                )));
            }
        }
    }
    if cmd.end_time <= cmd.start_time {
        return Err(Error::Validation(
            "종료 시간은 시작 시간보다 뒤여야 합니다".to_string(),
        ));
    }
    Ok(())
}
// endregion: --- Commands

// region:    --- Command Handlers
/// 1. 경매 등록. 초기 상태는 DRAFT, 현재 가격은 시작 가격.
pub async fn handle_create_auction(
    cmd: CreateAuctionCommand,
    db_manager: &DatabaseManager,
) -> Result<Auction> {
    info!("{:<12} --> 경매 등록 요청: {:?}", "Command", cmd.title);
    validate_create(&cmd)?;

    let seller_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(cmd.seller_id)
            .fetch_one(db_manager.pool())
            .await?;
    if !seller_exists {
        return Err(Error::UserNotFound(cmd.seller_id));
    }

    let auction = sqlx::query_as::<_, Auction>(
        "INSERT INTO auctions (seller_id, title, description, category, condition, location,
            starting_price, reserve_price, buy_now_price, current_price,
            start_time, end_time, status, featured)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $7, $10, $11, 'DRAFT', $12)
         RETURNING *",
    )
    .bind(cmd.seller_id)
    .bind(&cmd.title)
    .bind(&cmd.description)
    .bind(&cmd.category)
    .bind(&cmd.condition)
    .bind(&cmd.location)
    .bind(cmd.starting_price)
    .bind(cmd.reserve_price)
    .bind(cmd.buy_now_price)
    .bind(cmd.start_time)
    .bind(cmd.end_time)
    .bind(cmd.featured)
    .fetch_one(db_manager.pool())
    .await?;

    info!("{:<12} --> 경매 등록 완료: id {}", "Command", auction.id);
    Ok(auction)
}

/// 1. 경매 수정. 입찰이 발생했거나 이미 종료 단계에 들어간 경매는 수정할 수 없다.
pub async fn handle_update_auction(
    auction_id: i64,
    cmd: UpdateAuctionCommand,
    store: &impl AuctionStore,
    db_manager: &DatabaseManager,
) -> Result<Auction> {
    info!("{:<12} --> 경매 수정 요청: id {}", "Command", auction_id);

    let auction = store.fetch_auction(auction_id).await?;
    let status = auction.parsed_status()?;
    if auction.bid_count > 0 || status.is_terminal() || status == AuctionStatus::Suspended {
        return Err(Error::AuctionModificationNotAllowed(auction_id));
    }

    let updated = CreateAuctionCommand {
        seller_id: auction.seller_id,
        title: cmd.title.unwrap_or_else(|| auction.title.clone()),
        description: cmd.description.or_else(|| auction.description.clone()),
        category: cmd.category.unwrap_or_else(|| auction.category.clone()),
        condition: cmd.condition.or_else(|| auction.condition.clone()),
        location: cmd.location.or_else(|| auction.location.clone()),
        starting_price: cmd.starting_price.unwrap_or(auction.starting_price),
        reserve_price: cmd.reserve_price.or(auction.reserve_price),
        buy_now_price: cmd.buy_now_price.or(auction.buy_now_price),
        start_time: cmd.start_time.unwrap_or(auction.start_time),
        end_time: cmd.end_time.unwrap_or(auction.end_time),
        featured: auction.featured,
    };
    validate_create(&updated)?;

    // 버전 검사로 동시 입찰/전이와 배타적으로 갱신
    let rows = sqlx::query(
        "UPDATE auctions SET
            title = $1, description = $2, category = $3, condition = $4, location = $5,
            starting_price = $6, reserve_price = $7, buy_now_price = $8, current_price = $6,
            start_time = $9, end_time = $10, version = version + 1, updated_at = $11
         WHERE id = $12 AND version = $13 AND bid_count = 0",
    )
    .bind(&updated.title)
    .bind(&updated.description)
    .bind(&updated.category)
    .bind(&updated.condition)
    .bind(&updated.location)
    .bind(updated.starting_price)
    .bind(updated.reserve_price)
    .bind(updated.buy_now_price)
    .bind(updated.start_time)
    .bind(updated.end_time)
    .bind(Utc::now())
    .bind(auction_id)
    .bind(auction.version)
    .execute(db_manager.pool())
    .await?
    .rows_affected();

    if rows == 0 {
        warn!(
            "{:<12} --> 경매 수정 중 버전 충돌: id {}",
            "Command", auction_id
        );
        return Err(Error::TransientConflict { retries: 1 });
    }

    store.fetch_auction(auction_id).await
}

/// 2. 공개: DRAFT -> SCHEDULED. 시작 시간이 미래일 때만 가능.
pub async fn handle_publish_auction(
    auction_id: i64,
    store: &impl AuctionStore,
    config: &Config,
) -> Result<Auction> {
    transition_with_retry(auction_id, store, config, |auction, status| {
        if status == AuctionStatus::Draft && auction.start_time <= Utc::now() {
            return Err(Error::Validation(
                "경매 시작 시간이 미래여야 공개할 수 있습니다".to_string(),
            ));
        }
        Ok((AuctionStatus::Scheduled, None))
    })
    .await
}

/// 2. 취소: SCHEDULED/ACTIVE -> CANCELLED
pub async fn handle_cancel_auction(
    auction_id: i64,
    store: &impl AuctionStore,
    config: &Config,
) -> Result<Auction> {
    transition_with_retry(auction_id, store, config, |_, _| {
        Ok((AuctionStatus::Cancelled, None))
    })
    .await
}

/// 2. 중지: SCHEDULED/ACTIVE -> SUSPENDED. 재개를 위해 이전 상태를 기록한다.
pub async fn handle_suspend_auction(
    auction_id: i64,
    store: &impl AuctionStore,
    config: &Config,
) -> Result<Auction> {
    transition_with_retry(auction_id, store, config, |_, status| {
        Ok((AuctionStatus::Suspended, Some(status)))
    })
    .await
}

/// 2. 재개: SUSPENDED -> 중지 직전 상태
pub async fn handle_reinstate_auction(
    auction_id: i64,
    store: &impl AuctionStore,
    config: &Config,
) -> Result<Auction> {
    transition_with_retry(auction_id, store, config, |auction, status| {
        if status != AuctionStatus::Suspended {
            return Err(Error::InvalidAuctionStatus {
                from: status.to_string(),
                to: "재개 대상 상태".to_string(),
            });
        }
        let previous: AuctionStatus = auction
            .previous_status
            .as_deref()
            .ok_or_else(|| {
                Error::Internal(format!(
                    "중지 이전 상태가 기록되지 않은 경매: id {}",
                    auction.id
                ))
            })?
            .parse()?;
        Ok((previous, None))
    })
    .await
}

/// 상태 전이 공통 처리. 전이표 검사 후 버전 검사가 붙은 갱신을 시도하고
/// 충돌하면 새 상태로 다시 판정한다.
async fn transition_with_retry(
    auction_id: i64,
    store: &impl AuctionStore,
    config: &Config,
    decide: impl Fn(&Auction, AuctionStatus) -> Result<(AuctionStatus, Option<AuctionStatus>)>,
) -> Result<Auction> {
    let mut retries = 0;

    while retries < config.max_bid_retries {
        let auction = store.fetch_auction(auction_id).await?;
        let status = auction.parsed_status()?;
        let (to, previous_status) = decide(&auction, status)?;

        if !status.can_transition(to) {
            return Err(Error::InvalidAuctionStatus {
                from: status.to_string(),
                to: to.to_string(),
            });
        }

        if store
            .apply_transition(&auction, to, previous_status, Utc::now())
            .await?
        {
            info!(
                "{:<12} --> 경매 {} 상태 전이: {} -> {}",
                "Command", auction_id, status, to
            );
            return store.fetch_auction(auction_id).await;
        }

        warn!(
            "{:<12} --> 상태 전이 중 버전 충돌: 재시도 (id {})",
            "Command", auction_id
        );
        retries += 1;
    }

    Err(Error::TransientConflict { retries })
}
// endregion: --- Command Handlers

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_command() -> CreateAuctionCommand {
        let now = Utc::now();
        CreateAuctionCommand {
            seller_id: 1,
            title: "빈티지 필름 카메라".to_string(),
            description: Some("1970년대 수동 필름 카메라".to_string()),
            category: "카메라".to_string(),
            condition: Some("중고 - 상".to_string()),
            location: Some("서울".to_string()),
            starting_price: 10_000,
            reserve_price: Some(50_000),
            buy_now_price: Some(200_000),
            start_time: now + Duration::hours(1),
            end_time: now + Duration::days(7),
            featured: false,
        }
    }

    #[test]
    fn accepts_valid_command() {
        assert!(validate_create(&create_command()).is_ok());
    }

    #[test]
    fn rejects_empty_title_and_category() {
        let mut cmd = create_command();
        cmd.title = "   ".to_string();
        assert!(matches!(
            validate_create(&cmd),
            Err(Error::Validation(_))
        ));

        let mut cmd = create_command();
        cmd.category = String::new();
        assert!(matches!(validate_create(&cmd), Err(Error::Validation(_))));
    }

    #[test]
    fn rejects_overlong_fields() {
        let mut cmd = create_command();
        cmd.title = "가".repeat(201);
        assert!(validate_create(&cmd).is_err());

        let mut cmd = create_command();
        cmd.description = Some("가".repeat(2_001));
        assert!(validate_create(&cmd).is_err());
    }

    #[test]
    fn rejects_sub_minimum_prices() {
        let mut cmd = create_command();
        cmd.starting_price = 0;
        assert!(validate_create(&cmd).is_err());

        let mut cmd = create_command();
        cmd.reserve_price = Some(0);
        assert!(validate_create(&cmd).is_err());

        let mut cmd = create_command();
        cmd.buy_now_price = Some(-100);
        assert!(validate_create(&cmd).is_err());
    }

    #[test]
    fn rejects_end_time_before_start_time() {
        let mut cmd = create_command();
        cmd.end_time = cmd.start_time;
        assert!(validate_create(&cmd).is_err());

        let mut cmd = create_command();
        cmd.end_time = cmd.start_time - Duration::hours(1);
        assert!(validate_create(&cmd).is_err());
    }
}
// endregion: --- Tests
