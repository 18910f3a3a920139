use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// 경매 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuctionStatus {
    /// 작성 중, 미공개
    Draft,
    /// 공개됨, 시작 대기
    Scheduled,
    /// 입찰 진행 중
    Active,
    /// 낙찰 종료
    Completed,
    /// 유찰 종료 (입찰 없음 또는 최저 낙찰가 미달)
    EndedNoSale,
    /// 판매자 또는 관리자에 의한 취소
    Cancelled,
    /// 관리자에 의한 일시 중지
    Suspended,
}

impl AuctionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionStatus::Draft => "DRAFT",
            AuctionStatus::Scheduled => "SCHEDULED",
            AuctionStatus::Active => "ACTIVE",
            AuctionStatus::Completed => "COMPLETED",
            AuctionStatus::EndedNoSale => "ENDED_NO_SALE",
            AuctionStatus::Cancelled => "CANCELLED",
            AuctionStatus::Suspended => "SUSPENDED",
        }
    }

    /// 더 이상 전이할 수 없는 종료 상태 여부
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AuctionStatus::Completed | AuctionStatus::EndedNoSale | AuctionStatus::Cancelled
        )
    }

    /// 상태 전이표. 여기 없는 전이는 모두 거부된다.
    pub fn can_transition(self, to: AuctionStatus) -> bool {
        use AuctionStatus::*;
        matches!(
            (self, to),
            (Draft, Scheduled)
                | (Scheduled, Active)
                | (Active, Completed)
                | (Active, EndedNoSale)
                | (Active | Scheduled, Cancelled)
                | (Active | Scheduled, Suspended)
                | (Suspended, Active | Scheduled)
        )
    }
}

impl fmt::Display for AuctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuctionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(AuctionStatus::Draft),
            "SCHEDULED" => Ok(AuctionStatus::Scheduled),
            "ACTIVE" => Ok(AuctionStatus::Active),
            "COMPLETED" => Ok(AuctionStatus::Completed),
            "ENDED_NO_SALE" => Ok(AuctionStatus::EndedNoSale),
            "CANCELLED" => Ok(AuctionStatus::Cancelled),
            "SUSPENDED" => Ok(AuctionStatus::Suspended),
            other => Err(Error::Internal(format!("알 수 없는 경매 상태: {other}"))),
        }
    }
}

// 경매 모델. 금액은 모두 최소 화폐 단위(센트).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Auction {
    pub id: i64,
    pub seller_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub starting_price: i64,
    pub reserve_price: Option<i64>,
    pub buy_now_price: Option<i64>,
    pub current_price: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub previous_status: Option<String>,
    pub highest_bidder_id: Option<i64>,
    pub bid_count: i32,
    pub view_count: i64,
    pub watch_count: i64,
    pub reserve_met: bool,
    pub featured: bool,
    /// 낙관적 동시성 토큰. 입찰/상태 전이마다 증가한다.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Auction {
    /// 저장된 상태 문자열을 열거형으로 해석
    pub fn parsed_status(&self) -> Result<AuctionStatus, Error> {
        self.status.parse()
    }
}

// endregion: --- Tests
