/// 도메인 오류 정의 및 HTTP 변환 경계
/// 모든 오류는 이 닫힌 열거형의 변형이며, HTTP 상태 변환은 IntoResponse 구현 한 곳에서만 수행한다.
// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};
use uuid::Uuid;

// endregion: --- Imports

pub type Result<T> = std::result::Result<T, Error>;

// region:    --- Error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// 경매를 찾을 수 없음
    #[error("경매를 찾을 수 없습니다: id {0}")]
    AuctionNotFound(i64),

    /// 사용자를 찾을 수 없음
    #[error("사용자를 찾을 수 없습니다: id {0}")]
    UserNotFound(i64),

    /// 입찰 가능한 상태가 아님 (ACTIVE 아님 또는 시작 전)
    #[error("경매가 입찰 가능한 상태가 아닙니다: id {auction_id}, 상태 {status}")]
    AuctionNotActive { auction_id: i64, status: String },

    /// 경매 종료 시각 이후의 입찰
    #[error("경매 입찰이 이미 종료되었습니다: id {auction_id}")]
    BiddingEnded { auction_id: i64 },

    /// 판매자 본인의 입찰
    #[error("판매자는 자신의 경매에 입찰할 수 없습니다")]
    SelfBiddingNotAllowed,

    /// 현재 가격 이하의 입찰
    #[error("입찰 금액이 현재 가격보다 낮거나 같습니다: 현재 {current_price}, 입찰 {bid_amount}")]
    BidTooLow { current_price: i64, bid_amount: i64 },

    /// 최소 입찰 단위 미달
    #[error("최소 입찰 단위를 충족하지 못했습니다: 최소 {required_min} 이상이어야 합니다")]
    InvalidBidIncrement { required_min: i64 },

    /// 최고 입찰자의 동일 금액 재입찰 (이중 제출 방어)
    #[error("동일한 금액의 중복 입찰입니다")]
    DuplicateBid,

    /// 전이표에 없는 상태 전이
    #[error("허용되지 않는 상태 전이입니다: {from} -> {to}")]
    InvalidAuctionStatus { from: String, to: String },

    /// 입찰이 발생한 경매의 수정 시도
    #[error("입찰이 시작된 경매는 수정할 수 없습니다: id {0}")]
    AuctionModificationNotAllowed(i64),

    /// 이메일 중복
    #[error("이미 사용 중인 이메일입니다")]
    EmailTaken,

    /// 사용자 이름 중복
    #[error("이미 사용 중인 사용자 이름입니다")]
    UsernameTaken,

    /// 입력값 검증 실패
    #[error("입력값 검증 실패: {0}")]
    Validation(String),

    /// 낙관적 동시성 재시도 한도 초과
    #[error("동시 업데이트 충돌로 재시도 한도를 초과했습니다: {retries}회")]
    TransientConflict { retries: u32 },

    /// 내부 오류. 호출자에게는 상관관계 id만 노출한다.
    #[error("내부 오류: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::Internal(e.to_string())
    }
}

impl Error {
    /// 기계 판독용 오류 코드
    pub fn code(&self) -> &'static str {
        match self {
            Error::AuctionNotFound(_) => "AUCTION_NOT_FOUND",
            Error::UserNotFound(_) => "USER_NOT_FOUND",
            Error::AuctionNotActive { .. } => "AUCTION_NOT_ACTIVE",
            Error::BiddingEnded { .. } => "BIDDING_ENDED",
            Error::SelfBiddingNotAllowed => "SELF_BIDDING_NOT_ALLOWED",
            Error::BidTooLow { .. } => "BID_TOO_LOW",
            Error::InvalidBidIncrement { .. } => "INVALID_BID_INCREMENT",
            Error::DuplicateBid => "DUPLICATE_BID",
            Error::InvalidAuctionStatus { .. } => "INVALID_AUCTION_STATUS",
            Error::AuctionModificationNotAllowed(_) => "AUCTION_MODIFICATION_NOT_ALLOWED",
            Error::EmailTaken => "EMAIL_ALREADY_EXISTS",
            Error::UsernameTaken => "USERNAME_ALREADY_EXISTS",
            Error::Validation(_) => "VALIDATION_FAILED",
            Error::TransientConflict { .. } => "MAX_RETRIES_EXCEEDED",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 오류 종류별 HTTP 상태
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::AuctionNotFound(_) | Error::UserNotFound(_) => StatusCode::NOT_FOUND,
            Error::EmailTaken | Error::UsernameTaken | Error::TransientConflict { .. } => {
                StatusCode::CONFLICT
            }
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
// endregion: --- Error

// region:    --- HTTP 변환 경계
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 내부 오류는 전체 내용을 로그에 남기고 호출자에게는 상관관계 id만 전달
        if let Error::Internal(detail) = &self {
            let correlation_id = Uuid::new_v4();
            error!(
                "{:<12} --> 내부 오류 [{}]: {}",
                "Error", correlation_id, detail
            );
            let body = Json(serde_json::json!({
                "error": "내부 오류가 발생했습니다.",
                "code": self.code(),
                "correlation_id": correlation_id,
            }));
            return (status, body).into_response();
        }

        warn!("{:<12} --> {} ({})", "Error", self, self.code());
        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        }));
        (status, body).into_response()
    }
}
// endregion: --- HTTP 변환 경계

// endregion: --- Tests
