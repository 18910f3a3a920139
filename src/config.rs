/// 프로세스 기동 시 한 번 읽어 명시적으로 전달하는 설정 객체
// region:    --- Imports
use crate::error::{Error, Result};
use std::time::Duration;

// endregion: --- Imports

// region:    --- Bid Increment Policy
/// 최소 입찰 단위 정책. 고정 금액 또는 현재 가격 대비 백분율.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BidIncrementPolicy {
    /// 고정 금액 (최소 화폐 단위, 센트)
    Fixed(i64),
    /// 현재 가격 대비 백분율
    Percent(i64),
}

impl BidIncrementPolicy {
    /// 현재 가격 기준 최소 인상 폭. 백분율 정책도 1센트 미만으로 내려가지 않는다.
    pub fn min_increment(&self, current_price: i64) -> i64 {
        match self {
            BidIncrementPolicy::Fixed(amount) => *amount,
            BidIncrementPolicy::Percent(pct) => (current_price * pct / 100).max(1),
        }
    }

    /// "fixed:100" 또는 "percent:5" 형식 파싱
    pub fn parse(value: &str) -> Result<Self> {
        let (kind, amount) = value
            .split_once(':')
            .ok_or_else(|| Error::Validation(format!("잘못된 입찰 단위 정책: {value}")))?;
        let amount: i64 = amount
            .parse()
            .map_err(|_| Error::Validation(format!("잘못된 입찰 단위 정책 값: {value}")))?;
        if amount <= 0 {
            return Err(Error::Validation(format!(
                "입찰 단위 정책 값은 양수여야 합니다: {value}"
            )));
        }
        match kind {
            "fixed" => Ok(BidIncrementPolicy::Fixed(amount)),
            "percent" => Ok(BidIncrementPolicy::Percent(amount)),
            _ => Err(Error::Validation(format!("알 수 없는 입찰 단위 정책: {kind}"))),
        }
    }
}
// endregion: --- Bid Increment Policy

// region:    --- Config
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub bind_addr: String,
    /// 상태 스케줄러 실행 주기
    pub scheduler_interval: Duration,
    /// 낙관적 동시성 재시도 한도
    pub max_bid_retries: u32,
    pub bid_increment: BidIncrementPolicy,
}

impl Config {
    /// 환경 변수에서 설정을 읽는다. DATABASE_URL 외에는 모두 기본값이 있다.
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| Error::Validation("DATABASE_URL 환경 변수가 필요합니다".to_string()))?;

        let db_max_connections = parse_var("DB_MAX_CONNECTIONS", 5)?;
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let scheduler_interval =
            Duration::from_secs(parse_var("SCHEDULER_INTERVAL_SECS", 1)?);
        let max_bid_retries = parse_var("MAX_BID_RETRIES", 10)?;

        let bid_increment = match std::env::var("BID_INCREMENT") {
            Ok(value) => BidIncrementPolicy::parse(&value)?,
            // 기본값: 고정 1달러 (100센트)
            Err(_) => BidIncrementPolicy::Fixed(100),
        };

        Ok(Config {
            database_url,
            db_max_connections,
            bind_addr,
            scheduler_interval,
            max_bid_retries,
            bid_increment,
        })
    }
}

/// 숫자 환경 변수 파싱 (없으면 기본값)
fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| Error::Validation(format!("{name} 값이 올바르지 않습니다: {value}"))),
        Err(_) => Ok(default),
    }
}
// endregion: --- Config

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fixed_policy() {
        let policy = BidIncrementPolicy::parse("fixed:100").unwrap();
        assert_eq!(policy, BidIncrementPolicy::Fixed(100));
        assert_eq!(policy.min_increment(10_000), 100);
    }

    #[test]
    fn parse_percent_policy() {
        let policy = BidIncrementPolicy::parse("percent:5").unwrap();
        assert_eq!(policy, BidIncrementPolicy::Percent(5));
        // 10,000센트의 5% = 500센트
        assert_eq!(policy.min_increment(10_000), 500);
    }

    #[test]
    fn percent_policy_floors_at_one_cent() {
        let policy = BidIncrementPolicy::Percent(1);
        assert_eq!(policy.min_increment(10), 1);
        assert_eq!(policy.min_increment(0), 1);
    }

    #[test]
    fn rejects_malformed_policy() {
        assert!(BidIncrementPolicy::parse("fixed").is_err());
        assert!(BidIncrementPolicy::parse("fixed:abc").is_err());
        assert!(BidIncrementPolicy::parse("fixed:0").is_err());
        assert!(BidIncrementPolicy::parse("percent:-5").is_err());
        assert!(BidIncrementPolicy::parse("linear:3").is_err());
    }
}
// endregion: --- Tests
