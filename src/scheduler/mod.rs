/// 경매 상태 업데이트 스케줄러
/// 설정된 주기로 수명 주기 일괄 처리를 실행한다. 전이는 조건부 UPDATE라서
/// 틱이 겹치거나 프로세스가 여러 개 떠도 각 경매는 한 번만 전이된다.
// region:    --- Imports
use crate::auction::lifecycle;
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, error};

// endregion: --- Imports

// region:    --- Auction Scheduler
/// 경매 상태 업데이트 스케줄러
pub struct AuctionScheduler {
    pool: Arc<PgPool>,
    period: Duration,
}

impl AuctionScheduler {
    pub fn new(pool: Arc<PgPool>, period: Duration) -> Self {
        Self { pool, period }
    }

    /// 경매 상태 업데이트 스케줄러 시작
    pub async fn start(&self) {
        let pool = Arc::clone(&self.pool);
        let period = self.period;
        tokio::spawn(async move {
            let mut interval = interval(period);
            loop {
                interval.tick().await;
                match lifecycle::run_lifecycle_batch(&pool, Utc::now()).await {
                    Ok(outcome) if outcome.total() == 0 => {
                        debug!("{:<12} --> 전이 대상 없음", "Scheduler");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        error!(
                            "{:<12} --> 경매 상태 업데이트 중 오류 발생: {:?}",
                            "Scheduler", e
                        );
                    }
                }
            }
        });
    }
}
// endregion: --- Auction Scheduler
