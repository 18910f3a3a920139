// region:    --- Imports
use crate::config::Config;
use crate::database::DatabaseManager;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Modules
mod auction;
mod bidding;
mod config;
mod database;
mod error;
mod handlers;
mod query;
mod scheduler;
mod store;
mod users;

// endregion: --- Modules

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 설정은 기동 시 한 번 읽어 명시적으로 전달한다
    let config = Arc::new(Config::from_env()?);

    // DatabaseManager 생성
    let db_manager = Arc::new(DatabaseManager::new(&config).await?);

    // 스키마 초기화
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> 데이터베이스 초기화 성공", "Main");

    // 수명 주기 스케줄러 시작
    let scheduler =
        scheduler::AuctionScheduler::new(db_manager.get_pool(), config.scheduler_interval);
    scheduler.start().await;
    info!(
        "{:<12} --> 수명 주기 스케줄러 시작 (주기: {:?})",
        "Main", config.scheduler_interval
    );

    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 라우터 설정
    let routes_all = Router::new()
        .route("/users", post(handlers::handle_register).get(handlers::handle_get_users))
        .route("/users/lookup", get(handlers::handle_lookup_user))
        .route("/users/:id", get(handlers::handle_get_user))
        .route("/users/:id/auctions", get(handlers::handle_get_user_auctions))
        .route("/users/:id/stats", get(handlers::handle_get_user_stats))
        .route("/users/:id/winning", get(handlers::handle_get_user_winning))
        .route(
            "/auctions",
            post(handlers::handle_create).get(handlers::handle_get_auctions),
        )
        .route("/auctions/active", get(handlers::handle_get_active))
        .route("/auctions/ending-soon", get(handlers::handle_get_ending_soon))
        .route("/auctions/featured", get(handlers::handle_get_featured))
        .route("/auctions/search", get(handlers::handle_search))
        .route("/auctions/price-range", get(handlers::handle_price_range))
        .route("/auctions/popular", get(handlers::handle_get_popular))
        .route("/auctions/recent", get(handlers::handle_get_recent))
        .route("/auctions/no-bids", get(handlers::handle_get_no_bids))
        .route(
            "/auctions/category/:category",
            get(handlers::handle_get_by_category),
        )
        .route(
            "/auctions/:id",
            get(handlers::handle_get_auction).put(handlers::handle_update),
        )
        .route("/auctions/:id/publish", post(handlers::handle_publish))
        .route("/auctions/:id/cancel", post(handlers::handle_cancel))
        .route("/auctions/:id/suspend", post(handlers::handle_suspend))
        .route("/auctions/:id/reinstate", post(handlers::handle_reinstate))
        .route("/auctions/:id/bids", get(handlers::handle_get_bid_history))
        .route(
            "/auctions/:id/highest-bid",
            get(handlers::handle_get_highest_bid),
        )
        .route("/auctions/:id/watch", post(handlers::handle_watch))
        .route("/bid", post(handlers::handle_bid))
        .route("/buy-now", post(handlers::handle_buy_now_request))
        .route("/stats", get(handlers::handle_get_stats))
        .layer(cors)
        .with_state((Arc::clone(&db_manager), Arc::clone(&config)));

    // 리스너 생성
    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}
// endregion: --- Main
