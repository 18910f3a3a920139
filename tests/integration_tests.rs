use bidstream::auction::lifecycle;
use bidstream::auction::model::Auction;
use bidstream::config::Config;
use bidstream::database::DatabaseManager;
use bidstream::query;
use bidstream::users::model::User;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

/// 트레이싱 초기화
fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 데이터베이스 매니저 설정
async fn setup() -> Arc<DatabaseManager> {
    let config = Config::from_env().expect("설정 읽기 실패");
    let db_manager = Arc::new(
        DatabaseManager::new(&config)
            .await
            .expect("데이터베이스 연결 실패"),
    );
    db_manager
        .initialize_database()
        .await
        .expect("스키마 초기화 실패");
    db_manager
}

/// 테스트마다 고유한 접미사
fn unique_suffix() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

/// 테스트용 사용자 생성
async fn create_test_user(db_manager: &DatabaseManager, prefix: &str) -> User {
    let suffix = unique_suffix();
    let email = format!("{prefix}-{suffix}@example.com");
    let username = format!("{prefix}{suffix}");
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, User>(
                    "INSERT INTO users (email, username, password_hash, first_name, last_name)
                     VALUES ($1, $2, '$argon2id$test$hash', '테스트', '사용자')
                     RETURNING *",
                )
                .bind(email)
                .bind(username)
                .fetch_one(&mut **tx)
                .await
            })
        })
        .await
        .unwrap()
}

/// 테스트용 경매 생성
#[allow(clippy::too_many_arguments)]
async fn create_test_auction(
    db_manager: &DatabaseManager,
    seller_id: i64,
    title: String,
    status: &str,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    reserve_price: Option<i64>,
    buy_now_price: Option<i64>,
) -> Auction {
    let status = status.to_string();
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, Auction>(
                    "INSERT INTO auctions (seller_id, title, description, category,
                        starting_price, reserve_price, buy_now_price, current_price,
                        start_time, end_time, status)
                     VALUES ($1, $2, '통합 테스트용 경매입니다.', '테스트',
                        10000, $3, $4, 10000, $5, $6, $7)
                     RETURNING *",
                )
                .bind(seller_id)
                .bind(title)
                .bind(reserve_price)
                .bind(buy_now_price)
                .bind(start_time)
                .bind(end_time)
                .bind(status)
                .fetch_one(&mut **tx)
                .await
            })
        })
        .await
        .unwrap()
}

/// 스키마 재생성 테스트. 데이터를 지우므로 단독으로 실행한다.
#[tokio::test]
#[ignore = "로컬 Postgres 필요, 모든 데이터 삭제"]
async fn test_reset_and_bootstrap_schema() {
    let db_manager = setup().await;
    db_manager.reset_database().await.expect("스키마 재생성 실패");

    let users = query::handlers::get_all_users(&db_manager).await.unwrap();
    assert!(users.is_empty());
    let auctions = query::handlers::get_all_auctions(&db_manager).await.unwrap();
    assert!(auctions.is_empty());
}

/// 입찰 테스트
#[tokio::test]
#[ignore = "로컬 Postgres와 실행 중인 서버 필요"]
async fn test_place_bid() {
    let db_manager = setup().await;
    let client = Client::new();

    let seller = create_test_user(&db_manager, "seller").await;
    let bidder = create_test_user(&db_manager, "bidder").await;
    let auction = create_test_auction(
        &db_manager,
        seller.id,
        "입찰 테스트 경매".to_string(),
        "ACTIVE",
        Utc::now(),
        Utc::now() + Duration::hours(2),
        None,
        None,
    )
    .await;

    // 입찰 요청 생성
    let bid_data = json!({
        "auction_id": auction.id,
        "bidder_id": bidder.id,
        "bid_amount": auction.current_price + 1000
    });

    // 입찰 처리
    let response = client
        .post("http://localhost:3000/bid")
        .json(&bid_data)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    // 데이터베이스에서 업데이트된 경매 조회
    let updated = query::handlers::get_auction(&db_manager, auction.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.current_price, auction.current_price + 1000);
    assert_eq!(updated.bid_count, 1);
    assert_eq!(updated.highest_bidder_id, Some(bidder.id));
}

/// 판매자 본인 입찰 거부 테스트
#[tokio::test]
#[ignore = "로컬 Postgres와 실행 중인 서버 필요"]
async fn test_self_bid_rejected() {
    let db_manager = setup().await;
    let client = Client::new();

    let seller = create_test_user(&db_manager, "selfseller").await;
    let auction = create_test_auction(
        &db_manager,
        seller.id,
        "본인 입찰 테스트 경매".to_string(),
        "ACTIVE",
        Utc::now(),
        Utc::now() + Duration::hours(2),
        None,
        None,
    )
    .await;

    let bid_data = json!({
        "auction_id": auction.id,
        "bidder_id": seller.id,
        "bid_amount": auction.current_price + 5000
    });

    let response = client
        .post("http://localhost:3000/bid")
        .json(&bid_data)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "SELF_BIDDING_NOT_ALLOWED");
}

/// 즉시 구매 테스트
#[tokio::test]
#[ignore = "로컬 Postgres와 실행 중인 서버 필요"]
async fn test_buy_now() {
    let db_manager = setup().await;
    let client = Client::new();

    let seller = create_test_user(&db_manager, "bnseller").await;
    let buyer = create_test_user(&db_manager, "bnbuyer").await;
    let auction = create_test_auction(
        &db_manager,
        seller.id,
        "즉시 구매 테스트 경매".to_string(),
        "ACTIVE",
        Utc::now(),
        Utc::now() + Duration::hours(2),
        None,
        Some(500_000),
    )
    .await;

    let buy_now_data = json!({
        "auction_id": auction.id,
        "buyer_id": buyer.id
    });

    let response = client
        .post("http://localhost:3000/buy-now")
        .json(&buy_now_data)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let updated = query::handlers::get_auction(&db_manager, auction.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, "COMPLETED");
    assert_eq!(updated.current_price, 500_000);
    assert_eq!(updated.highest_bidder_id, Some(buyer.id));
    assert!(updated.reserve_met);
}

/// 경매 사이클 테스트: SCHEDULED -> ACTIVE -> COMPLETED
#[tokio::test]
#[ignore = "로컬 Postgres와 실행 중인 서버 필요"]
async fn test_auction_lifecycle() {
    let db_manager = setup().await;
    let client = Client::new();

    let seller = create_test_user(&db_manager, "lcseller").await;
    let bidder = create_test_user(&db_manager, "lcbidder").await;

    // 시작 시각이 이미 지난 SCHEDULED 경매는 다음 틱에 활성화된다
    let auction = create_test_auction(
        &db_manager,
        seller.id,
        "경매 사이클 테스트 경매".to_string(),
        "SCHEDULED",
        Utc::now() - Duration::seconds(1),
        Utc::now() + Duration::seconds(5),
        None,
        None,
    )
    .await;

    // 스케줄러 활성화 대기
    tokio::time::sleep(tokio::time::Duration::from_millis(1500)).await;
    let activated = query::handlers::get_auction(&db_manager, auction.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(activated.status, "ACTIVE");

    // 입찰 처리
    let bid_data = json!({
        "auction_id": auction.id,
        "bidder_id": bidder.id,
        "bid_amount": activated.current_price + 5000
    });
    let response = client
        .post("http://localhost:3000/bid")
        .json(&bid_data)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    // 경매 종료 대기
    tokio::time::sleep(tokio::time::Duration::from_secs(6)).await;

    // 입찰이 있고 최저 낙찰가가 없으므로 낙찰 종료
    let finished = query::handlers::get_auction(&db_manager, auction.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(finished.status, "COMPLETED");
}

/// 유찰 테스트: 입찰 없이 만료된 경매
#[tokio::test]
#[ignore = "로컬 Postgres 필요"]
async fn test_expired_auction_without_bids_ends_no_sale() {
    let db_manager = setup().await;

    let seller = create_test_user(&db_manager, "nosale").await;
    let auction = create_test_auction(
        &db_manager,
        seller.id,
        "유찰 테스트 경매".to_string(),
        "ACTIVE",
        Utc::now() - Duration::hours(2),
        Utc::now() - Duration::minutes(1),
        None,
        None,
    )
    .await;

    let outcome = lifecycle::run_lifecycle_batch(db_manager.pool(), Utc::now())
        .await
        .unwrap();
    assert!(outcome.ended_no_sale >= 1);

    let updated = query::handlers::get_auction(&db_manager, auction.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, "ENDED_NO_SALE");
}

/// 일괄 처리 멱등성 테스트: 두 번째 실행은 아무것도 전이하지 않는다
#[tokio::test]
#[ignore = "로컬 Postgres 필요"]
async fn test_lifecycle_batch_idempotent() {
    let db_manager = setup().await;

    let seller = create_test_user(&db_manager, "idem").await;
    let auction = create_test_auction(
        &db_manager,
        seller.id,
        "멱등성 테스트 경매".to_string(),
        "ACTIVE",
        Utc::now() - Duration::hours(2),
        Utc::now() - Duration::minutes(1),
        None,
        None,
    )
    .await;

    let now = Utc::now();
    let first = lifecycle::run_lifecycle_batch(db_manager.pool(), now)
        .await
        .unwrap();
    assert!(first.total() >= 1);

    let after_first = query::handlers::get_auction(&db_manager, auction.id)
        .await
        .unwrap()
        .unwrap();

    // 입찰 없이 같은 시각으로 다시 실행하면 이 경매는 전이되지 않는다
    lifecycle::run_lifecycle_batch(db_manager.pool(), now)
        .await
        .unwrap();
    let after_second = query::handlers::get_auction(&db_manager, auction.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after_first.status, after_second.status);
    assert_eq!(after_first.version, after_second.version);
}

/// 회원 가입 및 중복 거부 테스트
#[tokio::test]
#[ignore = "로컬 Postgres와 실행 중인 서버 필요"]
async fn test_register_user_and_duplicates() {
    let client = Client::new();
    let suffix = unique_suffix();

    let register_data = json!({
        "email": format!("register-{suffix}@example.com"),
        "username": format!("register{suffix}"),
        "password": "secret-password",
        "first_name": "길동",
        "last_name": "홍"
    });

    let response = client
        .post("http://localhost:3000/users")
        .json(&register_data)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    // 비밀번호 해시는 응답에 직렬화되지 않는다
    assert!(body.get("password_hash").is_none());

    // 같은 이메일로 다시 가입하면 409
    let response = client
        .post("http://localhost:3000/users")
        .json(&register_data)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "EMAIL_ALREADY_EXISTS");
}

/// 동시성 입찰 테스트
#[tokio::test]
#[ignore = "로컬 Postgres와 실행 중인 서버 필요"]
async fn test_concurrent_bidding() {
    // 테스트 시작 시 tracing 초기화
    init_tracing();

    let db_manager = setup().await;

    let seller = create_test_user(&db_manager, "conseller").await;
    let mut bidders = Vec::with_capacity(50);
    for _ in 0..50 {
        bidders.push(create_test_user(&db_manager, "conbidder").await);
    }

    let auction = create_test_auction(
        &db_manager,
        seller.id,
        "동시성 입찰 테스트 경매".to_string(),
        "ACTIVE",
        Utc::now(),
        Utc::now() + Duration::hours(2),
        None,
        None,
    )
    .await;

    // 50개의 동시 입찰 생성
    let mut handles = vec![];
    for (i, bidder) in bidders.iter().enumerate() {
        let client = reqwest::Client::new();
        let bid_amount = auction.current_price + (i as i64 + 1) * 1000;
        let auction_id = auction.id;
        let bidder_id = bidder.id;

        let handle = tokio::spawn(async move {
            let bid_data = json!({
                "auction_id": auction_id,
                "bidder_id": bidder_id,
                "bid_amount": bid_amount
            });

            let response = client
                .post("http://127.0.0.1:3000/bid")
                .header("Content-Type", "application/json")
                .json(&bid_data)
                .send()
                .await
                .unwrap();

            let status = response.status();
            let body = response.text().await.unwrap();

            (status, body)
        });

        handles.push(handle);
    }

    // 모든 입찰 처리 대기 및 결과 확인
    let mut successful_bids = 0;
    let mut failed_bids = 0;
    for handle in handles {
        let (status, body) = handle.await.unwrap();

        if status == StatusCode::OK {
            successful_bids += 1;
        } else {
            let error_info: Value = serde_json::from_str(&body).unwrap();
            if error_info["code"] == "MAX_RETRIES_EXCEEDED" {
                error!("최대 재시도 횟수 초과 오류 발생: {:?}", error_info);
                panic!("최대 재시도 횟수 초과 오류 발생");
            }
            failed_bids += 1;
        }
    }

    info!(
        "성공한 입찰 수: {}, 실패한 입찰 수: {}",
        successful_bids, failed_bids
    );
    assert!(successful_bids >= 1);

    // 최종 상태 확인: 최고 입찰이 반드시 남는다
    let updated = query::handlers::get_auction(&db_manager, auction.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.current_price, auction.current_price + 50_000);
    assert_eq!(updated.bid_count as usize, successful_bids);

    // 입찰 이력 확인
    let bid_history = query::handlers::get_bid_history(&db_manager, auction.id)
        .await
        .unwrap();
    assert_eq!(bid_history.len(), successful_bids);

    // 버전은 성공한 입찰 수만큼 증가한다
    assert_eq!(updated.version, auction.version + successful_bids as i64);
}
