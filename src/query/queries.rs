/// 경매 단건 조회
pub const GET_AUCTION: &str = "SELECT * FROM auctions WHERE id = $1";

/// 모든 경매 조회
pub const GET_ALL_AUCTIONS: &str = "SELECT * FROM auctions ORDER BY created_at DESC";

/// 상태별 경매 조회
pub const FIND_BY_STATUS: &str =
    "SELECT * FROM auctions WHERE status = $1 ORDER BY created_at DESC";

/// 입찰 가능 시간 창 안의 ACTIVE 경매 조회
pub const FIND_ACTIVE_AUCTIONS: &str = r#"
    SELECT * FROM auctions
    WHERE status = 'ACTIVE' AND start_time <= $1 AND end_time > $1
    ORDER BY end_time ASC
"#;

/// 마감 임박 경매 조회
pub const FIND_ENDING_SOON: &str = r#"
    SELECT * FROM auctions
    WHERE status = 'ACTIVE' AND end_time BETWEEN $1 AND $2
    ORDER BY end_time ASC
"#;

/// 판매자별 경매 조회
pub const FIND_BY_SELLER: &str =
    "SELECT * FROM auctions WHERE seller_id = $1 ORDER BY created_at DESC";

/// 카테고리별 경매 조회 (상태 필터는 선택)
pub const FIND_BY_CATEGORY: &str = r#"
    SELECT * FROM auctions
    WHERE category = $1 AND ($2::TEXT IS NULL OR status = $2)
    ORDER BY created_at DESC
"#;

/// 추천 중인 ACTIVE 경매 조회
pub const FIND_FEATURED_ACTIVE: &str = r#"
    SELECT * FROM auctions
    WHERE featured = TRUE AND status = 'ACTIVE'
    ORDER BY end_time ASC
"#;

/// 특정 사용자가 최고 입찰자인 경매 조회
pub const FIND_BY_HIGHEST_BIDDER: &str = r#"
    SELECT * FROM auctions
    WHERE highest_bidder_id = $1 AND status IN ('ACTIVE', 'COMPLETED')
    ORDER BY end_time ASC
"#;

/// 제목/설명 검색 (대소문자 무시, 상태 필터는 선택)
pub const SEARCH_AUCTIONS: &str = r#"
    SELECT * FROM auctions
    WHERE (title ILIKE '%' || $1 || '%' OR description ILIKE '%' || $1 || '%')
      AND ($2::TEXT IS NULL OR status = $2)
    ORDER BY created_at DESC
"#;

/// 현재 가격 범위 조회 (상태 필터는 선택)
pub const FIND_BY_PRICE_RANGE: &str = r#"
    SELECT * FROM auctions
    WHERE current_price BETWEEN $1 AND $2
      AND ($3::TEXT IS NULL OR status = $3)
    ORDER BY current_price ASC
"#;

/// 인기순 조회: 입찰 x3 + 조회 + 관심 x2 (상태 필터는 선택)
pub const FIND_BY_POPULARITY: &str = r#"
    SELECT * FROM auctions
    WHERE ($1::TEXT IS NULL OR status = $1)
    ORDER BY (bid_count * 3 + view_count + watch_count * 2) DESC
"#;

/// 최근 등록 경매 조회
pub const FIND_RECENT: &str = r#"
    SELECT * FROM auctions
    WHERE status IN ('ACTIVE', 'SCHEDULED')
    ORDER BY created_at DESC
    LIMIT $1
"#;

/// 입찰 없는 ACTIVE 경매 조회
pub const FIND_NO_BID: &str = r#"
    SELECT * FROM auctions
    WHERE status = 'ACTIVE' AND bid_count = 0
    ORDER BY end_time ASC
"#;

/// 상태별 경매 수
pub const COUNT_BY_STATUS: &str = "SELECT COUNT(*) FROM auctions WHERE status = $1";

/// 판매자별 경매 수
pub const COUNT_BY_SELLER: &str = "SELECT COUNT(*) FROM auctions WHERE seller_id = $1";

/// ACTIVE 경매 현재 가격 합계
pub const TOTAL_ACTIVE_VALUE: &str =
    "SELECT COALESCE(SUM(current_price), 0)::BIGINT FROM auctions WHERE status = 'ACTIVE'";

/// ACTIVE 경매 현재 가격 평균
pub const AVERAGE_ACTIVE_PRICE: &str =
    "SELECT COALESCE(AVG(current_price), 0)::BIGINT FROM auctions WHERE status = 'ACTIVE'";

/// 조회 수 증가
pub const INCREMENT_VIEW_COUNT: &str =
    "UPDATE auctions SET view_count = view_count + 1 WHERE id = $1";

/// 관심 수 증감 (음수 허용, 0 밑으로는 내려가지 않음)
pub const UPDATE_WATCH_COUNT: &str =
    "UPDATE auctions SET watch_count = GREATEST(watch_count + $2, 0) WHERE id = $1";

/// 입찰 이력 조회
pub const GET_BID_HISTORY: &str = r#"
    SELECT id, auction_id, bidder_id, amount, bid_time
    FROM bids
    WHERE auction_id = $1
    ORDER BY bid_time DESC
"#;

/// 최고 입찰가 조회
pub const GET_HIGHEST_BID: &str =
    "SELECT MAX(amount) as highest_bid FROM bids WHERE auction_id = $1";

/// 사용자 단건 조회
pub const GET_USER: &str = "SELECT * FROM users WHERE id = $1";

/// 모든 사용자 조회
pub const GET_ALL_USERS: &str = "SELECT * FROM users ORDER BY created_at DESC";

/// 이메일 또는 사용자 이름으로 조회 (로그인용)
pub const FIND_USER_BY_IDENTIFIER: &str =
    "SELECT * FROM users WHERE email = $1 OR username = $1";

/// 전체 사용자 수
pub const COUNT_USERS: &str = "SELECT COUNT(*) FROM users";

/// 이메일 인증 완료 사용자 수
pub const COUNT_VERIFIED_USERS: &str =
    "SELECT COUNT(*) FROM users WHERE email_verified = TRUE";
