/// 모든 로트 조회 (표시 순서)
pub const GET_ALL_LOTS: &str = r#"
    SELECT id, name, description, current_bid, min_raise, closes_at, is_active, image_url, display_order
    FROM lots
    ORDER BY display_order, id
"#;

/// 로트 조회
pub const GET_LOT: &str = "SELECT id, name, description, current_bid, min_raise, closes_at, is_active, image_url, display_order FROM lots WHERE id = $1";

/// 조건부 입찰 반영
/// 저장된 입찰가가 기대값과 다르면 아무 행도 갱신되지 않는다.
pub const CONDITIONAL_BID: &str = r#"
    UPDATE lots SET current_bid = $1, closes_at = $2
    WHERE id = $3 AND current_bid = $4 AND is_active
    RETURNING id, name, description, current_bid, min_raise, closes_at, is_active, image_url, display_order
"#;

/// 입찰 기록 추가
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (lot_id, bidder, amount, submitted_at)
    VALUES ($1, $2, $3, $4)
    RETURNING id, lot_id, bidder, amount, submitted_at
"#;

/// 입찰 이력 조회
pub const GET_BID_HISTORY: &str = r#"
    SELECT id, lot_id, bidder, amount, submitted_at
    FROM bids
    WHERE lot_id = $1
    ORDER BY submitted_at DESC, id DESC
"#;

/// 로트 생성
pub const INSERT_LOT: &str = r#"
    INSERT INTO lots (name, description, current_bid, min_raise, closes_at, is_active, image_url, display_order)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    RETURNING id, name, description, current_bid, min_raise, closes_at, is_active, image_url, display_order
"#;

/// 로트 활성 상태 변경
pub const SET_LOT_ACTIVE: &str = r#"
    UPDATE lots SET is_active = $1
    WHERE id = $2
    RETURNING id, name, description, current_bid, min_raise, closes_at, is_active, image_url, display_order
"#;

/// 가격 옵션 조회
pub const GET_ALL_OPTIONS: &str = "SELECT id, name, base_cost FROM pricing_options ORDER BY id";

/// 가격 옵션 단건 조회
pub const GET_OPTION: &str = "SELECT id, name, base_cost FROM pricing_options WHERE id = $1";

/// 메시지 기록
pub const INSERT_MESSAGE: &str = r#"
    INSERT INTO messages (option_id, text, quick, video, buyer_contact, total)
    VALUES ($1, $2, $3, $4, $5, $6)
    RETURNING id
"#;
