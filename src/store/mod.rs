/// 로트 저장소 인터페이스
/// 입찰 직렬화는 저장소의 조건부 쓰기(compare-and-set) 한 곳에서만 일어난다.
// region:    --- Imports
use crate::auction::model::{Bid, Lot, Money, NewLot, PricingOption};
use crate::error::AuctionError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod http;
pub mod memory;
pub mod postgres;
mod queries;

pub use http::HttpLotStore;
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

// endregion: --- Imports

// region:    --- Store Models
/// 조건부 입찰 쓰기
/// 저장된 current_bid 가 expected_current_bid 와 같을 때만 반영된다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidWrite {
    pub lot_id: i64,
    pub expected_current_bid: Money,
    pub new_bid: Money,
    pub bidder: String,
    pub submitted_at: DateTime<Utc>,
    /// 연장 규칙이 적용된 마감 시각
    pub closes_at: DateTime<Utc>,
}

/// 입찰 반영 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidReceipt {
    pub lot: Lot,
    pub bid: Bid,
}

/// 가격이 확정된 메시지
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub option_id: i64,
    pub text: String,
    pub quick: bool,
    pub video: bool,
    pub buyer_contact: String,
    pub total: Money,
}

// endregion: --- Store Models

// region:    --- Store Traits
/// 로트 조회 및 조건부 입찰
#[async_trait]
pub trait LotStore: Send + Sync {
    /// 표시 순서대로 모든 로트 조회
    async fn fetch_lots(&self) -> Result<Vec<Lot>, AuctionError>;

    async fn fetch_lot(&self, lot_id: i64) -> Result<Lot, AuctionError>;

    /// 입찰 이력 (최신순)
    async fn fetch_bids(&self, lot_id: i64) -> Result<Vec<Bid>, AuctionError>;

    async fn conditional_bid(&self, write: BidWrite) -> Result<BidReceipt, AuctionError>;
}

/// 관리자용 로트 변경
#[async_trait]
pub trait LotAdminStore: Send + Sync {
    async fn insert_lot(&self, lot: NewLot) -> Result<Lot, AuctionError>;

    async fn set_lot_active(&self, lot_id: i64, is_active: bool) -> Result<Lot, AuctionError>;
}

/// 가격 옵션 및 메시지 기록
#[async_trait]
pub trait OptionStore: Send + Sync {
    async fn fetch_options(&self) -> Result<Vec<PricingOption>, AuctionError>;

    async fn fetch_option(&self, option_id: i64) -> Result<PricingOption, AuctionError>;

    async fn record_message(&self, message: MessageRecord) -> Result<i64, AuctionError>;
}

/// 서버가 사용하는 전체 저장소
pub trait AuctionBackend: LotStore + LotAdminStore + OptionStore {}

impl<T> AuctionBackend for T where T: LotStore + LotAdminStore + OptionStore {}

// endregion: --- Store Traits
