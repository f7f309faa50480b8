/// 인메모리 저장소
/// PostgreSQL 저장소와 같은 조건부 쓰기 규칙을 가진다. 테스트와 데모에 사용한다.
// region:    --- Imports
use super::{BidReceipt, BidWrite, LotAdminStore, LotStore, MessageRecord, OptionStore};
use crate::auction::model::{Bid, Lot, Money, NewLot, PricingOption};
use crate::error::{AuctionError, InactiveReason, ValidationError};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

// endregion: --- Imports

// region:    --- In-Memory Store
#[derive(Default)]
struct MemoryState {
    lots: Vec<Lot>,
    bids: Vec<Bid>,
    options: Vec<PricingOption>,
    messages: Vec<(i64, MessageRecord)>,
    next_id: i64,
}

impl MemoryState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn lot_mut(&mut self, lot_id: i64) -> Result<&mut Lot, AuctionError> {
        self.lots
            .iter_mut()
            .find(|lot| lot.id == lot_id)
            .ok_or(AuctionError::Validation(ValidationError::UnknownLot(lot_id)))
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 가격 옵션 추가
    pub async fn add_option(&self, name: &str, base_cost: Money) -> PricingOption {
        let mut state = self.state.lock().await;
        let option = PricingOption {
            id: state.next_id(),
            name: name.to_string(),
            base_cost,
        };
        state.options.push(option.clone());
        option
    }

    /// 기록된 메시지 조회
    pub async fn messages(&self) -> Vec<MessageRecord> {
        let state = self.state.lock().await;
        state.messages.iter().map(|(_, m)| m.clone()).collect()
    }
}

#[async_trait]
impl LotStore for InMemoryStore {
    async fn fetch_lots(&self) -> Result<Vec<Lot>, AuctionError> {
        let state = self.state.lock().await;
        let now = Utc::now();
        let mut lots: Vec<Lot> = state
            .lots
            .iter()
            .cloned()
            .map(|lot| lot.observed_at(now))
            .collect();
        lots.sort_by_key(|lot| (lot.display_order, lot.id));
        debug!("{:<12} --> 로트 {}개 조회", "MemoryStore", lots.len());
        Ok(lots)
    }

    async fn fetch_lot(&self, lot_id: i64) -> Result<Lot, AuctionError> {
        let state = self.state.lock().await;
        state
            .lots
            .iter()
            .find(|lot| lot.id == lot_id)
            .cloned()
            .map(|lot| lot.observed_at(Utc::now()))
            .ok_or(AuctionError::Validation(ValidationError::UnknownLot(lot_id)))
    }

    async fn fetch_bids(&self, lot_id: i64) -> Result<Vec<Bid>, AuctionError> {
        let state = self.state.lock().await;
        let mut bids: Vec<Bid> = state
            .bids
            .iter()
            .filter(|bid| bid.lot_id == lot_id)
            .cloned()
            .collect();
        bids.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(b.id.cmp(&a.id)));
        Ok(bids)
    }

    async fn conditional_bid(&self, write: BidWrite) -> Result<BidReceipt, AuctionError> {
        let mut state = self.state.lock().await;
        let bid_id = state.next_id();
        let lot = state.lot_mut(write.lot_id)?;

        if lot.current_bid != write.expected_current_bid {
            warn!(
                "{:<12} --> 입찰 충돌: lot={} expected={} stored={}",
                "MemoryStore", write.lot_id, write.expected_current_bid, lot.current_bid
            );
            return Err(AuctionError::StaleBid {
                lot_id: write.lot_id,
            });
        }
        if !lot.is_active {
            return Err(AuctionError::InactiveLot {
                reason: InactiveReason::Deactivated(write.lot_id),
            });
        }

        lot.current_bid = write.new_bid;
        lot.closes_at = write.closes_at;
        let lot = lot.clone().observed_at(Utc::now());

        let bid = Bid {
            id: bid_id,
            lot_id: write.lot_id,
            bidder: write.bidder,
            amount: write.new_bid,
            submitted_at: write.submitted_at,
        };
        state.bids.push(bid.clone());

        info!(
            "{:<12} --> 입찰 반영: lot={} price={}",
            "MemoryStore", lot.id, lot.current_bid
        );
        Ok(BidReceipt { lot, bid })
    }
}

#[async_trait]
impl LotAdminStore for InMemoryStore {
    async fn insert_lot(&self, new_lot: NewLot) -> Result<Lot, AuctionError> {
        let mut state = self.state.lock().await;
        let lot = Lot {
            id: state.next_id(),
            name: new_lot.name,
            description: new_lot.description,
            current_bid: new_lot.current_bid,
            min_raise: new_lot.min_raise,
            closes_at: new_lot.closes_at,
            time_left_seconds: 0,
            is_active: new_lot.is_active,
            image_url: new_lot.image_url,
            display_order: new_lot.display_order,
        }
        .observed_at(Utc::now());
        state.lots.push(lot.clone());
        Ok(lot)
    }

    async fn set_lot_active(&self, lot_id: i64, is_active: bool) -> Result<Lot, AuctionError> {
        let mut state = self.state.lock().await;
        let lot = state.lot_mut(lot_id)?;
        lot.is_active = is_active;
        Ok(lot.clone().observed_at(Utc::now()))
    }
}

#[async_trait]
impl OptionStore for InMemoryStore {
    async fn fetch_options(&self) -> Result<Vec<PricingOption>, AuctionError> {
        Ok(self.state.lock().await.options.clone())
    }

    async fn fetch_option(&self, option_id: i64) -> Result<PricingOption, AuctionError> {
        let state = self.state.lock().await;
        state
            .options
            .iter()
            .find(|option| option.id == option_id)
            .cloned()
            .ok_or(AuctionError::Validation(ValidationError::UnknownOption(
                option_id,
            )))
    }

    async fn record_message(&self, message: MessageRecord) -> Result<i64, AuctionError> {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        state.messages.push((id, message));
        Ok(id)
    }
}

// endregion: --- In-Memory Store
