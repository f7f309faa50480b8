/// PostgreSQL 저장소
// region:    --- Imports
use super::queries;
use super::{BidReceipt, BidWrite, LotAdminStore, LotStore, MessageRecord, OptionStore};
use crate::auction::model::{Bid, Lot, Money, NewLot, PricingOption};
use crate::database::DatabaseManager;
use crate::error::{AuctionError, InactiveReason, ValidationError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::sync::Arc;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Rows
#[derive(FromRow)]
struct LotRow {
    id: i64,
    name: String,
    description: String,
    current_bid: i64,
    min_raise: i64,
    closes_at: DateTime<Utc>,
    is_active: bool,
    image_url: Option<String>,
    display_order: i32,
}

impl LotRow {
    fn into_lot(self, now: DateTime<Utc>) -> Lot {
        Lot {
            id: self.id,
            name: self.name,
            description: self.description,
            current_bid: Money::from_cents(self.current_bid),
            min_raise: Money::from_cents(self.min_raise),
            closes_at: self.closes_at,
            time_left_seconds: 0,
            is_active: self.is_active,
            image_url: self.image_url,
            display_order: self.display_order,
        }
        .observed_at(now)
    }
}

#[derive(FromRow)]
struct BidRow {
    id: i64,
    lot_id: i64,
    bidder: String,
    amount: i64,
    submitted_at: DateTime<Utc>,
}

impl From<BidRow> for Bid {
    fn from(row: BidRow) -> Self {
        Bid {
            id: row.id,
            lot_id: row.lot_id,
            bidder: row.bidder,
            amount: Money::from_cents(row.amount),
            submitted_at: row.submitted_at,
        }
    }
}

#[derive(FromRow)]
struct OptionRow {
    id: i64,
    name: String,
    base_cost: i64,
}

impl From<OptionRow> for PricingOption {
    fn from(row: OptionRow) -> Self {
        PricingOption {
            id: row.id,
            name: row.name,
            base_cost: Money::from_cents(row.base_cost),
        }
    }
}

// endregion: --- Rows

// region:    --- Postgres Store
pub struct PostgresStore {
    db_manager: Arc<DatabaseManager>,
}

impl PostgresStore {
    pub fn new(db_manager: Arc<DatabaseManager>) -> Self {
        Self { db_manager }
    }

    async fn find_lot(&self, lot_id: i64) -> Result<Option<Lot>, AuctionError> {
        let row = sqlx::query_as::<_, LotRow>(queries::GET_LOT)
            .bind(lot_id)
            .fetch_optional(self.db_manager.pool())
            .await?;
        Ok(row.map(|row| row.into_lot(Utc::now())))
    }

    /// 조건부 쓰기 실패 원인 판별
    async fn classify_conflict(&self, write: &BidWrite) -> AuctionError {
        match self.find_lot(write.lot_id).await {
            Ok(None) => ValidationError::UnknownLot(write.lot_id).into(),
            Ok(Some(lot)) if !lot.is_active => AuctionError::InactiveLot {
                reason: InactiveReason::Deactivated(lot.id),
            },
            Ok(Some(lot)) => {
                warn!(
                    "{:<12} --> 입찰 충돌: lot={} expected={} stored={}",
                    "PgStore", lot.id, write.expected_current_bid, lot.current_bid
                );
                AuctionError::StaleBid { lot_id: lot.id }
            }
            Err(e) => e,
        }
    }
}

#[async_trait]
impl LotStore for PostgresStore {
    async fn fetch_lots(&self) -> Result<Vec<Lot>, AuctionError> {
        let rows = self
            .db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, LotRow>(queries::GET_ALL_LOTS)
                        .fetch_all(&mut **tx)
                        .await
                })
            })
            .await?;
        let now = Utc::now();
        Ok(rows.into_iter().map(|row| row.into_lot(now)).collect())
    }

    async fn fetch_lot(&self, lot_id: i64) -> Result<Lot, AuctionError> {
        self.find_lot(lot_id)
            .await?
            .ok_or(AuctionError::Validation(ValidationError::UnknownLot(lot_id)))
    }

    async fn fetch_bids(&self, lot_id: i64) -> Result<Vec<Bid>, AuctionError> {
        let rows = self
            .db_manager
            .transaction(|tx| {
                Box::pin(async move {
                    sqlx::query_as::<_, BidRow>(queries::GET_BID_HISTORY)
                        .bind(lot_id)
                        .fetch_all(&mut **tx)
                        .await
                })
            })
            .await?;
        Ok(rows.into_iter().map(Bid::from).collect())
    }

    async fn conditional_bid(&self, write: BidWrite) -> Result<BidReceipt, AuctionError> {
        let mut tx = self.db_manager.pool().begin().await?;

        let updated = sqlx::query_as::<_, LotRow>(queries::CONDITIONAL_BID)
            .bind(write.new_bid.cents())
            .bind(write.closes_at)
            .bind(write.lot_id)
            .bind(write.expected_current_bid.cents())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = updated else {
            tx.rollback().await?;
            return Err(self.classify_conflict(&write).await);
        };

        let bid = sqlx::query_as::<_, BidRow>(queries::INSERT_BID)
            .bind(write.lot_id)
            .bind(&write.bidder)
            .bind(write.new_bid.cents())
            .bind(write.submitted_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        let lot = row.into_lot(Utc::now());
        info!(
            "{:<12} --> 입찰 반영: lot={} price={}",
            "PgStore", lot.id, lot.current_bid
        );
        Ok(BidReceipt {
            lot,
            bid: bid.into(),
        })
    }
}

#[async_trait]
impl LotAdminStore for PostgresStore {
    async fn insert_lot(&self, new_lot: NewLot) -> Result<Lot, AuctionError> {
        let row = sqlx::query_as::<_, LotRow>(queries::INSERT_LOT)
            .bind(&new_lot.name)
            .bind(&new_lot.description)
            .bind(new_lot.current_bid.cents())
            .bind(new_lot.min_raise.cents())
            .bind(new_lot.closes_at)
            .bind(new_lot.is_active)
            .bind(&new_lot.image_url)
            .bind(new_lot.display_order)
            .fetch_one(self.db_manager.pool())
            .await?;
        Ok(row.into_lot(Utc::now()))
    }

    async fn set_lot_active(&self, lot_id: i64, is_active: bool) -> Result<Lot, AuctionError> {
        sqlx::query_as::<_, LotRow>(queries::SET_LOT_ACTIVE)
            .bind(is_active)
            .bind(lot_id)
            .fetch_optional(self.db_manager.pool())
            .await?
            .map(|row| row.into_lot(Utc::now()))
            .ok_or(AuctionError::Validation(ValidationError::UnknownLot(lot_id)))
    }
}

#[async_trait]
impl OptionStore for PostgresStore {
    async fn fetch_options(&self) -> Result<Vec<PricingOption>, AuctionError> {
        let rows = sqlx::query_as::<_, OptionRow>(queries::GET_ALL_OPTIONS)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(rows.into_iter().map(PricingOption::from).collect())
    }

    async fn fetch_option(&self, option_id: i64) -> Result<PricingOption, AuctionError> {
        sqlx::query_as::<_, OptionRow>(queries::GET_OPTION)
            .bind(option_id)
            .fetch_optional(self.db_manager.pool())
            .await?
            .map(PricingOption::from)
            .ok_or(AuctionError::Validation(ValidationError::UnknownOption(
                option_id,
            )))
    }

    async fn record_message(&self, message: MessageRecord) -> Result<i64, AuctionError> {
        let id = sqlx::query_scalar::<_, i64>(queries::INSERT_MESSAGE)
            .bind(message.option_id)
            .bind(&message.text)
            .bind(message.quick)
            .bind(message.video)
            .bind(&message.buyer_contact)
            .bind(message.total.cents())
            .fetch_one(self.db_manager.pool())
            .await?;
        Ok(id)
    }
}

// endregion: --- Postgres Store
