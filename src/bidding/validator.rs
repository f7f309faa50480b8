/// 입찰 검증기
/// 검사 순서: 활성 여부 → 마감 여부 → 금액 형식 → 기대 입찰가 → 최소 입찰가.
/// 처음 실패한 검사가 결과가 되며, 거절 시 어떤 상태도 바뀌지 않는다.
// region:    --- Imports
use crate::auction::model::{Lot, Money};
use crate::error::{AuctionError, InactiveReason, ValidationError};
use crate::store::BidWrite;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// endregion: --- Imports

// region:    --- Bid Stages
/// 접수된 입찰
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidSubmission {
    pub lot_id: i64,
    pub bidder: String,
    /// 클라이언트가 보낸 10진 금액
    pub amount: f64,
    pub submitted_at: DateTime<Utc>,
    /// 클라이언트가 보고 있던 입찰가. 주어지면 저장된 값과 일치해야 한다.
    pub expected_current_bid: Option<Money>,
}

/// 검증을 통과한 입찰
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedBid {
    pub lot_id: i64,
    pub bidder: String,
    pub amount: Money,
    pub expected_current_bid: Money,
    pub submitted_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
    pub extended: bool,
}

impl AcceptedBid {
    /// 저장소 조건부 쓰기로 변환
    pub fn into_write(self) -> BidWrite {
        BidWrite {
            lot_id: self.lot_id,
            expected_current_bid: self.expected_current_bid,
            new_bid: self.amount,
            bidder: self.bidder,
            submitted_at: self.submitted_at,
            closes_at: self.closes_at,
        }
    }
}

// endregion: --- Bid Stages

// region:    --- Validator
#[derive(Debug, Clone, Copy)]
pub struct BidValidator {
    extension_threshold: Duration,
}

impl BidValidator {
    pub fn new(extension_threshold: std::time::Duration) -> Self {
        Self {
            extension_threshold: Duration::seconds(extension_threshold.as_secs() as i64),
        }
    }

    /// 검증 시점에 읽은 로트 기준으로 입찰 검사
    pub fn validate(
        &self,
        lot: &Lot,
        submission: &BidSubmission,
        now: DateTime<Utc>,
    ) -> Result<AcceptedBid, AuctionError> {
        if !lot.is_active {
            return Err(AuctionError::InactiveLot {
                reason: InactiveReason::Deactivated(lot.id),
            });
        }
        if lot.is_closed_at(now) {
            return Err(AuctionError::InactiveLot {
                reason: InactiveReason::Closed(lot.id),
            });
        }

        let amount = Money::from_decimal(submission.amount)?;
        if submission.bidder.trim().is_empty() {
            return Err(ValidationError::MissingField("bidder".to_string()).into());
        }

        if let Some(expected) = submission.expected_current_bid {
            if expected != lot.current_bid {
                return Err(AuctionError::StaleBid { lot_id: lot.id });
            }
        }

        let minimum = lot.minimum_bid()?;
        if amount < minimum {
            return Err(ValidationError::BidTooLow {
                minimum,
                offered: amount,
            }
            .into());
        }

        let (closes_at, extended) = self.extended_close(lot.closes_at, now);
        Ok(AcceptedBid {
            lot_id: lot.id,
            bidder: submission.bidder.clone(),
            amount,
            expected_current_bid: lot.current_bid,
            submitted_at: submission.submitted_at,
            closes_at,
            extended,
        })
    }

    /// 마감 직전 입찰이면 남은 시간을 기준값으로 재설정 (줄이지 않고, 누적하지 않는다)
    fn extended_close(
        &self,
        closes_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> (DateTime<Utc>, bool) {
        if closes_at - now < self.extension_threshold {
            (now + self.extension_threshold, true)
        } else {
            (closes_at, false)
        }
    }
}

// endregion: --- Validator
