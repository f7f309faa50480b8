/// 입찰 관련 커맨드 처리 (서버 측)
/// 저장된 로트를 다시 읽어 같은 검증기로 검사한 뒤 조건부 쓰기를 수행한다.
// region:    --- Imports
use super::validator::{BidSubmission, BidValidator};
use crate::auction::model::Money;
use crate::error::AuctionError;
use crate::store::{BidReceipt, BidWrite, LotStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub expected_current_bid: Money,
    pub amount: f64,
    pub bidder: String,
    pub submitted_at: DateTime<Utc>,
}

impl From<BidWrite> for PlaceBidCommand {
    fn from(write: BidWrite) -> Self {
        Self {
            expected_current_bid: write.expected_current_bid,
            amount: write.new_bid.cents() as f64 / 100.0,
            bidder: write.bidder,
            submitted_at: write.submitted_at,
        }
    }
}

/// 입찰
pub async fn handle_place_bid<S>(
    lot_id: i64,
    cmd: PlaceBidCommand,
    store: &S,
    validator: &BidValidator,
) -> Result<BidReceipt, AuctionError>
where
    S: LotStore + ?Sized,
{
    info!(
        "{:<12} --> 입찰 요청 처리 시작: lot={} {:?}",
        "Command", lot_id, cmd
    );

    let lot = store.fetch_lot(lot_id).await?;
    let submission = BidSubmission {
        lot_id,
        bidder: cmd.bidder,
        amount: cmd.amount,
        submitted_at: cmd.submitted_at,
        expected_current_bid: Some(cmd.expected_current_bid),
    };

    let accepted = validator
        .validate(&lot, &submission, Utc::now())
        .map_err(|e| {
            warn!("{:<12} --> 입찰 거절: lot={} {}", "Command", lot_id, e);
            e
        })?;
    let extended = accepted.extended;

    let receipt = store.conditional_bid(accepted.into_write()).await?;
    if extended {
        info!(
            "{:<12} --> 마감 직전 입찰로 마감 연장: lot={} closes_at={}",
            "Command", lot_id, receipt.lot.closes_at
        );
    }
    info!(
        "{:<12} --> 입찰 성공: lot={} 현재 가격 {}",
        "Command", lot_id, receipt.lot.current_bid
    );
    Ok(receipt)
}

// endregion: --- Commands
