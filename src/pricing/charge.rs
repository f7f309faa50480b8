/// 메시지 청구 처리
/// 서버에서 가격을 다시 계산하고, 클라이언트가 제시한 금액과 다르면 거절한다.
// region:    --- Imports
use super::{compute_cost, MessageCharge};
use crate::auction::model::Money;
use crate::error::{AuctionError, ValidationError};
use crate::store::{MessageRecord, OptionStore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Message Charge
/// 메시지 주문
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageOrder {
    pub option_id: i64,
    pub text: String,
    #[serde(default)]
    pub quick: bool,
    #[serde(default)]
    pub video: bool,
    pub buyer_contact: String,
    /// 클라이언트 미리보기 금액 (10진)
    pub declared_total: f64,
}

/// 청구 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipt {
    pub id: i64,
    pub charge: MessageCharge,
}

/// 메시지 청구
pub async fn submit_message_charge<S>(
    store: &S,
    order: MessageOrder,
) -> Result<MessageReceipt, AuctionError>
where
    S: OptionStore + ?Sized,
{
    if order.text.trim().is_empty() {
        return Err(ValidationError::MissingField("text".to_string()).into());
    }
    if order.buyer_contact.trim().is_empty() {
        return Err(ValidationError::MissingField("buyer_contact".to_string()).into());
    }
    // 반 센트 미만의 차이는 반올림으로 흡수된다
    let declared = Money::from_decimal(order.declared_total)?;

    let option = store.fetch_option(order.option_id).await?;
    let charge = compute_cost(&order.text, option.base_cost, order.quick, order.video);

    if declared != charge.total {
        warn!(
            "{:<12} --> 청구 금액 불일치: declared={} computed={}",
            "Charge", declared, charge.total
        );
        return Err(ValidationError::TotalMismatch {
            declared,
            computed: charge.total,
        }
        .into());
    }

    let id = store
        .record_message(MessageRecord {
            option_id: option.id,
            text: order.text,
            quick: order.quick,
            video: order.video,
            buyer_contact: order.buyer_contact,
            total: charge.total,
        })
        .await?;

    info!(
        "{:<12} --> 메시지 기록: id={} option={} total={}",
        "Charge", id, option.name, charge.total
    );
    Ok(MessageReceipt { id, charge })
}

// endregion: --- Message Charge
