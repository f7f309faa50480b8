/// 경매 코어 에러 정의
/// 입찰 검증, 가격 계산, 저장소 호출에서 발생하는 모든 실패는 이 타입으로 전달된다.
// region:    --- Imports
use crate::auction::model::Money;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// endregion: --- Imports

// region:    --- Error Types
/// 경매 에러
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionError {
    /// 입력값 누락 또는 잘못된 입력
    #[error("validation failed: {0}")]
    Validation(ValidationError),

    /// compare-and-set 경합에서 패배. 새로고침 후 재시도해야 한다.
    #[error("lot {lot_id} changed since it was read, refresh and retry")]
    StaleBid { lot_id: i64 },

    /// 비활성화되었거나 종료된 로트
    #[error("lot is not open for bidding: {reason}")]
    InactiveLot { reason: InactiveReason },

    /// 호출자 권한 부족
    #[error("action requires the {required} role")]
    Authorization { required: String },

    /// 저장소 접근 불가. 백오프 후 재시도 가능
    #[error("store unreachable: {0}")]
    TransientIo(String),
}

/// 입력 검증 실패 상세
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("amount is not a finite number")]
    NonFiniteAmount,

    #[error("amount must not be negative")]
    NegativeAmount,

    #[error("amount exceeds the limit of {limit}")]
    AmountTooLarge { limit: Money },

    #[error("bid {offered} is below the minimum acceptable bid {minimum}")]
    BidTooLow { minimum: Money, offered: Money },

    #[error("unknown lot: {0}")]
    UnknownLot(i64),

    #[error("unknown pricing option: {0}")]
    UnknownOption(i64),

    #[error("{0} must not be empty")]
    MissingField(String),

    #[error("min raise must be positive")]
    NonPositiveRaise,

    #[error("declared total {declared} does not match computed total {computed}")]
    TotalMismatch { declared: Money, computed: Money },
}

/// 로트가 입찰을 받지 않는 이유
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InactiveReason {
    #[error("lot {0} is deactivated")]
    Deactivated(i64),

    #[error("lot {0} is closed")]
    Closed(i64),

    #[error("placeholder entries are display-only")]
    Placeholder,
}

impl From<ValidationError> for AuctionError {
    fn from(e: ValidationError) -> Self {
        AuctionError::Validation(e)
    }
}

impl From<sqlx::Error> for AuctionError {
    fn from(e: sqlx::Error) -> Self {
        AuctionError::TransientIo(e.to_string())
    }
}

impl From<reqwest::Error> for AuctionError {
    fn from(e: reqwest::Error) -> Self {
        AuctionError::TransientIo(e.to_string())
    }
}

impl AuctionError {
    /// 응답 바디에 실리는 에러 코드
    pub fn code(&self) -> &'static str {
        match self {
            AuctionError::Validation(ValidationError::BidTooLow { .. }) => "LOW_BID",
            AuctionError::Validation(_) => "VALIDATION",
            AuctionError::StaleBid { .. } => "STALE_BID",
            AuctionError::InactiveLot { .. } => "LOT_INACTIVE",
            AuctionError::Authorization { .. } => "FORBIDDEN",
            AuctionError::TransientIo(_) => "UNAVAILABLE",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuctionError::Validation(_) => StatusCode::BAD_REQUEST,
            AuctionError::StaleBid { .. } | AuctionError::InactiveLot { .. } => {
                StatusCode::CONFLICT
            }
            AuctionError::Authorization { .. } => StatusCode::FORBIDDEN,
            AuctionError::TransientIo(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, AuctionError::TransientIo(_))
    }
}

// endregion: --- Error Types

// region:    --- Error Response
/// HTTP 에러 응답 바디
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    pub detail: AuctionError,
}

impl From<AuctionError> for ErrorBody {
    fn from(e: AuctionError) -> Self {
        Self {
            error: e.to_string(),
            code: e.code().to_string(),
            detail: e,
        }
    }
}

impl IntoResponse for AuctionError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody::from(self))).into_response()
    }
}

// endregion: --- Error Response

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_keeps_detail() {
        let err = AuctionError::Validation(ValidationError::BidTooLow {
            minimum: Money::from_cents(1500),
            offered: Money::from_cents(1499),
        });
        let body = serde_json::to_value(ErrorBody::from(err.clone())).unwrap();
        assert_eq!(body["code"], "LOW_BID");

        let parsed: ErrorBody = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.detail, err);
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuctionError::StaleBid { lot_id: 1 }.status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuctionError::TransientIo("down".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert!(AuctionError::TransientIo("down".into()).is_transient());
    }
}
