/// 관리자 로트 관리
/// 호출자 정보는 상위 게이트웨이가 넣어준 헤더에서 읽는다. 인증 자체는 이 모듈의 범위가 아니다.
// region:    --- Imports
use crate::auction::model::{Lot, NewLot};
use crate::error::{AuctionError, ValidationError};
use crate::store::LotAdminStore;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tracing::info;

// endregion: --- Imports

// region:    --- Caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Admin => "admin",
        }
    }
}

/// 요청 호출자
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
}

impl Caller {
    pub fn require(&self, role: Role) -> Result<(), AuctionError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AuctionError::Authorization {
                required: role.as_str().to_string(),
            })
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let role = match header("x-user-role").as_deref() {
            Some("admin") => Role::Admin,
            _ => Role::Customer,
        };
        Ok(Caller {
            user_id: header("x-user-id").unwrap_or_else(|| "anonymous".to_string()),
            role,
        })
    }
}

// endregion: --- Caller

// region:    --- Admin Commands
/// 로트 생성
pub async fn create_lot<S>(store: &S, caller: &Caller, new_lot: NewLot) -> Result<Lot, AuctionError>
where
    S: LotAdminStore + ?Sized,
{
    caller.require(Role::Admin)?;

    if new_lot.name.trim().is_empty() {
        return Err(ValidationError::MissingField("name".to_string()).into());
    }
    if new_lot.current_bid.is_negative() || new_lot.min_raise.is_negative() {
        return Err(ValidationError::NegativeAmount.into());
    }
    if new_lot.min_raise.cents() == 0 {
        return Err(ValidationError::NonPositiveRaise.into());
    }
    new_lot.current_bid.checked_add(new_lot.min_raise)?;

    let lot = store.insert_lot(new_lot).await?;
    info!(
        "{:<12} --> 로트 생성: id={} by={}",
        "Admin", lot.id, caller.user_id
    );
    Ok(lot)
}

/// 로트 활성/비활성 전환
pub async fn set_lot_active<S>(
    store: &S,
    caller: &Caller,
    lot_id: i64,
    is_active: bool,
) -> Result<Lot, AuctionError>
where
    S: LotAdminStore + ?Sized,
{
    caller.require(Role::Admin)?;
    let lot = store.set_lot_active(lot_id, is_active).await?;
    info!(
        "{:<12} --> 로트 {} 상태 변경: active={} by={}",
        "Admin", lot_id, is_active, caller.user_id
    );
    Ok(lot)
}

// endregion: --- Admin Commands

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::Money;
    use crate::store::InMemoryStore;
    use chrono::{Duration, Utc};

    fn admin() -> Caller {
        Caller {
            user_id: "root".into(),
            role: Role::Admin,
        }
    }

    fn new_lot(min_raise: i64) -> NewLot {
        NewLot {
            name: "Crate of flares".into(),
            description: String::new(),
            current_bid: Money::ZERO,
            min_raise: Money::from_cents(min_raise),
            closes_at: Utc::now() + Duration::days(1),
            is_active: true,
            image_url: None,
            display_order: 0,
        }
    }

    #[tokio::test]
    async fn test_customer_cannot_create_lot() {
        let store = InMemoryStore::new();
        let customer = Caller {
            user_id: "u1".into(),
            role: Role::Customer,
        };
        let err = create_lot(&store, &customer, new_lot(100))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuctionError::Authorization {
                required: "admin".into()
            }
        );
    }

    #[tokio::test]
    async fn test_min_raise_must_be_positive() {
        let store = InMemoryStore::new();
        let err = create_lot(&store, &admin(), new_lot(0)).await.unwrap_err();
        assert_eq!(
            err,
            AuctionError::Validation(ValidationError::NonPositiveRaise)
        );
    }

    #[tokio::test]
    async fn test_toggle_active() {
        let store = InMemoryStore::new();
        let lot = create_lot(&store, &admin(), new_lot(100)).await.unwrap();
        let lot = set_lot_active(&store, &admin(), lot.id, false)
            .await
            .unwrap();
        assert!(!lot.is_active);
    }
}
