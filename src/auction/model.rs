// region:    --- Imports
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Sub};

// endregion: --- Imports

// region:    --- Money
/// 금액 (센트 단위 정수)
/// 미리보기와 실제 청구가 같은 값을 내도록 부동소수점을 쓰지 않는다.
/// JSON 에서는 10진 달러 금액으로 주고받는다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// 받을 수 있는 최대 금액 (100억 달러)
    pub const MAX: Money = Money(1_000_000_000_000);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn from_dollars(dollars: i64) -> Self {
        Money(dollars * 100)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// 클라이언트가 보낸 10진 금액을 센트로 변환
    /// NaN, 무한대, 음수는 거부하고 가장 가까운 센트로 반올림한다.
    pub fn from_decimal(amount: f64) -> Result<Self, ValidationError> {
        if !amount.is_finite() {
            return Err(ValidationError::NonFiniteAmount);
        }
        if amount < 0.0 {
            return Err(ValidationError::NegativeAmount);
        }
        let cents = (amount * 100.0).round();
        if cents > Money::MAX.0 as f64 {
            return Err(ValidationError::AmountTooLarge { limit: Money::MAX });
        }
        Ok(Money(cents as i64))
    }

    /// 상한을 넘거나 i64 범위를 벗어나면 거절하는 덧셈
    pub fn checked_add(self, rhs: Money) -> Result<Money, ValidationError> {
        self.0
            .checked_add(rhs.0)
            .filter(|cents| *cents <= Money::MAX.0)
            .map(Money)
            .ok_or(ValidationError::AmountTooLarge { limit: Money::MAX })
    }

    /// 표시용 덧셈. 상한에서 멈춘다.
    pub fn saturating_add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0).min(Money::MAX.0))
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    fn as_decimal(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Money::from_decimal(amount).map_err(serde::de::Error::custom)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

// endregion: --- Money

// region:    --- Lot
/// 경매 로트 모델
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lot {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub current_bid: Money,
    pub min_raise: Money,
    pub closes_at: DateTime<Utc>,
    /// 저장소가 조회 시점에 계산한 남은 시간
    pub time_left_seconds: u64,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub display_order: i32,
}

impl Lot {
    /// 최소 입찰 가능 금액 (현재 입찰가 + 최소 인상폭)
    pub fn minimum_bid(&self) -> Result<Money, ValidationError> {
        self.current_bid.checked_add(self.min_raise)
    }

    pub fn is_closed_at(&self, now: DateTime<Utc>) -> bool {
        self.closes_at <= now
    }

    /// 주어진 시각 기준으로 남은 시간을 다시 계산한 스냅샷
    pub fn observed_at(mut self, now: DateTime<Utc>) -> Self {
        self.time_left_seconds = time_left_at(self.closes_at, now);
        self
    }
}

/// 신규 로트 (관리자 생성용)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLot {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub current_bid: Money,
    pub min_raise: Money,
    pub closes_at: DateTime<Utc>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub display_order: i32,
}

fn default_active() -> bool {
    true
}

/// 남은 시간(초). 1초 미만의 잔여 시간은 올림 처리하고 0에서 멈춘다.
pub fn time_left_at(closes_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (closes_at - now).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        ((millis + 999) / 1000) as u64
    }
}

/// HH:MM:SS 형식으로 남은 시간 표시
pub fn format_time_left(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

// endregion: --- Lot

// region:    --- Bid & Options
/// 입찰 기록. 수락된 이후에는 변경되지 않는다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub id: i64,
    pub lot_id: i64,
    pub bidder: String,
    pub amount: Money,
    pub submitted_at: DateTime<Utc>,
}

/// 메시지 가격 옵션
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingOption {
    pub id: i64,
    pub name: String,
    pub base_cost: Money,
}

// endregion: --- Bid & Options
