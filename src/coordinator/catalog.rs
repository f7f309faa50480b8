/// 로트 카탈로그 스냅샷
/// 변경은 항상 새 스냅샷을 만들어 통째로 교체한다. 화면 쪽은 읽기만 한다.
// region:    --- Imports
use crate::auction::clock::LotClock;
use crate::auction::model::{format_time_left, Lot, Money};
use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::Serialize;

// endregion: --- Imports

// region:    --- Placeholder
const PLACEHOLDER_NAME: &str = "Coming Soon";
const PLACEHOLDER_DESCRIPTION: &str = "This item will be available soon!";
const PLACEHOLDER_IMAGE: &str = "/auction/comingsoon.jpg";

// endregion: --- Placeholder

// region:    --- Catalog Entry
/// 카탈로그 키. 플레이스홀더는 저장소에 존재하지 않는다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LotKey {
    Lot(i64),
    Placeholder(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub key: LotKey,
    pub name: String,
    pub description: String,
    pub current_bid: Money,
    pub min_raise: Money,
    pub is_active: bool,
    pub image_url: Option<String>,
    pub clock: LotClock,
    /// 입력 중인 입찰가 (저장소가 모르는 화면 상태)
    pub draft_bid: Option<Money>,
}

impl CatalogEntry {
    fn from_lot(lot: &Lot, clock: LotClock, draft_bid: Option<Money>) -> Self {
        Self {
            key: LotKey::Lot(lot.id),
            name: lot.name.clone(),
            description: lot.description.clone(),
            current_bid: lot.current_bid,
            min_raise: lot.min_raise,
            is_active: lot.is_active,
            image_url: lot.image_url.clone(),
            clock,
            draft_bid,
        }
    }

    fn placeholder(index: usize, now: DateTime<Utc>) -> Self {
        Self {
            key: LotKey::Placeholder(index),
            name: PLACEHOLDER_NAME.to_string(),
            description: PLACEHOLDER_DESCRIPTION.to_string(),
            current_bid: Money::ZERO,
            min_raise: Money::ZERO,
            is_active: false,
            image_url: Some(PLACEHOLDER_IMAGE.to_string()),
            clock: LotClock::observe(0, now),
            draft_bid: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.key, LotKey::Placeholder(_))
    }

    pub fn lot_id(&self) -> Option<i64> {
        match self.key {
            LotKey::Lot(id) => Some(id),
            LotKey::Placeholder(_) => None,
        }
    }

    /// 화면 기준 입찰 가능 여부 (최종 판단은 검증기가 한다)
    pub fn is_biddable(&self) -> bool {
        !self.is_placeholder() && self.is_active && !self.clock.is_expired()
    }

    pub fn time_left_seconds(&self) -> u64 {
        self.clock.time_left_seconds()
    }

    pub fn formatted_time_left(&self) -> String {
        format_time_left(self.clock.time_left_seconds() as i64)
    }

    /// 표시용 최소 입찰 가능 금액 (상한에서 멈춘다)
    pub fn minimum_bid(&self) -> Money {
        self.current_bid.saturating_add(self.min_raise)
    }

    /// 입력 중인 입찰가 조정
    /// 결과는 최소 입찰 가능 금액 아래로 내려가지 않는다.
    pub fn adjusted_bid(&self, change: Money) -> Result<Money, ValidationError> {
        let minimum = self.current_bid.checked_add(self.min_raise)?;
        let base = self.draft_bid.unwrap_or(self.current_bid);
        Ok(std::cmp::max(minimum, base.checked_add(change)?))
    }

    /// 입찰 창에 미리 채울 금액
    pub fn suggested_bid(&self) -> Money {
        let minimum = self.minimum_bid();
        self.draft_bid.map_or(minimum, |draft| draft.max(minimum))
    }
}

// endregion: --- Catalog Entry

// region:    --- Catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl Catalog {
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    pub fn get(&self, key: LotKey) -> Option<&CatalogEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    /// 저장소 결과 병합
    /// 기존 로트는 서버 시간으로 맞추고 입력 중인 입찰가는 유지한다.
    /// 최소 표시 개수보다 적으면 플레이스홀더로 채운다.
    pub fn merge(&self, lots: &[Lot], now: DateTime<Utc>, min_display_count: usize) -> Catalog {
        let mut entries: Vec<CatalogEntry> = lots
            .iter()
            .map(|lot| match self.get(LotKey::Lot(lot.id)) {
                Some(existing) => {
                    let mut clock = existing.clock;
                    clock.reconcile(lot.time_left_seconds, now);
                    CatalogEntry::from_lot(lot, clock, existing.draft_bid)
                }
                None => {
                    CatalogEntry::from_lot(lot, LotClock::observe(lot.time_left_seconds, now), None)
                }
            })
            .collect();

        let padding = min_display_count.saturating_sub(entries.len());
        entries.extend((0..padding).map(|index| CatalogEntry::placeholder(index, now)));

        Catalog {
            entries,
            refreshed_at: Some(now),
        }
    }

    /// 모든 로트 시계를 1초 진행
    pub fn ticked(&self) -> Catalog {
        let mut next = self.clone();
        for entry in next.entries.iter_mut() {
            entry.clock.tick();
        }
        next
    }

    /// 입찰 직후 받은 로트 하나 반영 (입력 중인 입찰가는 비운다)
    pub fn with_lot(&self, lot: &Lot, now: DateTime<Utc>) -> Catalog {
        let mut next = self.clone();
        if let Some(entry) = next
            .entries
            .iter_mut()
            .find(|entry| entry.key == LotKey::Lot(lot.id))
        {
            let mut clock = entry.clock;
            clock.reconcile(lot.time_left_seconds, now);
            *entry = CatalogEntry::from_lot(lot, clock, None);
        }
        next
    }

    pub fn with_draft(&self, lot_id: i64, draft_bid: Option<Money>) -> Catalog {
        let mut next = self.clone();
        if let Some(entry) = next
            .entries
            .iter_mut()
            .find(|entry| entry.key == LotKey::Lot(lot_id))
        {
            entry.draft_bid = draft_bid;
        }
        next
    }
}

// endregion: --- Catalog

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn lot(id: i64, time_left: u64) -> Lot {
        let now = Utc::now();
        Lot {
            id,
            name: format!("lot {}", id),
            description: String::new(),
            current_bid: Money::from_dollars(10),
            min_raise: Money::from_dollars(1),
            closes_at: now + Duration::seconds(time_left as i64),
            time_left_seconds: time_left,
            is_active: true,
            image_url: None,
            display_order: 0,
        }
    }

    #[test]
    fn test_pads_to_minimum_display_count() {
        let lots = vec![lot(1, 60), lot(2, 60), lot(3, 60)];
        let catalog = Catalog::default().merge(&lots, Utc::now(), 5);

        assert_eq!(catalog.len(), 5);
        let placeholders: Vec<_> = catalog
            .entries()
            .iter()
            .filter(|e| e.is_placeholder())
            .collect();
        assert_eq!(placeholders.len(), 2);
        for p in placeholders {
            assert!(!p.is_biddable());
            assert_eq!(p.current_bid, Money::ZERO);
            assert_eq!(p.time_left_seconds(), 0);
        }
    }

    #[test]
    fn test_no_padding_above_minimum() {
        let lots: Vec<Lot> = (1..=6).map(|id| lot(id, 60)).collect();
        let catalog = Catalog::default().merge(&lots, Utc::now(), 5);
        assert_eq!(catalog.len(), 6);
        assert!(catalog.entries().iter().all(|e| !e.is_placeholder()));
    }

    #[test]
    fn test_merge_reconciles_and_keeps_draft() {
        let now = Utc::now();
        let catalog = Catalog::default()
            .merge(&[lot(1, 100)], now, 0)
            .with_draft(1, Some(Money::from_dollars(20)))
            .ticked()
            .ticked();
        let entry = catalog.get(LotKey::Lot(1)).unwrap();
        assert_eq!(entry.time_left_seconds(), 98);

        let merged = catalog.merge(&[lot(1, 120)], now, 0);
        let entry = merged.get(LotKey::Lot(1)).unwrap();
        assert_eq!(entry.time_left_seconds(), 120);
        assert_eq!(entry.draft_bid, Some(Money::from_dollars(20)));
        assert_eq!(entry.suggested_bid(), Money::from_dollars(20));
    }

    #[test]
    fn test_removed_lots_disappear() {
        let now = Utc::now();
        let catalog = Catalog::default().merge(&[lot(1, 10), lot(2, 10)], now, 0);
        let merged = catalog.merge(&[lot(2, 10)], now, 0);
        assert!(merged.get(LotKey::Lot(1)).is_none());
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_adjusted_bid_rejects_overflow() {
        let mut huge = lot(1, 10);
        huge.current_bid = Money::MAX;
        let catalog = Catalog::default().merge(&[huge], Utc::now(), 0);
        let entry = catalog.get(LotKey::Lot(1)).unwrap();

        assert!(entry.adjusted_bid(Money::ZERO).is_err());
        assert_eq!(entry.minimum_bid(), Money::MAX);

        let catalog = Catalog::default().merge(&[lot(1, 10)], Utc::now(), 0);
        let entry = catalog.get(LotKey::Lot(1)).unwrap();
        assert_eq!(
            entry.adjusted_bid(Money::from_cents(i64::MAX)),
            Err(ValidationError::AmountTooLarge { limit: Money::MAX })
        );
        assert_eq!(
            entry.adjusted_bid(Money::from_dollars(-50)),
            Ok(Money::from_dollars(11))
        );
    }

    #[test]
    fn test_suggested_bid_defaults_to_minimum() {
        let catalog = Catalog::default().merge(&[lot(1, 10)], Utc::now(), 0);
        let entry = catalog.get(LotKey::Lot(1)).unwrap();
        assert_eq!(entry.suggested_bid(), Money::from_dollars(11));
        assert_eq!(entry.formatted_time_left(), "00:00:10");
    }
}
