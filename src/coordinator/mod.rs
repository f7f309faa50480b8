/// 경매 세션 코디네이터
/// 저장소 폴링 결과를 로트 시계와 병합하고, 입찰을 검증기와 저장소로 전달한다.
/// 세션 정보(입찰자, 저장소, 규칙)는 생성 시점에 명시적으로 주입된다.
// region:    --- Imports
use crate::auction::model::{Bid, Money};
use crate::bidding::validator::{BidSubmission, BidValidator};
use crate::config::AuctionRules;
use crate::error::{AuctionError, InactiveReason, ValidationError};
use crate::store::LotStore;
use chrono::Utc;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

mod catalog;

pub use catalog::{Catalog, CatalogEntry, LotKey};

// endregion: --- Imports

// region:    --- Auction Coordinator
pub struct AuctionCoordinator {
    store: Arc<dyn LotStore>,
    validator: BidValidator,
    rules: AuctionRules,
    bidder: String,
    catalog: RwLock<Arc<Catalog>>,
    /// 저장소 읽기 순번. 읽기를 시작할 때 발급한다.
    next_seq: AtomicU64,
    /// 카탈로그에 마지막으로 반영된 순번 (쓰기 잠금 안에서만 갱신)
    applied_seq: AtomicU64,
}

impl AuctionCoordinator {
    pub fn new(store: Arc<dyn LotStore>, bidder: impl Into<String>, rules: AuctionRules) -> Self {
        Self {
            store,
            validator: BidValidator::new(rules.extension_threshold()),
            rules,
            bidder: bidder.into(),
            catalog: RwLock::new(Arc::new(Catalog::default())),
            next_seq: AtomicU64::new(0),
            applied_seq: AtomicU64::new(0),
        }
    }

    pub fn rules(&self) -> &AuctionRules {
        &self.rules
    }

    /// 현재 카탈로그 스냅샷
    pub async fn snapshot(&self) -> Arc<Catalog> {
        Arc::clone(&*self.catalog.read().await)
    }

    /// 저장소에서 전체 로트를 다시 읽어 병합
    /// 읽기를 시작한 뒤 더 최신 결과가 이미 반영되었다면 이 결과는 버린다.
    pub async fn refresh(&self) -> Result<(), AuctionError> {
        let seq = self.issue_seq();
        let lots = self
            .read_with_retry("fetch_lots", || self.store.fetch_lots())
            .await?;

        let now = Utc::now();
        let mut catalog = self.catalog.write().await;
        if seq < self.applied_seq.load(Ordering::SeqCst) {
            debug!(
                "{:<12} --> 오래된 새로고침 결과 폐기: seq={}",
                "Coordinator", seq
            );
            return Ok(());
        }
        self.applied_seq.store(seq, Ordering::SeqCst);
        let merged = catalog.merge(&lots, now, self.rules.min_display_count);
        *catalog = Arc::new(merged);
        debug!(
            "{:<12} --> 카탈로그 갱신: 로트 {}개, 표시 {}개",
            "Coordinator",
            lots.len(),
            catalog.len()
        );
        Ok(())
    }

    /// 로컬 시계 1초 진행 (표시용 예측일 뿐 저장소 값이 아니다)
    pub async fn tick(&self) {
        let mut catalog = self.catalog.write().await;
        let next = catalog.ticked();
        *catalog = Arc::new(next);
    }

    /// 입력 중인 입찰가 조정
    pub async fn adjust_draft_bid(&self, lot_id: i64, change: Money) -> Result<Money, AuctionError> {
        let mut catalog = self.catalog.write().await;
        let draft = catalog
            .get(LotKey::Lot(lot_id))
            .ok_or(AuctionError::Validation(ValidationError::UnknownLot(lot_id)))?
            .adjusted_bid(change)?;
        let next = catalog.with_draft(lot_id, Some(draft));
        *catalog = Arc::new(next);
        Ok(draft)
    }

    pub async fn clear_draft_bid(&self, lot_id: i64) {
        let mut catalog = self.catalog.write().await;
        let next = catalog.with_draft(lot_id, None);
        *catalog = Arc::new(next);
    }

    /// 입찰 제출
    /// 로트를 다시 읽어 검증하고, 조건부 쓰기가 성공하면 즉시 카탈로그를 새로고침한다.
    pub async fn submit_bid(&self, key: LotKey, amount: f64) -> Result<Bid, AuctionError> {
        let lot_id = match key {
            LotKey::Lot(id) => id,
            LotKey::Placeholder(_) => {
                return Err(AuctionError::InactiveLot {
                    reason: InactiveReason::Placeholder,
                })
            }
        };
        info!(
            "{:<12} --> 입찰 제출: lot={} amount={} bidder={}",
            "Coordinator", lot_id, amount, self.bidder
        );

        let lot = self
            .read_with_retry("fetch_lot", || self.store.fetch_lot(lot_id))
            .await?;

        let now = Utc::now();
        let submission = BidSubmission {
            lot_id,
            bidder: self.bidder.clone(),
            amount,
            submitted_at: now,
            expected_current_bid: None,
        };
        let accepted = self
            .validator
            .validate(&lot, &submission, now)
            .map_err(|e| {
                warn!("{:<12} --> 입찰 거절: lot={} {}", "Coordinator", lot_id, e);
                e
            })?;

        // 조건부 쓰기는 재시도하지 않는다
        let receipt = self
            .with_timeout(self.store.conditional_bid(accepted.into_write()))
            .await
            .map_err(|e| {
                warn!("{:<12} --> 입찰 반영 실패: lot={} {}", "Coordinator", lot_id, e);
                e
            })?;
        info!(
            "{:<12} --> 입찰 성공: lot={} 현재 가격 {}",
            "Coordinator", lot_id, receipt.lot.current_bid
        );

        {
            // 쓰기 결과는 진행 중인 어떤 읽기보다 최신이다
            let seq = self.issue_seq();
            let mut catalog = self.catalog.write().await;
            let next = catalog.with_lot(&receipt.lot, Utc::now());
            *catalog = Arc::new(next);
            self.applied_seq.fetch_max(seq, Ordering::SeqCst);
        }

        if let Err(e) = self.refresh().await {
            warn!(
                "{:<12} --> 입찰 후 즉시 새로고침 실패, 다음 주기에 재시도: {}",
                "Coordinator", e
            );
        }
        Ok(receipt.bid)
    }

    fn issue_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// 읽기 호출. 일시적 오류만 제한 횟수까지 재시도한다.
    async fn read_with_retry<T, F, Fut>(&self, op: &str, mut call: F) -> Result<T, AuctionError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AuctionError>>,
    {
        let mut attempt = 0;
        loop {
            match self.with_timeout(call()).await {
                Err(e) if e.is_transient() && attempt < self.rules.transient_retries => {
                    attempt += 1;
                    warn!(
                        "{:<12} --> {} 실패, 재시도 {}/{}: {}",
                        "Coordinator", op, attempt, self.rules.transient_retries, e
                    );
                    tokio::time::sleep(self.rules.retry_backoff * attempt).await;
                }
                result => return result,
            }
        }
    }

    async fn with_timeout<T, Fut>(&self, call: Fut) -> Result<T, AuctionError>
    where
        Fut: Future<Output = Result<T, AuctionError>>,
    {
        match tokio::time::timeout(self.rules.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(AuctionError::TransientIo(format!(
                "store call timed out after {:?}",
                self.rules.request_timeout
            ))),
        }
    }
}

// endregion: --- Auction Coordinator

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::model::{Lot, NewLot};
    use crate::store::{BidReceipt, BidWrite, InMemoryStore, LotAdminStore};
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn rules() -> AuctionRules {
        AuctionRules {
            retry_backoff: std::time::Duration::from_millis(1),
            ..AuctionRules::default()
        }
    }

    async fn seed(store: &InMemoryStore, seconds_left: i64, order: i32) -> Lot {
        store
            .insert_lot(NewLot {
                name: format!("lot {}", order),
                description: String::new(),
                current_bid: Money::from_dollars(50),
                min_raise: Money::from_dollars(5),
                closes_at: Utc::now() + Duration::seconds(seconds_left),
                is_active: true,
                image_url: None,
                display_order: order,
            })
            .await
            .unwrap()
    }

    fn coordinator(store: Arc<InMemoryStore>) -> AuctionCoordinator {
        AuctionCoordinator::new(store, "carol", rules())
    }

    #[tokio::test]
    async fn test_refresh_pads_then_grows() {
        let store = Arc::new(InMemoryStore::new());
        for order in 0..3 {
            seed(&store, 3600, order).await;
        }
        let coordinator = coordinator(Arc::clone(&store));

        coordinator.refresh().await.unwrap();
        let snapshot = coordinator.snapshot().await;
        assert_eq!(snapshot.len(), 5);
        assert_eq!(
            snapshot.entries().iter().filter(|e| e.is_placeholder()).count(),
            2
        );

        for order in 3..6 {
            seed(&store, 3600, order).await;
        }
        coordinator.refresh().await.unwrap();
        let snapshot = coordinator.snapshot().await;
        assert_eq!(snapshot.len(), 6);
        assert!(snapshot.entries().iter().all(|e| !e.is_placeholder()));
    }

    #[tokio::test]
    async fn test_submit_bid_updates_catalog() {
        let store = Arc::new(InMemoryStore::new());
        let lot = seed(&store, 3600, 0).await;
        let coordinator = coordinator(Arc::clone(&store));
        coordinator.refresh().await.unwrap();

        let bid = coordinator
            .submit_bid(LotKey::Lot(lot.id), 55.0)
            .await
            .unwrap();
        assert_eq!(bid.amount, Money::from_dollars(55));
        assert_eq!(bid.bidder, "carol");

        let snapshot = coordinator.snapshot().await;
        let entry = snapshot.get(LotKey::Lot(lot.id)).unwrap();
        assert_eq!(entry.current_bid, Money::from_dollars(55));
        assert_eq!(entry.suggested_bid(), Money::from_dollars(60));
    }

    #[tokio::test]
    async fn test_bid_below_minimum_leaves_lot_untouched() {
        let store = Arc::new(InMemoryStore::new());
        let lot = seed(&store, 3600, 0).await;
        let coordinator = coordinator(Arc::clone(&store));

        let err = coordinator
            .submit_bid(LotKey::Lot(lot.id), 54.99)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuctionError::Validation(ValidationError::BidTooLow { .. })
        ));
        let stored = store.fetch_lot(lot.id).await.unwrap();
        assert_eq!(stored.current_bid, Money::from_dollars(50));
        assert!(store.fetch_bids(lot.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_late_bid_extends_to_threshold() {
        let store = Arc::new(InMemoryStore::new());
        let lot = seed(&store, 300, 0).await;
        let coordinator = coordinator(Arc::clone(&store));
        coordinator.refresh().await.unwrap();

        coordinator
            .submit_bid(LotKey::Lot(lot.id), 60.0)
            .await
            .unwrap();
        let snapshot = coordinator.snapshot().await;
        assert_eq!(
            snapshot.get(LotKey::Lot(lot.id)).unwrap().time_left_seconds(),
            600
        );
    }

    #[tokio::test]
    async fn test_placeholder_is_never_biddable() {
        let store = Arc::new(InMemoryStore::new());
        let coordinator = coordinator(store);
        coordinator.refresh().await.unwrap();

        let err = coordinator
            .submit_bid(LotKey::Placeholder(0), 100.0)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AuctionError::InactiveLot {
                reason: InactiveReason::Placeholder
            }
        );
    }

    #[tokio::test]
    async fn test_tick_then_refresh_prefers_server() {
        let store = Arc::new(InMemoryStore::new());
        let lot = seed(&store, 450, 0).await;
        let coordinator = coordinator(Arc::clone(&store));
        coordinator.refresh().await.unwrap();

        for _ in 0..600 {
            coordinator.tick().await;
        }
        let snapshot = coordinator.snapshot().await;
        assert_eq!(snapshot.get(LotKey::Lot(lot.id)).unwrap().time_left_seconds(), 0);

        coordinator.refresh().await.unwrap();
        let snapshot = coordinator.snapshot().await;
        let left = snapshot.get(LotKey::Lot(lot.id)).unwrap().time_left_seconds();
        assert!(left == 450 || left == 449, "time left was {}", left);
    }

    #[tokio::test]
    async fn test_draft_bid_survives_refresh() {
        let store = Arc::new(InMemoryStore::new());
        let lot = seed(&store, 3600, 0).await;
        let coordinator = coordinator(Arc::clone(&store));
        coordinator.refresh().await.unwrap();

        let draft = coordinator
            .adjust_draft_bid(lot.id, Money::from_dollars(20))
            .await
            .unwrap();
        assert_eq!(draft, Money::from_dollars(70));
        let draft = coordinator
            .adjust_draft_bid(lot.id, Money::from_dollars(-100))
            .await
            .unwrap();
        assert_eq!(draft, Money::from_dollars(55));

        coordinator.refresh().await.unwrap();
        let snapshot = coordinator.snapshot().await;
        assert_eq!(
            snapshot.get(LotKey::Lot(lot.id)).unwrap().draft_bid,
            Some(Money::from_dollars(55))
        );

        coordinator.clear_draft_bid(lot.id).await;
        let snapshot = coordinator.snapshot().await;
        assert_eq!(snapshot.get(LotKey::Lot(lot.id)).unwrap().draft_bid, None);
    }

    /// 처음 몇 번은 일시적 오류를 내는 저장소
    struct FlakyStore {
        inner: InMemoryStore,
        failures_left: AtomicU32,
        writes: AtomicU32,
    }

    impl FlakyStore {
        fn fail(&self) -> Result<(), AuctionError> {
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(AuctionError::TransientIo("connection reset".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl LotStore for FlakyStore {
        async fn fetch_lots(&self) -> Result<Vec<Lot>, AuctionError> {
            self.fail()?;
            self.inner.fetch_lots().await
        }

        async fn fetch_lot(&self, lot_id: i64) -> Result<Lot, AuctionError> {
            self.fail()?;
            self.inner.fetch_lot(lot_id).await
        }

        async fn fetch_bids(&self, lot_id: i64) -> Result<Vec<Bid>, AuctionError> {
            self.inner.fetch_bids(lot_id).await
        }

        async fn conditional_bid(&self, write: BidWrite) -> Result<BidReceipt, AuctionError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.conditional_bid(write).await
        }
    }

    #[tokio::test]
    async fn test_transient_reads_are_retried() {
        let store = Arc::new(FlakyStore {
            inner: InMemoryStore::new(),
            failures_left: AtomicU32::new(2),
            writes: AtomicU32::new(0),
        });
        seed(&store.inner, 3600, 0).await;
        let coordinator = AuctionCoordinator::new(store.clone(), "dave", rules());

        coordinator.refresh().await.unwrap();
        assert_eq!(coordinator.snapshot().await.len(), 5);
    }

    #[tokio::test]
    async fn test_transient_error_surfaces_after_retries() {
        let store = Arc::new(FlakyStore {
            inner: InMemoryStore::new(),
            failures_left: AtomicU32::new(10),
            writes: AtomicU32::new(0),
        });
        let lot = seed(&store.inner, 3600, 0).await;
        let coordinator = AuctionCoordinator::new(store.clone(), "dave", rules());

        let err = coordinator
            .submit_bid(LotKey::Lot(lot.id), 60.0)
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
        assert_eq!(store.failures_left.load(Ordering::SeqCst), 6);
    }

    /// 첫 번째 전체 조회만 결과를 읽은 뒤 신호가 올 때까지 붙잡아 두는 저장소
    struct GatedStore {
        inner: InMemoryStore,
        fetched: tokio::sync::Notify,
        release: tokio::sync::Notify,
        gated: AtomicU32,
    }

    #[async_trait]
    impl LotStore for GatedStore {
        async fn fetch_lots(&self) -> Result<Vec<Lot>, AuctionError> {
            let lots = self.inner.fetch_lots().await?;
            if self.gated.fetch_add(1, Ordering::SeqCst) == 0 {
                self.fetched.notify_one();
                self.release.notified().await;
            }
            Ok(lots)
        }

        async fn fetch_lot(&self, lot_id: i64) -> Result<Lot, AuctionError> {
            self.inner.fetch_lot(lot_id).await
        }

        async fn fetch_bids(&self, lot_id: i64) -> Result<Vec<Bid>, AuctionError> {
            self.inner.fetch_bids(lot_id).await
        }

        async fn conditional_bid(&self, write: BidWrite) -> Result<BidReceipt, AuctionError> {
            self.inner.conditional_bid(write).await
        }
    }

    #[tokio::test]
    async fn test_slow_refresh_does_not_roll_back_bid() {
        let store = Arc::new(GatedStore {
            inner: InMemoryStore::new(),
            fetched: tokio::sync::Notify::new(),
            release: tokio::sync::Notify::new(),
            gated: AtomicU32::new(0),
        });
        let lot = seed(&store.inner, 3600, 0).await;
        let coordinator = Arc::new(AuctionCoordinator::new(store.clone(), "frank", rules()));

        // 입찰 전에 읽기를 시작한 주기 새로고침
        let slow_refresh = {
            let coordinator = Arc::clone(&coordinator);
            tokio::spawn(async move { coordinator.refresh().await })
        };
        store.fetched.notified().await;

        coordinator
            .submit_bid(LotKey::Lot(lot.id), 60.0)
            .await
            .unwrap();
        store.release.notify_one();
        slow_refresh.await.unwrap().unwrap();

        let snapshot = coordinator.snapshot().await;
        let entry = snapshot.get(LotKey::Lot(lot.id)).unwrap();
        assert_eq!(entry.current_bid, Money::from_dollars(60));
    }

    /// 응답하지 않는 저장소
    struct HangingStore;

    #[async_trait]
    impl LotStore for HangingStore {
        async fn fetch_lots(&self) -> Result<Vec<Lot>, AuctionError> {
            std::future::pending().await
        }

        async fn fetch_lot(&self, _lot_id: i64) -> Result<Lot, AuctionError> {
            std::future::pending().await
        }

        async fn fetch_bids(&self, _lot_id: i64) -> Result<Vec<Bid>, AuctionError> {
            std::future::pending().await
        }

        async fn conditional_bid(&self, _write: BidWrite) -> Result<BidReceipt, AuctionError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_times_out() {
        let coordinator = AuctionCoordinator::new(
            Arc::new(HangingStore),
            "erin",
            AuctionRules {
                transient_retries: 1,
                ..AuctionRules::default()
            },
        );
        let err = coordinator.refresh().await.unwrap_err();
        assert!(err.is_transient());
        assert!(coordinator.snapshot().await.is_empty());
    }
}
