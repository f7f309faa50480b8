/// 로트별 카운트다운
/// 폴링 사이에는 로컬에서 1초씩 줄이고, 서버 값이 도착하면 무조건 서버 값으로 덮어쓴다.
// region:    --- Imports
use chrono::{DateTime, Utc};

// endregion: --- Imports

// region:    --- Lot Clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotClock {
    time_left_seconds: u64,
    last_synced_at: DateTime<Utc>,
}

impl LotClock {
    /// 처음 관측된 로트는 서버 값을 그대로 사용
    pub fn observe(server_time_left: u64, now: DateTime<Utc>) -> Self {
        Self {
            time_left_seconds: server_time_left,
            last_synced_at: now,
        }
    }

    /// 로컬 예측. 저장소와 통신하지 않는다.
    pub fn tick(&mut self) {
        self.time_left_seconds = self.time_left_seconds.saturating_sub(1);
    }

    /// 서버 값으로 교체 (로컬 예측보다 항상 우선)
    pub fn reconcile(&mut self, server_time_left: u64, now: DateTime<Utc>) {
        self.time_left_seconds = server_time_left;
        self.last_synced_at = now;
    }

    pub fn time_left_seconds(&self) -> u64 {
        self.time_left_seconds
    }

    pub fn last_synced_at(&self) -> DateTime<Utc> {
        self.last_synced_at
    }

    pub fn is_expired(&self) -> bool {
        self.time_left_seconds == 0
    }
}

// endregion: --- Lot Clock
