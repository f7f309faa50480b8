/// 경매 세션 스케줄러
/// 세션마다 새로고침 루프와 1초 시계 루프를 돌린다.
/// 두 루프는 세션 핸들이 멈추거나 버려지면 함께 종료된다.
// region:    --- Imports
use crate::coordinator::AuctionCoordinator;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

// endregion: --- Imports

// region:    --- Session Scheduler
/// 세션 스케줄러
pub struct SessionScheduler;

impl SessionScheduler {
    /// 세션 시작
    /// 새로고침은 즉시 한 번 실행되고 이후 주기마다 반복된다.
    pub fn start(coordinator: Arc<AuctionCoordinator>) -> SessionHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let refresh_every = coordinator.rules().refresh_interval;
        let tick_every = coordinator.rules().tick_interval;

        let refresh_task = tokio::spawn(Self::refresh_loop(
            Arc::clone(&coordinator),
            refresh_every,
            stop_rx.clone(),
        ));
        let tick_task = tokio::spawn(Self::tick_loop(coordinator, tick_every, stop_rx));

        info!(
            "{:<12} --> 세션 시작: 새로고침 {:?}, 시계 {:?}",
            "Scheduler", refresh_every, tick_every
        );
        SessionHandle {
            stop_tx,
            tasks: vec![refresh_task, tick_task],
        }
    }

    async fn refresh_loop(
        coordinator: Arc<AuctionCoordinator>,
        period: Duration,
        mut stop_rx: watch::Receiver<bool>,
    ) {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = coordinator.refresh().await {
                        error!(
                            "{:<12} --> 카탈로그 새로고침 실패: {}",
                            "Scheduler", e
                        );
                    }
                }
                _ = stop_rx.changed() => break,
            }
        }
        debug!("{:<12} --> 새로고침 루프 종료", "Scheduler");
    }

    async fn tick_loop(
        coordinator: Arc<AuctionCoordinator>,
        period: Duration,
        mut stop_rx: watch::Receiver<bool>,
    ) {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = interval.tick() => coordinator.tick().await,
                _ = stop_rx.changed() => break,
            }
        }
        debug!("{:<12} --> 시계 루프 종료", "Scheduler");
    }
}

// endregion: --- Session Scheduler

// region:    --- Session Handle
/// 실행 중인 세션 핸들
pub struct SessionHandle {
    stop_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl SessionHandle {
    /// 세션 종료. 두 루프가 끝날 때까지 기다린다.
    pub async fn stop(mut self) {
        let _ = self.stop_tx.send(true);
        for task in std::mem::take(&mut self.tasks) {
            if let Err(e) = task.await {
                error!("{:<12} --> 세션 작업 종료 실패: {}", "Scheduler", e);
            }
        }
        info!("{:<12} --> 세션 종료", "Scheduler");
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(true);
    }
}

// endregion: --- Session Handle
