/// 경매 세션 클라이언트
/// 경매 서버를 주기적으로 폴링해 로트 목록과 남은 시간을 로그로 보여준다.
// region:    --- Imports
use lot_auction::config::WatchConfig;
use lot_auction::coordinator::{AuctionCoordinator, Catalog};
use lot_auction::scheduler::SessionScheduler;
use lot_auction::store::HttpLotStore;
use std::sync::Arc;
use tokio::time::interval;
use tracing::{error, info};

// endregion: --- Imports

fn log_catalog(catalog: &Catalog) {
    match catalog.refreshed_at() {
        Some(at) => info!("{:<12} --> 로트 {}개 (마지막 동기화 {})", "Watch", catalog.len(), at),
        None => info!("{:<12} --> 아직 서버와 동기화되지 않음", "Watch"),
    }
    for entry in catalog.entries() {
        let state = if entry.is_placeholder() {
            "준비 중"
        } else if entry.is_biddable() {
            "진행 중"
        } else {
            "종료"
        };
        info!(
            "{:<12} --> [{}] #{} {} | 현재 {} | 최소 {} | 남은 시간 {}",
            "Watch",
            state,
            entry.lot_id().map_or_else(|| "-".to_string(), |id| id.to_string()),
            entry.name,
            entry.current_bid,
            entry.minimum_bid(),
            entry.formatted_time_left()
        );
    }
}

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = WatchConfig::load()?;
    info!(
        "{:<12} --> 서버 {} 관람 시작 (bidder={})",
        "Watch", config.server_url, config.bidder
    );

    let store = Arc::new(HttpLotStore::new(config.server_url.clone()));
    let coordinator = Arc::new(AuctionCoordinator::new(store, config.bidder, config.rules));
    let session = SessionScheduler::start(Arc::clone(&coordinator));

    let mut report = interval(config.rules.refresh_interval);
    loop {
        tokio::select! {
            _ = report.tick() => log_catalog(&*coordinator.snapshot().await),
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    error!("{:<12} --> 종료 신호 대기 실패: {}", "Watch", e);
                }
                break;
            }
        }
    }

    session.stop().await;
    Ok(())
}
// endregion: --- Main
