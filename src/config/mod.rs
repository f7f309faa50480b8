/// 환경 변수 기반 설정
/// 선택 항목이 없으면 기본값을 쓰고, 값이 잘못되어 있으면 시작 단계에서 실패한다.
// region:    --- Imports
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

// endregion: --- Imports

// region:    --- Config Error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(String),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

// endregion: --- Config Error

// region:    --- Auction Rules
/// 경매 규칙 및 세션 타이머 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuctionRules {
    /// 마감 직전 입찰 시 연장 기준 (초)
    pub extension_threshold_secs: u64,
    pub refresh_interval: Duration,
    pub tick_interval: Duration,
    /// 화면에 항상 보여줄 최소 로트 수
    pub min_display_count: usize,
    pub request_timeout: Duration,
    pub transient_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for AuctionRules {
    fn default() -> Self {
        Self {
            extension_threshold_secs: 600,
            refresh_interval: Duration::from_secs(5),
            tick_interval: Duration::from_secs(1),
            min_display_count: 5,
            request_timeout: Duration::from_secs(3),
            transient_retries: 3,
            retry_backoff: Duration::from_millis(200),
        }
    }
}

impl AuctionRules {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            extension_threshold_secs: try_load(
                "EXTENSION_THRESHOLD_SECS",
                defaults.extension_threshold_secs,
            )?,
            refresh_interval: Duration::from_millis(try_load("REFRESH_INTERVAL_MS", 5000u64)?),
            tick_interval: Duration::from_millis(try_load("TICK_INTERVAL_MS", 1000u64)?),
            min_display_count: try_load("MIN_DISPLAY_COUNT", defaults.min_display_count)?,
            request_timeout: Duration::from_millis(try_load("REQUEST_TIMEOUT_MS", 3000u64)?),
            transient_retries: try_load("TRANSIENT_RETRIES", defaults.transient_retries)?,
            retry_backoff: Duration::from_millis(try_load("RETRY_BACKOFF_MS", 200u64)?),
        })
    }

    pub fn extension_threshold(&self) -> Duration {
        Duration::from_secs(self.extension_threshold_secs)
    }
}

// endregion: --- Auction Rules

// region:    --- Binary Configs
/// 경매 서버 설정
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub rules: AuctionRules,
}

impl ServerConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            bind_addr: try_load("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            rules: AuctionRules::from_env()?,
        })
    }
}

/// 경매 세션 클라이언트 설정
pub struct WatchConfig {
    pub server_url: String,
    pub bidder: String,
    pub rules: AuctionRules,
}

impl WatchConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            server_url: try_load("AUCTION_SERVER_URL", "http://127.0.0.1:3000".to_string())?,
            bidder: try_load("WATCH_BIDDER", "watcher".to_string())?,
            rules: AuctionRules::from_env()?,
        })
    }
}

// endregion: --- Binary Configs

// region:    --- Helpers
fn required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key.to_string()))
}

fn try_load<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => {
            debug!("{:<12} --> {} = {}", "Config", key, raw);
            raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
                key: key.to_string(),
                reason: e.to_string(),
            })
        }
        Err(_) => {
            info!("{:<12} --> {} 미설정, 기본값 사용: {}", "Config", key, default);
            Ok(default)
        }
    }
}

// endregion: --- Helpers
